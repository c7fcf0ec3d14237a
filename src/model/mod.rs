//! Convolutional success classifier
//!
//! Each encoded prefix flows through:
//!
//! ```text
//! locs ─ Embedding ─┐
//!                    ├─ concat ─ Dropout ─┬─ Conv1d(k₁) ─ ReLU ─ MaxPool ─┐
//! vals ─ BatchNorm ─┘                     ├─ Conv1d(k₂) ─ ReLU ─ MaxPool ─┼─ concat ─ Dropout
//!                                         └─ ...                          ┘
//!     ─ Dense(hidden) ─ ReLU ─ Dense(1) ─ logit
//! ```
//!
//! The probability of success is `sigmoid(logit)`. A branch whose kernel is
//! longer than `poscount` contributes no features.

pub mod layers;
mod param;

pub use param::Param;

use crate::encode::EncodedFeatures;
use layers::{
    relu, relu_backward, sigmoid, BatchNorm, BatchNormCache, Conv1d, Dense, Dropout, Embedding,
    MaxPool1d,
};
use ndarray::{s, Array1, Array2, Array3, ArrayView1, Axis};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

fn default_embedding_dim() -> usize {
    4
}

fn default_filter_sizes() -> Vec<usize> {
    vec![3, 8]
}

fn default_num_filters() -> usize {
    1
}

fn default_dropout() -> (f64, f64) {
    (0.01, 0.01)
}

fn default_hidden_dims() -> usize {
    10
}

/// Network hyper-parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Width of the location embedding
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// One convolution branch per kernel length
    #[serde(default = "default_filter_sizes")]
    pub filter_sizes: Vec<usize>,

    /// Output channels per branch
    #[serde(default = "default_num_filters")]
    pub num_filters: usize,

    /// Dropout rates before the convolutions and before the hidden layer
    #[serde(default = "default_dropout")]
    pub dropout: (f64, f64),

    /// Width of the hidden dense layer
    #[serde(default = "default_hidden_dims")]
    pub hidden_dims: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_dim: default_embedding_dim(),
            filter_sizes: default_filter_sizes(),
            num_filters: default_num_filters(),
            dropout: default_dropout(),
            hidden_dims: default_hidden_dims(),
        }
    }
}

struct BranchCache {
    pre: Array3<f64>,
    argmax: Array3<usize>,
    offset: usize,
    pooled_len: usize,
}

/// Activations from one forward pass, consumed by [`ConvClassifier::backward`].
pub struct ForwardCache {
    locs: Array2<u64>,
    norm: Option<BatchNormCache>,
    input_mask: Option<Array3<f64>>,
    merged: Array3<f64>,
    branches: Vec<BranchCache>,
    hidden_mask: Option<Array2<f64>>,
    features: Array2<f64>,
    hidden_pre: Array2<f64>,
    hidden_act: Array2<f64>,
}

/// Binary classifier over fixed-width `(locs, vals)` rows.
#[derive(Debug, Clone)]
pub struct ConvClassifier {
    config: ModelConfig,
    poscount: usize,
    watermark: usize,
    embedding: Embedding,
    norm: BatchNorm,
    input_dropout: Dropout,
    branches: Vec<Conv1d>,
    hidden_dropout: Dropout,
    hidden: Dense,
    output: Dense,
}

impl ConvClassifier {
    /// Freshly initialised network for rows of width `poscount` and
    /// location ids below `watermark`.
    pub fn new(config: ModelConfig, poscount: usize, watermark: usize, rng: &mut StdRng) -> Self {
        let channels = config.embedding_dim + 1;
        let embedding = Embedding::new(watermark, config.embedding_dim, rng);
        let branches: Vec<Conv1d> = config
            .filter_sizes
            .iter()
            .map(|&k| Conv1d::new(k, channels, config.num_filters, rng))
            .collect();
        let feature_width: usize = branches
            .iter()
            .map(|conv| MaxPool1d::output_len(conv.output_len(poscount)) * conv.filters)
            .sum();
        let hidden = Dense::new(feature_width, config.hidden_dims, rng);
        let output = Dense::new(config.hidden_dims, 1, rng);

        Self {
            poscount,
            watermark,
            embedding,
            norm: BatchNorm::new(poscount),
            input_dropout: Dropout { rate: config.dropout.0 },
            branches,
            hidden_dropout: Dropout { rate: config.dropout.1 },
            hidden,
            output,
            config,
        }
    }

    /// Hyper-parameters the network was built with.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Row width the network expects.
    pub fn poscount(&self) -> usize {
        self.poscount
    }

    /// Size of the embedding table.
    pub fn watermark(&self) -> usize {
        self.watermark
    }

    /// Width of the flattened convolution features.
    pub fn feature_width(&self) -> usize {
        self.hidden.inputs
    }

    fn forward(
        &self,
        locs: &Array2<u64>,
        vals: &Array2<f64>,
        mut rng: Option<&mut StdRng>,
    ) -> (Array1<f64>, ForwardCache) {
        let (batch, positions) = locs.dim();
        let dim = self.config.embedding_dim;

        let embedded = self.embedding.forward(locs);
        let (normed, norm) = if rng.is_some() {
            let (y, cache) = self.norm.forward_train(vals);
            (y, Some(cache))
        } else {
            (self.norm.forward_infer(vals), None)
        };
        let joined = Array3::from_shape_fn((batch, positions, dim + 1), |(b, p, c)| {
            if c < dim {
                embedded[[b, p, c]]
            } else {
                normed[[b, p]]
            }
        });
        let (merged, input_mask) = match rng.as_deref_mut() {
            Some(r) => self.input_dropout.forward(&joined, r),
            None => (joined, None),
        };

        let mut pooled_features = Array2::<f64>::zeros((batch, self.feature_width()));
        let mut branches = Vec::with_capacity(self.branches.len());
        let mut offset = 0;
        for conv in &self.branches {
            let pre = conv.forward(&merged);
            let (pooled, argmax) = MaxPool1d::forward(&relu(&pre));
            let pooled_len = pooled.dim().1;
            let width = pooled_len * conv.filters;
            for ((b, t, f), &v) in pooled.indexed_iter() {
                pooled_features[[b, offset + t * conv.filters + f]] = v;
            }
            branches.push(BranchCache { pre, argmax, offset, pooled_len });
            offset += width;
        }

        let (features, hidden_mask) = match rng.as_deref_mut() {
            Some(r) => self.hidden_dropout.forward(&pooled_features, r),
            None => (pooled_features, None),
        };
        let hidden_pre = self.hidden.forward(&features);
        let hidden_act = relu(&hidden_pre);
        let logits = self.output.forward(&hidden_act).column(0).to_owned();

        let cache = ForwardCache {
            locs: locs.clone(),
            norm,
            input_mask,
            merged,
            branches,
            hidden_mask,
            features,
            hidden_pre,
            hidden_act,
        };
        (logits, cache)
    }

    /// Training-mode pass: batch statistics and fresh dropout masks.
    pub fn forward_train(
        &self,
        locs: &Array2<u64>,
        vals: &Array2<f64>,
        rng: &mut StdRng,
    ) -> (Array1<f64>, ForwardCache) {
        self.forward(locs, vals, Some(rng))
    }

    /// Inference-mode logits: running statistics, no dropout.
    pub fn logits(&self, locs: &Array2<u64>, vals: &Array2<f64>) -> Array1<f64> {
        self.forward(locs, vals, None).0
    }

    /// Success probability for every row of `features`.
    pub fn predict(&self, features: &EncodedFeatures) -> Vec<f64> {
        self.logits(&features.locs, &features.vals).iter().map(|&z| sigmoid(z)).collect()
    }

    /// Fold the batch statistics of a training pass into the normaliser.
    pub fn update_statistics(&mut self, cache: &ForwardCache) {
        if let Some(norm) = &cache.norm {
            self.norm.update_moving(norm);
        }
    }

    /// Accumulate parameter gradients given `dL/dlogit` for each row.
    pub fn backward(&mut self, cache: &ForwardCache, dlogits: &Array1<f64>) {
        let dim = self.config.embedding_dim;
        let dout = dlogits.view().insert_axis(Axis(1)).to_owned();

        let dhidden_act = self.output.backward(&cache.hidden_act, &dout);
        let dhidden_pre = relu_backward(&cache.hidden_pre, &dhidden_act);
        let dfeatures = self.hidden.backward(&cache.features, &dhidden_pre);
        let dpooled_features = Dropout::backward(cache.hidden_mask.as_ref(), dfeatures);

        let mut dmerged = Array3::<f64>::zeros(cache.merged.raw_dim());
        for (conv, branch) in self.branches.iter_mut().zip(&cache.branches) {
            let filters = conv.filters;
            let batch = dpooled_features.nrows();
            let dpooled = Array3::from_shape_fn((batch, branch.pooled_len, filters), |(b, t, f)| {
                dpooled_features[[b, branch.offset + t * filters + f]]
            });
            let dact = MaxPool1d::backward(&branch.argmax, &dpooled, branch.pre.dim().1);
            let dpre = relu_backward(&branch.pre, &dact);
            dmerged += &conv.backward(&cache.merged, &dpre);
        }

        let djoined = Dropout::backward(cache.input_mask.as_ref(), dmerged);
        let dembedded = djoined.slice(s![.., .., ..dim]).to_owned();
        self.embedding.backward(&cache.locs, &dembedded);
        if let Some(norm) = &cache.norm {
            let dnormed = djoined.index_axis(Axis(2), dim).to_owned();
            self.norm.backward(norm, &dnormed);
        }
    }

    /// Trainable parameters in a fixed order.
    pub fn params_mut(&mut self) -> Vec<&mut Param> {
        let mut params = vec![
            &mut self.embedding.weight,
            &mut self.norm.gamma,
            &mut self.norm.beta,
        ];
        for conv in &mut self.branches {
            params.push(&mut conv.weight);
            params.push(&mut conv.bias);
        }
        params.push(&mut self.hidden.weight);
        params.push(&mut self.hidden.bias);
        params.push(&mut self.output.weight);
        params.push(&mut self.output.bias);
        params
    }

    /// Clear every accumulated gradient.
    pub fn zero_grad(&mut self) {
        for param in self.params_mut() {
            param.zero_grad();
        }
    }

    /// Keep the normaliser's scale and shift vectors inside the unit ball.
    pub fn apply_constraints(&mut self) {
        self.norm.gamma.clamp_norm(1.0);
        self.norm.beta.clamp_norm(1.0);
    }

    /// Total trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.tensors()
            .iter()
            .filter(|(name, _)| !name.contains("moving"))
            .map(|(_, t)| t.len())
            .sum()
    }

    /// Every parameter and running statistic, by stable name.
    pub fn tensors(&self) -> Vec<(String, ArrayView1<'_, f64>)> {
        let mut out = vec![
            ("embedding.weight".to_string(), self.embedding.weight.data.view()),
            ("norm.gamma".to_string(), self.norm.gamma.data.view()),
            ("norm.beta".to_string(), self.norm.beta.data.view()),
            ("norm.moving_mean".to_string(), self.norm.moving_mean.view()),
            ("norm.moving_var".to_string(), self.norm.moving_var.view()),
        ];
        for (i, conv) in self.branches.iter().enumerate() {
            out.push((format!("conv{i}.weight"), conv.weight.data.view()));
            out.push((format!("conv{i}.bias"), conv.bias.data.view()));
        }
        out.push(("hidden.weight".to_string(), self.hidden.weight.data.view()));
        out.push(("hidden.bias".to_string(), self.hidden.bias.data.view()));
        out.push(("output.weight".to_string(), self.output.weight.data.view()));
        out.push(("output.bias".to_string(), self.output.bias.data.view()));
        out
    }

    /// Mutable counterpart of [`ConvClassifier::tensors`], same names and order.
    pub fn tensors_mut(&mut self) -> Vec<(String, &mut Array1<f64>)> {
        let mut out = vec![
            ("embedding.weight".to_string(), &mut self.embedding.weight.data),
            ("norm.gamma".to_string(), &mut self.norm.gamma.data),
            ("norm.beta".to_string(), &mut self.norm.beta.data),
            ("norm.moving_mean".to_string(), &mut self.norm.moving_mean),
            ("norm.moving_var".to_string(), &mut self.norm.moving_var),
        ];
        for (i, conv) in self.branches.iter_mut().enumerate() {
            out.push((format!("conv{i}.weight"), &mut conv.weight.data));
            out.push((format!("conv{i}.bias"), &mut conv.bias.data));
        }
        out.push(("hidden.weight".to_string(), &mut self.hidden.weight.data));
        out.push(("hidden.bias".to_string(), &mut self.hidden.bias.data));
        out.push(("output.weight".to_string(), &mut self.output.weight.data));
        out.push(("output.bias".to_string(), &mut self.output.bias.data));
        out
    }
}

#[cfg(test)]
mod tests;
