//! Network layers with hand-written backward passes
//!
//! Activations are batch-major: `(batch, positions, channels)` for sequences
//! and `(batch, features)` for dense layers. Forward passes are pure and
//! return whatever the backward pass needs; backward passes accumulate into
//! [`Param::grad`] and return the gradient w.r.t. the layer input.

use super::Param;
use ndarray::{Array, Array1, Array2, Array3, Axis, Dimension};
use rand::rngs::StdRng;
use rand::Rng;

/// Numerically stable logistic function.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Element-wise `max(x, 0)`.
pub fn relu<D: Dimension>(x: &Array<f64, D>) -> Array<f64, D> {
    x.mapv(|v| v.max(0.0))
}

/// Gradient of [`relu`] given its pre-activation input.
pub fn relu_backward<D: Dimension>(pre: &Array<f64, D>, grad: &Array<f64, D>) -> Array<f64, D> {
    let mut out = grad.clone();
    out.zip_mut_with(pre, |g, &z| {
        if z <= 0.0 {
            *g = 0.0;
        }
    });
    out
}

/// Lookup table from location id to a dense vector.
#[derive(Debug, Clone)]
pub struct Embedding {
    /// Number of rows (location watermark)
    pub vocab: usize,
    /// Vector width
    pub dim: usize,
    /// `vocab × dim`, row-major
    pub weight: Param,
}

impl Embedding {
    /// Uniform `[-0.05, 0.05)` initialisation.
    pub fn new(vocab: usize, dim: usize, rng: &mut StdRng) -> Self {
        let vocab = vocab.max(1);
        Self { vocab, dim, weight: Param::uniform(vocab * dim, 0.05, rng) }
    }

    // Ids past the table (never produced by a matching index) read the pad row.
    fn row(&self, id: u64) -> usize {
        usize::try_from(id).ok().filter(|&r| r < self.vocab).unwrap_or(0)
    }

    /// `(batch, positions)` ids to `(batch, positions, dim)` vectors.
    pub fn forward(&self, locs: &Array2<u64>) -> Array3<f64> {
        let (batch, positions) = locs.dim();
        Array3::from_shape_fn((batch, positions, self.dim), |(b, p, e)| {
            self.weight.data[self.row(locs[[b, p]]) * self.dim + e]
        })
    }

    /// Scatter-add `grad` into the rows that were looked up.
    pub fn backward(&mut self, locs: &Array2<u64>, grad: &Array3<f64>) {
        for ((b, p), &id) in locs.indexed_iter() {
            let row = self.row(id);
            for e in 0..self.dim {
                self.weight.grad[row * self.dim + e] += grad[[b, p, e]];
            }
        }
    }
}

/// Values saved by a training-mode [`BatchNorm`] pass.
#[derive(Debug, Clone)]
pub struct BatchNormCache {
    xhat: Array2<f64>,
    inv_std: Array1<f64>,
    mean: Array1<f64>,
    var: Array1<f64>,
}

/// Batch normalisation with one `(gamma, beta)` pair per position.
#[derive(Debug, Clone)]
pub struct BatchNorm {
    /// Scale, one per position
    pub gamma: Param,
    /// Shift, one per position
    pub beta: Param,
    /// Running mean used at inference
    pub moving_mean: Array1<f64>,
    /// Running variance used at inference
    pub moving_var: Array1<f64>,
    /// Weight of the old running statistics
    pub momentum: f64,
    /// Added to the variance before the square root
    pub epsilon: f64,
}

impl BatchNorm {
    /// Identity-initialised normaliser over `features` columns.
    pub fn new(features: usize) -> Self {
        Self {
            gamma: Param::ones(features),
            beta: Param::zeros(features),
            moving_mean: Array1::zeros(features),
            moving_var: Array1::ones(features),
            momentum: 0.99,
            epsilon: 1e-3,
        }
    }

    /// Normalise with the statistics of this batch.
    pub fn forward_train(&self, x: &Array2<f64>) -> (Array2<f64>, BatchNormCache) {
        let features = x.ncols();
        let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(features));
        let centered = x - &mean;
        let var = centered
            .mapv(|v| v * v)
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(features));
        let inv_std = var.mapv(|v| 1.0 / (v + self.epsilon).sqrt());
        let xhat = &centered * &inv_std;
        let y = &xhat * &self.gamma.data + &self.beta.data;
        (y, BatchNormCache { xhat, inv_std, mean, var })
    }

    /// Normalise with the running statistics.
    pub fn forward_infer(&self, x: &Array2<f64>) -> Array2<f64> {
        let inv_std = self.moving_var.mapv(|v| 1.0 / (v + self.epsilon).sqrt());
        (x - &self.moving_mean) * &inv_std * &self.gamma.data + &self.beta.data
    }

    /// Fold a training batch's statistics into the running averages.
    pub fn update_moving(&mut self, cache: &BatchNormCache) {
        let m = self.momentum;
        self.moving_mean = &self.moving_mean * m + &cache.mean * (1.0 - m);
        self.moving_var = &self.moving_var * m + &cache.var * (1.0 - m);
    }

    /// Backward through the batch statistics.
    pub fn backward(&mut self, cache: &BatchNormCache, dy: &Array2<f64>) -> Array2<f64> {
        let n = dy.nrows() as f64;
        if dy.nrows() == 0 {
            return dy.clone();
        }
        self.gamma.grad += &(dy * &cache.xhat).sum_axis(Axis(0));
        self.beta.grad += &dy.sum_axis(Axis(0));

        let dxhat = dy * &self.gamma.data;
        let sum_dxhat = dxhat.sum_axis(Axis(0));
        let sum_dxhat_xhat = (&dxhat * &cache.xhat).sum_axis(Axis(0));
        (&dxhat * n - &sum_dxhat - &cache.xhat * &sum_dxhat_xhat) * &cache.inv_std / n
    }
}

/// Inverted dropout: survivors are scaled by `1 / (1 - rate)`.
#[derive(Debug, Clone, Copy)]
pub struct Dropout {
    /// Probability of zeroing an element
    pub rate: f64,
}

impl Dropout {
    /// Apply a fresh random mask; returns the mask for the backward pass.
    pub fn forward<D: Dimension>(
        &self,
        x: &Array<f64, D>,
        rng: &mut StdRng,
    ) -> (Array<f64, D>, Option<Array<f64, D>>) {
        if self.rate <= 0.0 {
            return (x.clone(), None);
        }
        let keep = 1.0 - self.rate;
        let mask = Array::from_shape_fn(x.raw_dim(), |_| {
            if rng.random::<f64>() < keep {
                1.0 / keep
            } else {
                0.0
            }
        });
        let mut out = x.clone();
        out.zip_mut_with(&mask, |v, &m| *v *= m);
        (out, Some(mask))
    }

    /// Route gradients through the surviving elements.
    pub fn backward<D: Dimension>(
        mask: Option<&Array<f64, D>>,
        mut grad: Array<f64, D>,
    ) -> Array<f64, D> {
        if let Some(mask) = mask {
            grad.zip_mut_with(mask, |g, &m| *g *= m);
        }
        grad
    }
}

/// 1-D convolution, valid padding, stride 1.
#[derive(Debug, Clone)]
pub struct Conv1d {
    /// Window length
    pub kernel: usize,
    /// Channels per position
    pub in_channels: usize,
    /// Output channels
    pub filters: usize,
    /// `kernel × in_channels × filters`, row-major
    pub weight: Param,
    /// One per filter
    pub bias: Param,
}

impl Conv1d {
    /// Glorot-initialised convolution.
    pub fn new(kernel: usize, in_channels: usize, filters: usize, rng: &mut StdRng) -> Self {
        Self {
            kernel,
            in_channels,
            filters,
            weight: Param::glorot(
                kernel * in_channels * filters,
                kernel * in_channels,
                kernel * filters,
                rng,
            ),
            bias: Param::zeros(filters),
        }
    }

    /// Output positions for an input of `len` positions; 0 if the window does not fit.
    pub fn output_len(&self, len: usize) -> usize {
        (len + 1).saturating_sub(self.kernel)
    }

    fn widx(&self, j: usize, c: usize, f: usize) -> usize {
        (j * self.in_channels + c) * self.filters + f
    }

    /// Pre-activation output `(batch, output_len, filters)`.
    pub fn forward(&self, x: &Array3<f64>) -> Array3<f64> {
        let (batch, len, _) = x.dim();
        let out_len = self.output_len(len);
        Array3::from_shape_fn((batch, out_len, self.filters), |(b, t, f)| {
            let mut sum = self.bias.data[f];
            for j in 0..self.kernel {
                for c in 0..self.in_channels {
                    sum += x[[b, t + j, c]] * self.weight.data[self.widx(j, c, f)];
                }
            }
            sum
        })
    }

    /// Accumulate weight gradients and return the input gradient.
    pub fn backward(&mut self, x: &Array3<f64>, dz: &Array3<f64>) -> Array3<f64> {
        let mut dx = Array3::zeros(x.raw_dim());
        for ((b, t, f), &g) in dz.indexed_iter() {
            if g == 0.0 {
                continue;
            }
            self.bias.grad[f] += g;
            for j in 0..self.kernel {
                for c in 0..self.in_channels {
                    let w = self.widx(j, c, f);
                    self.weight.grad[w] += g * x[[b, t + j, c]];
                    dx[[b, t + j, c]] += g * self.weight.data[w];
                }
            }
        }
        dx
    }
}

/// Non-overlapping max pooling over positions, window 2.
#[derive(Debug, Clone, Copy)]
pub struct MaxPool1d;

impl MaxPool1d {
    /// Pool size and stride.
    pub const POOL: usize = 2;

    /// Output positions for `len` inputs (trailing odd position dropped).
    pub fn output_len(len: usize) -> usize {
        len / Self::POOL
    }

    /// Pooled values and the input position each one came from.
    pub fn forward(x: &Array3<f64>) -> (Array3<f64>, Array3<usize>) {
        let (batch, len, channels) = x.dim();
        let out_len = Self::output_len(len);
        let mut out = Array3::zeros((batch, out_len, channels));
        let mut argmax = Array3::zeros((batch, out_len, channels));
        for b in 0..batch {
            for t in 0..out_len {
                for c in 0..channels {
                    let start = t * Self::POOL;
                    let mut best = start;
                    for p in start + 1..start + Self::POOL {
                        if x[[b, p, c]] > x[[b, best, c]] {
                            best = p;
                        }
                    }
                    out[[b, t, c]] = x[[b, best, c]];
                    argmax[[b, t, c]] = best;
                }
            }
        }
        (out, argmax)
    }

    /// Send each gradient back to the position that won the pool.
    pub fn backward(argmax: &Array3<usize>, dy: &Array3<f64>, input_len: usize) -> Array3<f64> {
        let (batch, _, channels) = dy.dim();
        let mut dx = Array3::zeros((batch, input_len, channels));
        for ((b, t, c), &g) in dy.indexed_iter() {
            dx[[b, argmax[[b, t, c]], c]] += g;
        }
        dx
    }
}

/// Fully connected layer.
#[derive(Debug, Clone)]
pub struct Dense {
    /// Input width
    pub inputs: usize,
    /// Output width
    pub outputs: usize,
    /// `inputs × outputs`, row-major
    pub weight: Param,
    /// One per output
    pub bias: Param,
}

impl Dense {
    /// Glorot-initialised layer.
    pub fn new(inputs: usize, outputs: usize, rng: &mut StdRng) -> Self {
        Self {
            inputs,
            outputs,
            weight: Param::glorot(inputs * outputs, inputs, outputs, rng),
            bias: Param::zeros(outputs),
        }
    }

    /// `x @ W + b`.
    pub fn forward(&self, x: &Array2<f64>) -> Array2<f64> {
        let batch = x.nrows();
        Array2::from_shape_fn((batch, self.outputs), |(b, o)| {
            let mut sum = self.bias.data[o];
            for i in 0..self.inputs {
                sum += x[[b, i]] * self.weight.data[i * self.outputs + o];
            }
            sum
        })
    }

    /// Accumulate weight gradients and return the input gradient.
    pub fn backward(&mut self, x: &Array2<f64>, dy: &Array2<f64>) -> Array2<f64> {
        let mut dx = Array2::zeros((x.nrows(), self.inputs));
        for ((b, o), &g) in dy.indexed_iter() {
            self.bias.grad[o] += g;
            for i in 0..self.inputs {
                let w = i * self.outputs + o;
                self.weight.grad[w] += g * x[[b, i]];
                dx[[b, i]] += g * self.weight.data[w];
            }
        }
        dx
    }
}
