use super::*;
use crate::encode::EncodedFeatures;
use approx::assert_relative_eq;
use ndarray::Array2;
use rand::{Rng, SeedableRng};

fn small_config() -> ModelConfig {
    ModelConfig {
        embedding_dim: 2,
        filter_sizes: vec![2, 3],
        num_filters: 2,
        dropout: (0.0, 0.0),
        hidden_dims: 3,
    }
}

fn random_batch(
    rows: usize,
    poscount: usize,
    watermark: u64,
    seed: u64,
) -> (Array2<u64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let locs = Array2::from_shape_fn((rows, poscount), |_| rng.random_range(0..watermark));
    let vals = Array2::from_shape_fn((rows, poscount), |_| rng.random_range(-2.0..2.0));
    (locs, vals)
}

fn weighted_logits(
    model: &ConvClassifier,
    locs: &Array2<u64>,
    vals: &Array2<f64>,
    weights: &Array1<f64>,
) -> f64 {
    let mut rng = StdRng::seed_from_u64(0);
    let (logits, _) = model.forward_train(locs, vals, &mut rng);
    logits.dot(weights)
}

#[test]
fn test_default_config_values() {
    let config = ModelConfig::default();
    assert_eq!(config.embedding_dim, 4);
    assert_eq!(config.filter_sizes, vec![3, 8]);
    assert_eq!(config.num_filters, 1);
    assert_eq!(config.dropout, (0.01, 0.01));
    assert_eq!(config.hidden_dims, 10);
}

#[test]
fn test_config_fills_missing_fields() {
    let config: ModelConfig = serde_yaml::from_str("embedding_dim: 8\n").unwrap();
    assert_eq!(config.embedding_dim, 8);
    assert_eq!(config.filter_sizes, vec![3, 8]);
}

#[test]
fn test_gradients_match_finite_differences() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut model = ConvClassifier::new(small_config(), 6, 4, &mut rng);
    let (locs, vals) = random_batch(5, 6, 4, 3);
    let weights = Array1::from_shape_fn(5, |_| rng.random_range(-1.0..1.0));

    model.zero_grad();
    let mut fwd_rng = StdRng::seed_from_u64(0);
    let (_, cache) = model.forward_train(&locs, &vals, &mut fwd_rng);
    model.backward(&cache, &weights);

    let eps = 1e-6;
    let param_count = model.params_mut().len();
    for pi in 0..param_count {
        let len = model.params_mut()[pi].len();
        for j in 0..len {
            let analytic = model.params_mut()[pi].grad[j];

            let mut plus = model.clone();
            plus.params_mut()[pi].data[j] += eps;
            let mut minus = model.clone();
            minus.params_mut()[pi].data[j] -= eps;
            let numeric = (weighted_logits(&plus, &locs, &vals, &weights)
                - weighted_logits(&minus, &locs, &vals, &weights))
                / (2.0 * eps);

            let scale = 1.0 + numeric.abs().max(analytic.abs());
            assert!(
                (numeric - analytic).abs() <= 1e-4 * scale,
                "param {pi}[{j}]: numeric {numeric} vs analytic {analytic}"
            );
        }
    }
}

#[test]
fn test_predict_returns_probabilities() {
    let mut rng = StdRng::seed_from_u64(5);
    let model = ConvClassifier::new(ModelConfig::default(), 10, 6, &mut rng);
    let (locs, vals) = random_batch(7, 10, 6, 9);
    let features = EncodedFeatures { locs, vals, labels: vec![false; 7] };

    let probs = model.predict(&features);
    assert_eq!(probs.len(), 7);
    assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn test_inference_is_row_independent() {
    let mut rng = StdRng::seed_from_u64(5);
    let model = ConvClassifier::new(ModelConfig::default(), 9, 5, &mut rng);
    let (locs, vals) = random_batch(4, 9, 5, 1);
    let features = EncodedFeatures { locs, vals, labels: vec![true; 4] };

    let all = model.predict(&features);
    let tail = model.predict(&features.select(&[2, 3]));
    assert_relative_eq!(all[2], tail[0], epsilon = 1e-12);
    assert_relative_eq!(all[3], tail[1], epsilon = 1e-12);
    assert_eq!(model.predict(&features), all);
}

#[test]
fn test_kernel_longer_than_poscount_adds_no_features() {
    let mut rng = StdRng::seed_from_u64(1);
    let model = ConvClassifier::new(ModelConfig::default(), 5, 3, &mut rng);
    // k=3: 3 positions pooled to 1; k=8 does not fit.
    assert_eq!(model.feature_width(), 1);

    let tiny = ConvClassifier::new(ModelConfig::default(), 2, 3, &mut rng);
    assert_eq!(tiny.feature_width(), 0);
    let features = EncodedFeatures {
        locs: Array2::zeros((3, 2)),
        vals: Array2::zeros((3, 2)),
        labels: vec![false; 3],
    };
    let probs = tiny.predict(&features);
    assert_eq!(probs.len(), 3);
    assert!(probs.iter().all(|p| p.is_finite()));
}

#[test]
fn test_zero_width_rows() {
    let mut rng = StdRng::seed_from_u64(1);
    let model = ConvClassifier::new(ModelConfig::default(), 0, 1, &mut rng);
    let probs = model.predict(&EncodedFeatures {
        locs: Array2::zeros((2, 0)),
        vals: Array2::zeros((2, 0)),
        labels: vec![true, false],
    });
    assert_eq!(probs.len(), 2);
    assert_relative_eq!(probs[0], probs[1]);
}

#[test]
fn test_update_statistics_moves_running_mean() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut model = ConvClassifier::new(small_config(), 4, 3, &mut rng);
    let locs = Array2::zeros((2, 4));
    let vals = Array2::from_elem((2, 4), 10.0);
    let (_, cache) = model.forward_train(&locs, &vals, &mut rng);
    model.update_statistics(&cache);

    let mean = model
        .tensors()
        .into_iter()
        .find(|(name, _)| name == "norm.moving_mean")
        .map(|(_, t)| t.to_owned())
        .unwrap();
    assert_relative_eq!(mean[0], 0.1, epsilon = 1e-12);
}

#[test]
fn test_apply_constraints_bounds_norm_params() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut model = ConvClassifier::new(small_config(), 4, 3, &mut rng);
    for (name, tensor) in model.tensors_mut() {
        if name == "norm.gamma" || name == "norm.beta" {
            tensor.fill(5.0);
        }
    }
    model.apply_constraints();
    for (name, tensor) in model.tensors() {
        if name == "norm.gamma" || name == "norm.beta" {
            assert_relative_eq!(tensor.dot(&tensor).sqrt(), 1.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_tensor_names_are_stable() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut model = ConvClassifier::new(small_config(), 4, 3, &mut rng);
    let names: Vec<String> = model.tensors().into_iter().map(|(n, _)| n).collect();
    let names_mut: Vec<String> = model.tensors_mut().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, names_mut);

    let unique: std::collections::HashSet<_> = names.iter().collect();
    assert_eq!(unique.len(), names.len());
    assert!(names.contains(&"conv1.weight".to_string()));

    // 3×2 embedding, 2×4 norm, two convs, hidden, output
    let conv_width = 2 * 3 * 2 + 2 + 3 * 3 * 2 + 2;
    let hidden_in = model.feature_width();
    let expected = 6 + 8 + conv_width + hidden_in * 3 + 3 + 3 + 1;
    assert_eq!(model.parameter_count(), expected);
}
