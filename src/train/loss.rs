//! Loss functions for training
//!
//! Numerically stable binary cross-entropy on logits:
//! ```text
//! L_i = max(x_i, 0) - x_i * t_i + log(1 + exp(-|x_i|))
//! L = mean(L_i)
//! ```
//!
//! Gradient: `∂L/∂x_i = (σ(x_i) - t_i) / N`

use crate::model::layers::sigmoid;
use ndarray::Array1;

/// Trait for loss functions
pub trait LossFn {
    /// Mean loss over the batch and its gradient w.r.t. each logit.
    fn forward(&self, logits: &Array1<f64>, targets: &Array1<f64>) -> (f64, Array1<f64>);

    /// Name of the loss function
    fn name(&self) -> &str;
}

/// Binary cross-entropy with logits.
#[derive(Debug, Clone, Copy, Default)]
pub struct BCEWithLogitsLoss;

impl BCEWithLogitsLoss {
    fn stable_bce(logit: f64, target: f64) -> f64 {
        logit.max(0.0) - logit * target + (-logit.abs()).exp().ln_1p()
    }
}

impl LossFn for BCEWithLogitsLoss {
    fn forward(&self, logits: &Array1<f64>, targets: &Array1<f64>) -> (f64, Array1<f64>) {
        debug_assert_eq!(logits.len(), targets.len());
        if logits.is_empty() {
            return (0.0, Array1::zeros(0));
        }
        let n = logits.len() as f64;
        let loss = logits
            .iter()
            .zip(targets.iter())
            .map(|(&x, &t)| Self::stable_bce(x, t))
            .sum::<f64>()
            / n;
        let mut grad = logits.mapv(sigmoid);
        grad -= targets;
        grad /= n;
        (loss, grad)
    }

    fn name(&self) -> &'static str {
        "BCEWithLogits"
    }
}
