//! Optimizer trait

use crate::model::Param;

/// Trait for optimization algorithms
///
/// Parameters are borrowed from the model on every step and must arrive in
/// the same order each time; per-parameter state is keyed by position.
pub trait Optimizer {
    /// Perform a single optimization step using the accumulated gradients
    fn step(&mut self, params: &mut [&mut Param]);

    /// Zero gradients on referenced parameters
    fn zero_grad(&mut self, params: &mut [&mut Param]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f64;

    /// Set learning rate
    fn set_lr(&mut self, lr: f64);
}
