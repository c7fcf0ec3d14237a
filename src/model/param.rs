//! Trainable parameter storage

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;

/// A flat parameter vector with its accumulated gradient.
///
/// Layers keep their own shape bookkeeping and index into `data` directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Current values
    pub data: Array1<f64>,
    /// Gradient accumulated since the last [`Param::zero_grad`]
    pub grad: Array1<f64>,
}

impl Param {
    /// Wrap existing values with a zero gradient.
    pub fn new(data: Array1<f64>) -> Self {
        let grad = Array1::zeros(data.len());
        Self { data, grad }
    }

    /// `len` zeros.
    pub fn zeros(len: usize) -> Self {
        Self::new(Array1::zeros(len))
    }

    /// `len` ones.
    pub fn ones(len: usize) -> Self {
        Self::new(Array1::ones(len))
    }

    /// Uniform values in `[-limit, limit)`.
    pub fn uniform(len: usize, limit: f64, rng: &mut StdRng) -> Self {
        let data = if limit > 0.0 {
            Array1::from_shape_fn(len, |_| rng.random_range(-limit..limit))
        } else {
            Array1::zeros(len)
        };
        Self::new(data)
    }

    /// Glorot/Xavier uniform initialisation.
    pub fn glorot(len: usize, fan_in: usize, fan_out: usize, rng: &mut StdRng) -> Self {
        let fans = (fan_in + fan_out) as f64;
        let limit = if fans > 0.0 { (6.0 / fans).sqrt() } else { 0.0 };
        Self::uniform(len, limit, rng)
    }

    /// Number of scalar values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the parameter holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reset the gradient to zero.
    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }

    /// Rescale so the L2 norm lies in `[0, max_norm]`.
    pub fn clamp_norm(&mut self, max_norm: f64) {
        let norm = self.data.dot(&self.data).sqrt();
        if norm > max_norm {
            self.data *= max_norm / norm;
        }
    }
}
