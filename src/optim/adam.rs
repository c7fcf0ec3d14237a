//! Adam optimizer

use super::Optimizer;
use crate::model::Param;
use ndarray::{Array1, Zip};

/// Adam with bias-corrected moment estimates
///
/// m_t = β₁·m + (1-β₁)·g, v_t = β₂·v + (1-β₂)·g²
/// θ_t = θ - lr·√(1-β₂ᵗ)/(1-β₁ᵗ) · m_t / (√v_t + ε)
#[derive(Debug, Clone)]
pub struct Adam {
    lr: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: u64,
    m: Vec<Array1<f64>>, // First moment
    v: Vec<Array1<f64>>, // Second moment
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self { lr, beta1, beta2, epsilon, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Adam with β₁ = 0.9, β₂ = 0.999, ε = 1e-8
    pub fn default_params(lr: f64) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8)
    }

    /// Steps taken so far.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.t
    }

    // Moments are (re)allocated whenever the parameter layout changes.
    fn ensure_moments(&mut self, params: &[&mut Param]) {
        let matches = self.m.len() == params.len()
            && self.m.iter().zip(params.iter()).all(|(m, p)| m.len() == p.len());
        if !matches {
            self.m = params.iter().map(|p| Array1::zeros(p.len())).collect();
            self.v = params.iter().map(|p| Array1::zeros(p.len())).collect();
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [&mut Param]) {
        self.ensure_moments(params);
        self.t += 1;

        let t = self.t as f64;
        let lr_t =
            self.lr * (1.0 - self.beta2.powf(t)).sqrt() / (1.0 - self.beta1.powf(t));
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);

        for ((param, m), v) in params.iter_mut().zip(&mut self.m).zip(&mut self.v) {
            let Param { data, grad } = &mut **param;
            Zip::from(data).and(&*grad).and(m).and(v).for_each(|d, &g, m, v| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                *d -= lr_t * *m / (v.sqrt() + epsilon);
            });
        }
    }

    fn lr(&self) -> f64 {
        self.lr
    }

    fn set_lr(&mut self, lr: f64) {
        self.lr = lr;
    }
}
