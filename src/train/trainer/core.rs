//! Core Trainer struct and basic methods

use crate::model::ConvClassifier;
use crate::optim::Optimizer;
use crate::train::{BCEWithLogitsLoss, LossFn, TrainConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Owns a model and its optimizer for the duration of training.
pub struct Trainer {
    /// Model being trained
    pub(crate) model: ConvClassifier,

    /// Optimizer
    pub(crate) optimizer: Box<dyn Optimizer>,

    /// Loss function
    pub(crate) loss_fn: Box<dyn LossFn>,

    /// Training configuration
    pub(crate) config: TrainConfig,

    /// Dropout masks and batch shuffling
    pub(crate) rng: StdRng,

    /// Optimizer steps taken
    pub(crate) steps: usize,
}

impl Trainer {
    /// Create a new trainer with binary cross-entropy loss
    pub fn new(model: ConvClassifier, optimizer: Box<dyn Optimizer>, config: TrainConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            model,
            optimizer,
            loss_fn: Box::new(BCEWithLogitsLoss),
            config,
            rng,
            steps: 0,
        }
    }

    /// Model in its current state
    pub fn model(&self) -> &ConvClassifier {
        &self.model
    }

    /// Give back the trained model
    pub fn into_model(self) -> ConvClassifier {
        self.model
    }

    /// Current learning rate
    pub fn lr(&self) -> f64 {
        self.optimizer.lr()
    }

    /// Optimizer steps taken so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Training configuration
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }
}
