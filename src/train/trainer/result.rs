//! Training result types

use serde::Serialize;

/// Summary of one pass over the training set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochMetrics {
    /// 1-based epoch number
    pub epoch: usize,
    /// Row-weighted mean loss
    pub loss: f64,
    /// Fraction of rows classified correctly at 0.5
    pub accuracy: f64,
    /// Optimizer steps in this epoch
    pub steps: usize,
}

/// Result of a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainResult {
    /// Final epoch reached
    pub final_epoch: usize,
    /// Final training loss
    pub final_loss: f64,
    /// Best loss achieved
    pub best_loss: f64,
    /// Total optimizer steps
    pub steps: usize,
    /// Per-epoch metrics, oldest first
    pub history: Vec<EpochMetrics>,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}
