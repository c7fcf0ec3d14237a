//! Training loop configuration

use exetree_common::LogLevel;

/// Knobs for [`super::Trainer`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Passes over the dataset
    pub epochs: usize,
    /// Rows per optimizer step
    pub batch_size: usize,
    /// Seed for dropout masks
    pub seed: u64,
    /// Progress output level
    pub log_level: LogLevel,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self { epochs: 1, batch_size: 50, seed: 0, log_level: LogLevel::Normal }
    }
}

impl TrainConfig {
    /// Builder-style epoch count.
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Builder-style batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder-style log level.
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }
}
