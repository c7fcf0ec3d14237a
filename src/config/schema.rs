//! YAML schema definitions

use crate::eval::DEFAULT_THRESHOLD;
use crate::model::ModelConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_train_dir() -> PathBuf {
    PathBuf::from("train")
}

fn default_epochs() -> usize {
    1
}

fn default_batch_size() -> usize {
    50
}

fn default_learning_rate() -> f64 {
    0.01
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExetreeConfig {
    /// Where fuzzlogs are read from
    #[serde(default)]
    pub data: DataConfig,

    /// Network hyper-parameters
    #[serde(default)]
    pub model: ModelConfig,

    /// Optimisation settings
    #[serde(default)]
    pub training: TrainingConfig,

    /// Checkpoint path written after training
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Fuzzlog locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Training fuzzlogs; `.0` suffix marks success
    #[serde(default = "default_train_dir")]
    pub train_dir: PathBuf,

    /// Validation fuzzlogs (`.s` / `.f`); skipped when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valn_dir: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { train_dir: default_train_dir(), valn_dir: None }
    }
}

/// Training loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Passes over the encoded tree
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Rows per optimizer step
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Adam learning rate
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Seed for initialisation and dropout
    #[serde(default)]
    pub seed: u64,

    /// Validation decision threshold
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            seed: 0,
            threshold: default_threshold(),
        }
    }
}
