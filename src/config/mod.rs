//! Declarative run configuration
//!
//! A YAML file with four optional sections; every field has a default, so an
//! empty file (or no file at all) describes a valid run:
//!
//! ```yaml
//! data:
//!   train_dir: train
//!   valn_dir: valn
//! model:
//!   embedding_dim: 4
//!   filter_sizes: [3, 8]
//!   num_filters: 1
//!   dropout: [0.01, 0.01]
//!   hidden_dims: 10
//! training:
//!   epochs: 1
//!   batch_size: 50
//!   learning_rate: 0.01
//!   seed: 0
//!   threshold: 0.7
//! output: model.json
//! ```

mod loader;
mod schema;
mod validate;

pub use loader::{load_config, load_or_default, parse_config};
pub use schema::{DataConfig, ExetreeConfig, TrainingConfig};
pub use validate::validate_config;
