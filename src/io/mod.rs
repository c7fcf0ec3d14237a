//! Checkpoint persistence
//!
//! A checkpoint holds everything needed to score new fuzzlogs: the location
//! tags in id order, `poscount`, the network hyper-parameters and every
//! parameter and running statistic. JSON and YAML are supported, chosen by
//! file extension.

mod format;
mod load;
mod model;
mod save;

pub use format::ModelFormat;
pub use load::load_model;
pub use model::{Checkpoint, ModelMetadata, ParameterInfo, CHECKPOINT_VERSION};
pub use save::{save_model, SaveConfig};
