//! Trainer for the convolutional classifier
//!
//! - Single training steps
//! - Epoch-level training with loss/accuracy
//! - Multi-epoch training

mod core;
mod epoch;
mod result;
mod step;

pub use self::core::Trainer;
pub use result::{EpochMetrics, TrainResult};
