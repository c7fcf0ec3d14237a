//! Command-line interface
//!
//! ```bash
//! # Train from train/ with defaults
//! exetree train
//!
//! # Train from a config, validate and save
//! exetree train run.yaml --valn-dir valn --output model.json
//!
//! # Tree statistics
//! exetree info --train-dir train --format json
//!
//! # Score a saved model
//! exetree validate model.json --valn-dir valn --threshold 0.7
//! ```

mod args;
mod commands;

pub use args::{apply_overrides, parse_args, Cli, Command, InfoArgs, TrainArgs, ValidateArgs};
pub use commands::run_command;
