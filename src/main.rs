//! exetree CLI
//!
//! # Usage
//!
//! ```bash
//! # Train on ./train with the default configuration
//! exetree train
//!
//! # Train from config with overrides
//! exetree train run.yaml --epochs 10 --lr 0.001 --output model.json
//!
//! # Show tree statistics
//! exetree info --train-dir train
//!
//! # Score a saved model
//! exetree validate model.json --valn-dir valn
//! ```

use clap::Parser;
use exetree::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
