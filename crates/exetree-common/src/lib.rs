//! Shared infrastructure for the exetree crates.
//!
//! - Error handling with actionable diagnostics
//! - Output gating by log level
//! - Command-line flags common to every subcommand

pub mod cli;
pub mod error;

pub use cli::{log, CommonArgs, LogLevel, OutputFormat};
pub use error::{ExetreeError, Result};
