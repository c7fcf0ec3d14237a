//! Cli, Command, and argument structs

use crate::config::ExetreeConfig;
use crate::eval::DEFAULT_THRESHOLD;
use clap::{Parser, Subcommand};
use exetree_common::{CommonArgs, OutputFormat};
use std::path::PathBuf;

/// exetree: predict fuzzing success from execution-trace prefixes
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "exetree")]
#[command(version)]
#[command(about = "Learn which execution prefixes lead to successful fuzzing runs")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Build the tree from training fuzzlogs and train a model
    Train(TrainArgs),

    /// Show statistics of the tree built from training fuzzlogs
    Info(InfoArgs),

    /// Score a saved model against validation fuzzlogs
    Validate(ValidateArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to YAML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Override training fuzzlog directory
    #[arg(long)]
    pub train_dir: Option<PathBuf>,

    /// Override validation fuzzlog directory
    #[arg(long)]
    pub valn_dir: Option<PathBuf>,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    pub lr: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the trained model here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Dry run (validate config but don't train)
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Override training fuzzlog directory
    #[arg(long)]
    pub train_dir: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Saved model (JSON or YAML checkpoint)
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Directory of `.s` / `.f` fuzzlogs
    #[arg(long)]
    pub valn_dir: PathBuf,

    /// Probability above which a run is predicted successful
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a loaded configuration
pub fn apply_overrides(config: &mut ExetreeConfig, args: &TrainArgs) {
    if let Some(train_dir) = &args.train_dir {
        config.data.train_dir = train_dir.clone();
    }
    if let Some(valn_dir) = &args.valn_dir {
        config.data.valn_dir = Some(valn_dir.clone());
    }
    if let Some(epochs) = args.epochs {
        config.training.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.training.batch_size = batch_size;
    }
    if let Some(lr) = args.lr {
        config.training.learning_rate = lr;
    }
    if let Some(seed) = args.seed {
        config.training.seed = seed;
    }
    if let Some(output) = &args.output {
        config.output = Some(output.clone());
    }
}
