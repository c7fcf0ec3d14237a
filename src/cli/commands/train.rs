//! Train command implementation

use crate::cli::args::{apply_overrides, TrainArgs};
use crate::config::{load_or_default, validate_config, ExetreeConfig};
use crate::pipeline::run_pipeline;
use exetree_common::{log, LogLevel, Result};

/// Config summary lines shown on a dry run.
pub fn format_config_info(config: &ExetreeConfig) -> String {
    let mut lines = vec![format!("  Training data: {}", config.data.train_dir.display())];
    if let Some(valn) = &config.data.valn_dir {
        lines.push(format!("  Validation data: {}", valn.display()));
    }
    let model = &config.model;
    lines.push(format!(
        "  Model: embedding {}, filters {:?} x{}, dropout {:?}, hidden {}",
        model.embedding_dim, model.filter_sizes, model.num_filters, model.dropout, model.hidden_dims
    ));
    let training = &config.training;
    lines.push(format!(
        "  Training: {} epochs, batch {}, lr {}, seed {}",
        training.epochs, training.batch_size, training.learning_rate, training.seed
    ));
    if let Some(output) = &config.output {
        lines.push(format!("  Output: {}", output.display()));
    }
    lines.join("\n")
}

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<()> {
    let mut config = load_or_default(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    validate_config(&config)?;

    match &args.config {
        Some(path) => {
            log(level, LogLevel::Normal, &format!("exetree: training from {}", path.display()))
        }
        None => log(level, LogLevel::Normal, "exetree: training with default configuration"),
    }

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run - config validated successfully");
        log(level, LogLevel::Verbose, &format_config_info(&config));
        return Ok(());
    }
    log(level, LogLevel::Verbose, &format_config_info(&config));

    let result = run_pipeline(&config, level)?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training complete: {} epochs, {} steps, final loss {:.4}",
            result.train.final_epoch, result.train.steps, result.train.final_loss
        ),
    );
    Ok(())
}
