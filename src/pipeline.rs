//! End-to-end training run
//!
//! 1. Replay every training fuzzlog into an [`ExecutionTree`] (sorted by name)
//! 2. Encode every tree node at `poscount = tree.depth()`
//! 3. Train a fresh [`ConvClassifier`]
//! 4. Optionally score whole validation fuzzlogs (skipped when there are none)
//! 5. Optionally write a checkpoint

use crate::config::{validate_config, ExetreeConfig};
use crate::encode::encode;
use crate::eval::{validate_runs, ValidationReport};
use crate::io::{save_model, ModelMetadata, SaveConfig};
use crate::logparse::{read_training_dir, read_validation_dir};
use crate::model::ConvClassifier;
use crate::optim::Adam;
use crate::train::{TrainConfig, TrainResult, Trainer};
use crate::tree::{ExecutionTree, LocationIndex};
use exetree_common::{log, LogLevel, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Size and shape of an ingested tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    /// Fuzzlogs ingested
    pub runs: usize,
    /// Of which successful
    pub successful_runs: usize,
    /// Nodes, root included
    pub nodes: usize,
    /// Nodes that reach success
    pub success_nodes: usize,
    /// Prefixes no run continues past
    pub leaves: usize,
    /// Longest run, the encoding width
    pub depth: usize,
    /// Distinct locations
    pub locations: usize,
}

impl TreeSummary {
    /// Summarise `tree`.
    pub fn of(tree: &ExecutionTree) -> Self {
        Self {
            runs: tree.run_count(),
            successful_runs: tree.successful_run_count(),
            nodes: tree.len(),
            success_nodes: tree.success_count(),
            leaves: tree.preorder_dfs().filter(|node| node.is_leaf()).count(),
            depth: tree.depth(),
            locations: tree.location_index().len(),
        }
    }
}

/// Replay every fuzzlog in `train_dir` into a new tree.
pub fn build_tree(train_dir: impl AsRef<Path>) -> Result<ExecutionTree> {
    let mut tree = ExecutionTree::new();
    for (_, observations, succeeded) in read_training_dir(train_dir)? {
        tree.add(&observations, succeeded);
    }
    Ok(tree)
}

/// Everything a training run produced.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Ingested tree statistics
    pub summary: TreeSummary,
    /// Training history
    pub train: TrainResult,
    /// Validation scores, when a validation directory was configured
    pub validation: Option<ValidationReport>,
    /// Where the checkpoint was written, if anywhere
    pub checkpoint: Option<PathBuf>,
    /// Trained network
    pub model: ConvClassifier,
    /// Index the network's ids refer to
    pub index: LocationIndex,
}

/// Run ingestion, training, validation and saving as configured.
pub fn run_pipeline(config: &ExetreeConfig, level: LogLevel) -> Result<PipelineResult> {
    validate_config(config)?;

    let tree = build_tree(&config.data.train_dir)?;
    let summary = TreeSummary::of(&tree);
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Ingested {} fuzzlogs ({} successful): {} nodes, depth {}, {} locations",
            summary.runs, summary.successful_runs, summary.nodes, summary.depth, summary.locations
        ),
    );

    let poscount = tree.depth();
    let index = tree.location_index().clone();
    let features = encode(&tree, poscount, &index);
    drop(tree);
    log(
        level,
        LogLevel::Verbose,
        &format!("  Encoded {} prefixes at poscount {poscount}", features.len()),
    );

    let training = &config.training;
    let mut rng = StdRng::seed_from_u64(training.seed);
    let model = ConvClassifier::new(config.model.clone(), poscount, index.watermark(), &mut rng);
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Model: {} parameters, {} convolution features",
            model.parameter_count(),
            model.feature_width()
        ),
    );

    let train_config = TrainConfig {
        epochs: training.epochs,
        batch_size: training.batch_size,
        seed: training.seed,
        log_level: level,
    };
    let mut trainer =
        Trainer::new(model, Box::new(Adam::default_params(training.learning_rate)), train_config);
    let train = trainer.train(&features);
    let model = trainer.into_model();

    let validation = match &config.data.valn_dir {
        Some(dir) => {
            let runs = read_validation_dir(dir)?;
            if runs.is_empty() {
                log(
                    level,
                    LogLevel::Normal,
                    &format!("No .s/.f fuzzlogs in {}; skipping validation", dir.display()),
                );
                None
            } else {
                let report = validate_runs(&model, &index, &runs, training.threshold)?;
                log(
                    level,
                    LogLevel::Normal,
                    &format!(
                        "Validation: {}/{} correct ({:.4}) at threshold {}",
                        report.correct.len(),
                        report.predictions.len(),
                        report.fraction,
                        report.threshold
                    ),
                );
                Some(report)
            }
        }
        None => None,
    };

    let checkpoint = match &config.output {
        Some(path) => {
            let mut metadata = ModelMetadata::new("exetree");
            metadata.epochs = train.final_epoch;
            metadata.final_loss = train.history.last().map(|m| m.loss);
            save_model(&model, &index, path, &SaveConfig::new(metadata))?;
            log(level, LogLevel::Normal, &format!("Saved model to {}", path.display()));
            Some(path.clone())
        }
        None => None,
    };

    Ok(PipelineResult { summary, train, validation, checkpoint, model, index })
}
