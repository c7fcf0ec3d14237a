//! Info command implementation

use crate::cli::args::InfoArgs;
use crate::config::load_or_default;
use crate::pipeline::{build_tree, TreeSummary};
use exetree_common::{log, ExetreeError, LogLevel, OutputFormat, Result};
use std::path::Path;

/// Human-readable tree statistics.
pub fn format_tree_info(train_dir: &Path, summary: &TreeSummary) -> String {
    [
        format!("Training data: {}", train_dir.display()),
        format!("  Fuzzlogs: {} ({} successful)", summary.runs, summary.successful_runs),
        format!("  Nodes: {} ({} reach success)", summary.nodes, summary.success_nodes),
        format!("  Leaves: {}", summary.leaves),
        format!("  Depth (poscount): {}", summary.depth),
        format!("  Locations: {} (watermark {})", summary.locations, summary.locations + 1),
    ]
    .join("\n")
}

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<()> {
    let mut config = load_or_default(args.config.as_deref())?;
    if let Some(train_dir) = args.train_dir {
        config.data.train_dir = train_dir;
    }

    let tree = build_tree(&config.data.train_dir)?;
    let summary = TreeSummary::of(&tree);

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, &format_tree_info(&config.data.train_dir, &summary));
            if level == LogLevel::Verbose {
                for (i, tag) in tree.location_index().tags().iter().enumerate() {
                    println!("    {:>4}  {tag}", i + 1);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "train_dir": config.data.train_dir,
                "tree": summary,
            });
            let text = serde_json::to_string_pretty(&json).map_err(|e| {
                ExetreeError::Serialization { message: format!("JSON serialization error: {e}") }
            })?;
            println!("{text}");
        }
    }

    Ok(())
}
