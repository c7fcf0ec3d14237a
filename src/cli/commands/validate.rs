//! Validate command implementation

use crate::cli::args::ValidateArgs;
use crate::eval::{validate_runs, ValidationReport};
use crate::io::load_model;
use crate::logparse::read_validation_dir;
use exetree_common::{log, ExetreeError, LogLevel, OutputFormat, Result};

/// One line per run: probability, outcome, and whether the call was right.
pub fn format_predictions(report: &ValidationReport) -> String {
    report
        .predictions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mark = if report.correct.binary_search(&i).is_ok() { "ok" } else { "MISS" };
            let outcome = if p.succeeded { "success" } else { "failure" };
            format!("  {:<4} {:.4} {outcome:<7} {}", mark, p.probability, p.path.display())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<()> {
    let (model, index) = load_model(&args.model)?;
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Loaded {}: poscount {}, {} locations",
            args.model.display(),
            model.poscount(),
            index.len()
        ),
    );

    let runs = read_validation_dir(&args.valn_dir)?;
    let report = validate_runs(&model, &index, &runs, args.threshold)?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Verbose, &format_predictions(&report));
            log(level, LogLevel::Verbose, &report.confusion.to_string());
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "Correct: {}/{} ({:.4}) at threshold {}",
                    report.correct.len(),
                    report.predictions.len(),
                    report.fraction,
                    report.threshold
                ),
            );
        }
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(&report).map_err(|e| {
                ExetreeError::Serialization { message: format!("JSON serialization error: {e}") }
            })?;
            println!("{text}");
        }
    }
    Ok(())
}
