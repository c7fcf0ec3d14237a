//! CLI command tests

use super::*;
use crate::cli::args::{InfoArgs, TrainArgs, ValidateArgs};
use exetree_common::{CommonArgs, ExetreeError, LogLevel, OutputFormat};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_fuzzlogs(root: &Path) {
    let train = root.join("train");
    let valn = root.join("valn");
    fs::create_dir_all(&train).unwrap();
    fs::create_dir_all(&valn).unwrap();
    fs::write(train.join("0.0"), "1 main\n2 parse\n3 ok\n").unwrap();
    fs::write(train.join("1.1"), "1 main\n2 parse\n-1 err\n").unwrap();
    fs::write(train.join("2.0"), "1 main\n5 fast\n").unwrap();
    fs::write(valn.join("a.s"), "1 main\n2 parse\n3 ok\n").unwrap();
    fs::write(valn.join("b.f"), "1 main\n9 unseen\n").unwrap();
}

fn train_args(root: &Path) -> TrainArgs {
    TrainArgs {
        config: None,
        train_dir: Some(root.join("train")),
        valn_dir: Some(root.join("valn")),
        epochs: Some(2),
        batch_size: None,
        lr: None,
        seed: Some(1),
        output: Some(root.join("model.json")),
        dry_run: false,
    }
}

fn quiet(command: Command) -> Cli {
    Cli { command, common: CommonArgs { verbose: false, quiet: true } }
}

#[test]
fn test_train_then_validate() {
    let dir = TempDir::new().unwrap();
    write_fuzzlogs(dir.path());

    run_command(quiet(Command::Train(train_args(dir.path())))).unwrap();
    assert!(dir.path().join("model.json").is_file());

    let args = ValidateArgs {
        model: dir.path().join("model.json"),
        valn_dir: dir.path().join("valn"),
        threshold: 0.7,
        format: OutputFormat::Json,
    };
    run_command(quiet(Command::Validate(args))).unwrap();
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_fuzzlogs(dir.path());

    let args = TrainArgs { dry_run: true, ..train_args(dir.path()) };
    run_command(quiet(Command::Train(args))).unwrap();
    assert!(!dir.path().join("model.json").exists());
}

#[test]
fn test_dry_run_still_validates_config() {
    let dir = TempDir::new().unwrap();
    let args = TrainArgs { dry_run: true, epochs: Some(0), ..train_args(dir.path()) };
    let err = run_command(quiet(Command::Train(args))).unwrap_err();
    assert!(matches!(err, ExetreeError::ConfigValue { .. }));
}

#[test]
fn test_train_missing_dir() {
    let dir = TempDir::new().unwrap();
    let err = run_command(quiet(Command::Train(train_args(dir.path())))).unwrap_err();
    assert!(matches!(err, ExetreeError::DataDirNotFound { .. }));
    assert!(err.is_user_error());
}

#[test]
fn test_info_formats() {
    let dir = TempDir::new().unwrap();
    write_fuzzlogs(dir.path());
    for format in [OutputFormat::Text, OutputFormat::Json] {
        let args = InfoArgs { config: None, train_dir: Some(dir.path().join("train")), format };
        run_command(quiet(Command::Info(args))).unwrap();
    }
}

#[test]
fn test_format_tree_info() {
    let dir = TempDir::new().unwrap();
    write_fuzzlogs(dir.path());
    let tree = crate::pipeline::build_tree(dir.path().join("train")).unwrap();
    let summary = crate::pipeline::TreeSummary::of(&tree);
    let text = info::format_tree_info(Path::new("train"), &summary);
    assert!(text.contains("Fuzzlogs: 3 (2 successful)"));
    assert!(text.contains("Leaves: 3"));
    assert!(text.contains("Depth (poscount): 3"));
    assert!(text.contains("watermark 6"));
}

#[test]
fn test_validate_missing_model() {
    let dir = TempDir::new().unwrap();
    let args = ValidateArgs {
        model: dir.path().join("nope.json"),
        valn_dir: dir.path().to_path_buf(),
        threshold: 0.7,
        format: OutputFormat::Text,
    };
    let err = run_command(quiet(Command::Validate(args))).unwrap_err();
    assert!(matches!(err, ExetreeError::ModelNotFound { .. }));
}

#[test]
fn test_log_level_comes_from_flags() {
    let cli = Cli {
        command: Command::Info(InfoArgs {
            config: None,
            train_dir: Some("/nonexistent".into()),
            format: OutputFormat::Text,
        }),
        common: CommonArgs { verbose: true, quiet: false },
    };
    assert_eq!(cli.common.log_level(), LogLevel::Verbose);
    assert!(run_command(cli).is_err());
}
