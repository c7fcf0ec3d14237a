//! End-to-end tests: fuzzlog directories in, trained and reloaded model out.

use exetree::config::{DataConfig, ExetreeConfig, TrainingConfig};
use exetree::eval::validate_runs;
use exetree::io::load_model;
use exetree::logparse::read_validation_dir;
use exetree::pipeline::run_pipeline;
use exetree::{
    encode, encode_runs, score, ExecutionTree, ExetreeError, LogLevel, Observation,
    DEFAULT_THRESHOLD,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_logs(dir: &Path, logs: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    for (name, content) in logs {
        fs::write(dir.join(name), content).unwrap();
    }
}

fn corpus(root: &Path) -> (PathBuf, PathBuf) {
    let train = root.join("train");
    let valn = root.join("valn");
    write_logs(
        &train,
        &[
            ("0.0", "1 main\n1 parse\n1 ok\n"),
            ("1.1", "1 main\n0 parse\n0 err\n"),
            ("2.0", "1 main\n1 parse\n2 ok\n"),
            ("3.139", "1 main\n0 parse\n"),
            ("4.1", "0 main\n"),
        ],
    );
    write_logs(
        &valn,
        &[
            ("a.s", "1 main\n1 parse\n1 ok\n"),
            ("b.f", "1 main\n0 parse\n0 err\n"),
            ("c.f", "0 main\n9 unseen\n"),
            ("notes.txt", "not a fuzzlog\n"),
        ],
    );
    (train, valn)
}

fn config(train: &Path, valn: Option<&Path>, output: Option<&Path>) -> ExetreeConfig {
    ExetreeConfig {
        data: DataConfig {
            train_dir: train.to_path_buf(),
            valn_dir: valn.map(Path::to_path_buf),
        },
        training: TrainingConfig { epochs: 5, batch_size: 4, ..TrainingConfig::default() },
        output: output.map(Path::to_path_buf),
        ..ExetreeConfig::default()
    }
}

#[test]
fn test_full_pipeline_trains_validates_and_saves() {
    let dir = TempDir::new().unwrap();
    let (train, valn) = corpus(dir.path());
    let output = dir.path().join("out").join("model.json");

    let result =
        run_pipeline(&config(&train, Some(&valn), Some(&output)), LogLevel::Quiet).unwrap();

    assert_eq!(result.summary.runs, 5);
    assert_eq!(result.summary.successful_runs, 2);
    assert_eq!(result.summary.depth, 3);
    assert_eq!(result.summary.locations, 4);
    // root, main(1), main(0), parse(1), parse(0), ok(1), ok(2), err(0)
    assert_eq!(result.summary.nodes, 8);
    // root, main(1), parse(1), ok(1), ok(2)
    assert_eq!(result.summary.success_nodes, 5);
    // ok(1), ok(2), err(0), main(0)
    assert_eq!(result.summary.leaves, 4);

    // 8 rows in batches of 4, five epochs
    assert_eq!(result.train.steps, 10);
    assert_eq!(result.train.history.len(), 5);
    assert!(result.train.final_loss.is_finite());

    let report = result.validation.unwrap();
    assert_eq!(report.predictions.len(), 3);
    assert!(report.correct.len() <= 3);
    assert!((0.0..=1.0).contains(&report.fraction));
    assert_eq!(report.confusion.total(), 3);

    assert_eq!(result.checkpoint.as_deref(), Some(output.as_path()));
    assert!(output.exists());
}

#[test]
fn test_reloaded_model_reproduces_predictions() {
    let dir = TempDir::new().unwrap();
    let (train, valn) = corpus(dir.path());
    let runs = read_validation_dir(&valn).unwrap();

    for name in ["model.json", "model.yaml"] {
        let output = dir.path().join(name);
        let result = run_pipeline(&config(&train, None, Some(&output)), LogLevel::Quiet).unwrap();
        let (model, index) = load_model(&output).unwrap();

        assert_eq!(index.tags(), result.index.tags());
        assert_eq!(model.poscount(), result.model.poscount());

        let features = encode_runs(
            runs.iter().map(|(_, obs, ok)| (obs.as_slice(), *ok)),
            model.poscount(),
            &index,
        );
        let before = result.model.predict(&features);
        let after = model.predict(&features);
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-9, "{name}: {a} vs {b}");
        }
    }
}

#[test]
fn test_training_is_deterministic_for_a_seed() {
    let dir = TempDir::new().unwrap();
    let (train, _) = corpus(dir.path());
    let cfg = config(&train, None, None);

    let a = run_pipeline(&cfg, LogLevel::Quiet).unwrap();
    let b = run_pipeline(&cfg, LogLevel::Quiet).unwrap();
    let losses_a: Vec<f64> = a.train.history.iter().map(|m| m.loss).collect();
    let losses_b: Vec<f64> = b.train.history.iter().map(|m| m.loss).collect();
    assert_eq!(losses_a, losses_b);
}

#[test]
fn test_malformed_fuzzlog_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let train = dir.path().join("train");
    write_logs(&train, &[("0.0", "1 main\n"), ("1.1", "main\n")]);

    let err = run_pipeline(&config(&train, None, None), LogLevel::Quiet).unwrap_err();
    assert!(matches!(err, ExetreeError::MalformedLog { .. }), "{err:?}");
}

#[test]
fn test_empty_validation_dir_skips_validation() {
    let dir = TempDir::new().unwrap();
    let (train, _) = corpus(dir.path());
    let valn = dir.path().join("empty");
    write_logs(&valn, &[("README", "no labelled runs here\n")]);
    let output = dir.path().join("model.json");

    let result =
        run_pipeline(&config(&train, Some(&valn), Some(&output)), LogLevel::Quiet).unwrap();
    assert!(result.validation.is_none());
    assert_eq!(result.checkpoint.as_deref(), Some(output.as_path()));
    assert!(output.exists());
}

#[test]
fn test_validate_runs_rejects_empty_set() {
    let dir = TempDir::new().unwrap();
    let (train, _) = corpus(dir.path());
    let valn = dir.path().join("empty");
    fs::create_dir_all(&valn).unwrap();
    let result = run_pipeline(&config(&train, None, None), LogLevel::Quiet).unwrap();

    let runs = read_validation_dir(&valn).unwrap();
    let err = validate_runs(&result.model, &result.index, &runs, DEFAULT_THRESHOLD).unwrap_err();
    assert!(matches!(err, ExetreeError::EmptyValidationSet), "{err:?}");
}

#[test]
fn test_two_run_example() {
    let mut tree = ExecutionTree::new();
    tree.add(&[Observation::new("X", 1.0)], true);
    tree.add(&[Observation::new("X", 1.0), Observation::new("Y", 2.0)], false);

    let x = tree.find(&[Observation::new("X", 1.0)]).unwrap();
    let xy = tree.find(&[Observation::new("X", 1.0), Observation::new("Y", 2.0)]).unwrap();
    assert!(tree.root().reaches_success());
    assert!(tree.node(x).unwrap().reaches_success());
    assert!(!tree.node(xy).unwrap().reaches_success());
    assert_eq!(tree.depth(), 2);

    let index = tree.location_index();
    assert_eq!(index.get_index("X"), Some(1));
    assert_eq!(index.get_index("Y"), Some(2));
    assert_eq!(index.watermark(), 3);

    let features = encode(&tree, tree.depth(), index);
    assert_eq!(features.labels, vec![true, true, false]);
    assert_eq!(features.locs.row(2).to_vec(), vec![1, 2]);
    assert_eq!(features.vals.row(1).to_vec(), vec![1.0, 0.0]);
}

#[test]
fn test_score_agreement_rule() {
    let correct = score(&[0.9, 0.2, 0.8], &[true, true, false], 0.7).unwrap();
    assert_eq!(correct, vec![0]);
}
