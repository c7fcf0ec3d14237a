//! Scoring a trained model on held-out runs

use super::classification::{correct_fraction, score, ConfusionMatrix};
use crate::encode::encode_runs;
use crate::model::ConvClassifier;
use crate::tree::{LocationIndex, Observation};
use exetree_common::{ExetreeError, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Prediction for one validation fuzzlog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplePrediction {
    /// Fuzzlog the run came from
    pub path: PathBuf,
    /// Predicted success probability
    pub probability: f64,
    /// Recorded outcome
    pub succeeded: bool,
}

/// Outcome of validating a model on labelled runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Decision threshold used
    pub threshold: f64,
    /// Indices of correctly classified runs
    pub correct: Vec<usize>,
    /// `correct.len() / predictions.len()`
    pub fraction: f64,
    /// Outcome counts
    pub confusion: ConfusionMatrix,
    /// Per-run predictions in input order
    pub predictions: Vec<SamplePrediction>,
}

/// Encode each whole run as one row and score the model's predictions.
///
/// Runs are encoded with the model's `poscount` and the training index, so
/// locations never seen during training read as padding.
pub fn validate_runs(
    model: &ConvClassifier,
    locidx: &LocationIndex,
    runs: &[(PathBuf, Vec<Observation>, bool)],
    threshold: f64,
) -> Result<ValidationReport> {
    if runs.is_empty() {
        return Err(ExetreeError::EmptyValidationSet);
    }

    let features = encode_runs(
        runs.iter().map(|(_, observations, succeeded)| (observations.as_slice(), *succeeded)),
        model.poscount(),
        locidx,
    );
    let probabilities = model.predict(&features);

    let correct = score(&probabilities, &features.labels, threshold)?;
    let fraction = correct_fraction(&probabilities, &features.labels, threshold)?;
    let confusion = ConfusionMatrix::from_predictions(&probabilities, &features.labels, threshold)?;
    let predictions = runs
        .iter()
        .zip(&probabilities)
        .map(|((path, _, succeeded), &probability)| SamplePrediction {
            path: path.clone(),
            probability,
            succeeded: *succeeded,
        })
        .collect();

    Ok(ValidationReport { threshold, correct, fraction, confusion, predictions })
}
