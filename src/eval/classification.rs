//! Binary classification scoring
//!
//! A prediction counts as "success" when its probability is strictly greater
//! than the threshold.

use exetree_common::{ExetreeError, Result};
use serde::Serialize;
use std::fmt;

/// Threshold used when none is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

fn check_lengths(probabilities: &[f64], labels: &[bool]) -> Result<()> {
    if probabilities.len() == labels.len() {
        Ok(())
    } else {
        Err(ExetreeError::LengthMismatch {
            expected: labels.len(),
            actual: probabilities.len(),
        })
    }
}

/// Indices `i`, ascending, where `(probabilities[i] > threshold) == labels[i]`.
pub fn score(probabilities: &[f64], labels: &[bool], threshold: f64) -> Result<Vec<usize>> {
    check_lengths(probabilities, labels)?;
    Ok(probabilities
        .iter()
        .zip(labels)
        .enumerate()
        .filter(|&(_, (&p, &label))| (p > threshold) == label)
        .map(|(i, _)| i)
        .collect())
}

/// Fraction of predictions that [`score`] counts as correct.
///
/// # Errors
///
/// [`ExetreeError::EmptyValidationSet`] when there is nothing to score.
pub fn correct_fraction(probabilities: &[f64], labels: &[bool], threshold: f64) -> Result<f64> {
    let correct = score(probabilities, labels, threshold)?;
    if labels.is_empty() {
        return Err(ExetreeError::EmptyValidationSet);
    }
    Ok(correct.len() as f64 / labels.len() as f64)
}

/// Outcome counts for a binary success/failure classifier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// Predicted success, ran successfully
    pub true_positives: usize,
    /// Predicted success, failed
    pub false_positives: usize,
    /// Predicted failure, failed
    pub true_negatives: usize,
    /// Predicted failure, ran successfully
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Tally predictions at `threshold`.
    pub fn from_predictions(
        probabilities: &[f64],
        labels: &[bool],
        threshold: f64,
    ) -> Result<Self> {
        check_lengths(probabilities, labels)?;
        let mut cm = Self::default();
        for (&p, &label) in probabilities.iter().zip(labels) {
            match (p > threshold, label) {
                (true, true) => cm.true_positives += 1,
                (true, false) => cm.false_positives += 1,
                (false, false) => cm.true_negatives += 1,
                (false, true) => cm.false_negatives += 1,
            }
        }
        Ok(cm)
    }

    /// Total samples
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Correct predictions
    pub fn correct(&self) -> usize {
        self.true_positives + self.true_negatives
    }

    /// Fraction correct, 0.0 when empty
    pub fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.correct() as f64 / self.total() as f64
        }
    }

    /// TP / (TP + FP), 0.0 when nothing was predicted successful
    pub fn precision(&self) -> f64 {
        let predicted = self.true_positives + self.false_positives;
        if predicted == 0 {
            0.0
        } else {
            self.true_positives as f64 / predicted as f64
        }
    }

    /// TP / (TP + FN), 0.0 when nothing succeeded
    pub fn recall(&self) -> f64 {
        let actual = self.true_positives + self.false_negatives;
        if actual == 0 {
            0.0
        } else {
            self.true_positives as f64 / actual as f64
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "              Pred success  Pred failure")?;
        writeln!(f, "True success  {:>12}  {:>12}", self.true_positives, self.false_negatives)?;
        write!(f, "True failure  {:>12}  {:>12}", self.false_positives, self.true_negatives)
    }
}
