//! Scoring predictions against known outcomes
//!
//! - `classification`: thresholded scoring and a binary confusion matrix
//! - `validation`: encode held-out fuzzlogs and score a trained model
//!
//! ## Example
//!
//! ```
//! use exetree::eval::score;
//!
//! let correct = score(&[0.9, 0.2, 0.8], &[true, true, false], 0.7).unwrap();
//! assert_eq!(correct, vec![0]);
//! ```

pub mod classification;
pub mod validation;

pub use classification::{correct_fraction, score, ConfusionMatrix, DEFAULT_THRESHOLD};
pub use validation::{validate_runs, ValidationReport};
