//! Configuration validation
//!
//! Checks value ranges before any fuzzlog is read. Path existence is checked
//! later, when the directories are actually listed.

use super::schema::ExetreeConfig;
use exetree_common::{ExetreeError, Result};

fn invalid(field: &str, message: String, suggestion: &str) -> ExetreeError {
    ExetreeError::ConfigValue {
        field: field.to_string(),
        message,
        suggestion: suggestion.to_string(),
    }
}

/// Validate a run configuration
pub fn validate_config(config: &ExetreeConfig) -> Result<()> {
    let model = &config.model;
    if model.embedding_dim == 0 {
        return Err(invalid("model.embedding_dim", "must be > 0".into(), "Use 4"));
    }
    if model.filter_sizes.is_empty() {
        return Err(invalid(
            "model.filter_sizes",
            "at least one filter size is required".into(),
            "Use [3, 8]",
        ));
    }
    if let Some(&size) = model.filter_sizes.iter().find(|&&k| k == 0) {
        return Err(invalid(
            "model.filter_sizes",
            format!("filter size {size} is not positive"),
            "Every kernel length must be >= 1",
        ));
    }
    if model.num_filters == 0 {
        return Err(invalid("model.num_filters", "must be > 0".into(), "Use 1"));
    }
    if model.hidden_dims == 0 {
        return Err(invalid("model.hidden_dims", "must be > 0".into(), "Use 10"));
    }
    let rates = [("model.dropout[0]", model.dropout.0), ("model.dropout[1]", model.dropout.1)];
    for (field, rate) in rates {
        if !(0.0..1.0).contains(&rate) {
            return Err(invalid(field, format!("{rate} is outside [0, 1)"), "Use 0.01"));
        }
    }

    let training = &config.training;
    if training.epochs == 0 {
        return Err(invalid("training.epochs", "must be > 0".into(), "Use 1"));
    }
    if training.batch_size == 0 {
        return Err(invalid("training.batch_size", "must be > 0".into(), "Use 50"));
    }
    if !(training.learning_rate > 0.0 && training.learning_rate <= 1.0) {
        return Err(invalid(
            "training.learning_rate",
            format!("{} must be in (0, 1]", training.learning_rate),
            "Use 0.01",
        ));
    }
    if !training.threshold.is_finite() {
        return Err(invalid(
            "training.threshold",
            format!("{} is not a number", training.threshold),
            "Use 0.7",
        ));
    }
    Ok(())
}
