//! Error types with actionable diagnostics.
//!
//! Every error names the offending input and says what to try next, so a
//! failed training run can be fixed without reading the source.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for exetree operations.
pub type Result<T> = std::result::Result<T, ExetreeError>;

/// Errors that can occur while building, training or validating.
#[derive(Error, Debug)]
pub enum ExetreeError {
    /// Configuration file not found at expected path.
    #[error("Configuration file not found: {path}\n  → Create a config file or omit it to use the defaults")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file has invalid syntax.
    #[error("Invalid configuration syntax in {path}:\n  {message}\n  → Check YAML syntax at the indicated line")]
    ConfigParsing { path: PathBuf, message: String },

    /// Configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {message}\n  → {suggestion}")]
    ConfigValue { field: String, message: String, suggestion: String },

    /// Fuzzlog directory is missing.
    #[error("Fuzzlog directory not found: {path}\n  → Create it and fill it with fuzzlogs, or pass a different directory")]
    DataDirNotFound { path: PathBuf },

    /// A fuzzlog line could not be parsed.
    #[error("Malformed fuzzlog {path}:{line}: {message}\n  → Each line must read '<value> <location>'")]
    MalformedLog { path: PathBuf, line: usize, message: String },

    /// Fraction-correct was requested over zero samples.
    #[error("Validation set is empty\n  → Add '.s' (success) or '.f' (failure) fuzzlogs to the validation directory")]
    EmptyValidationSet,

    /// Two sequences that must be index-aligned have different lengths.
    #[error("Length mismatch: expected {expected}, got {actual}\n  → Predictions and labels must come from the same samples")]
    LengthMismatch { expected: usize, actual: usize },

    /// Model checkpoint not found.
    #[error("Model checkpoint not found: {path}\n  → Train a model with 'exetree train --output <path>' first")]
    ModelNotFound { path: PathBuf },

    /// Invalid tensor shape.
    #[error("Tensor shape mismatch: expected {expected:?}, got {actual:?}\n  → The checkpoint does not match the model architecture")]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic error for unexpected conditions.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ExetreeError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Check if this error is user-recoverable.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParsing { .. }
                | Self::ConfigValue { .. }
                | Self::DataDirNotFound { .. }
                | Self::MalformedLog { .. }
                | Self::EmptyValidationSet
                | Self::ModelNotFound { .. }
        )
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "E001",
            Self::ConfigParsing { .. } => "E002",
            Self::ConfigValue { .. } => "E003",
            Self::DataDirNotFound { .. } => "E010",
            Self::MalformedLog { .. } => "E011",
            Self::EmptyValidationSet => "E020",
            Self::LengthMismatch { .. } => "E021",
            Self::ModelNotFound { .. } => "E030",
            Self::ShapeMismatch { .. } => "E031",
            Self::Io { .. } => "E050",
            Self::Serialization { .. } => "E051",
            Self::Internal { .. } => "E999",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_unique() {
        let errors = vec![
            ExetreeError::ConfigNotFound { path: "".into() },
            ExetreeError::ConfigParsing { path: "".into(), message: "".into() },
            ExetreeError::ConfigValue {
                field: "".into(),
                message: "".into(),
                suggestion: "".into(),
            },
            ExetreeError::DataDirNotFound { path: "".into() },
            ExetreeError::MalformedLog { path: "".into(), line: 0, message: "".into() },
            ExetreeError::EmptyValidationSet,
            ExetreeError::LengthMismatch { expected: 0, actual: 0 },
            ExetreeError::ModelNotFound { path: "".into() },
            ExetreeError::ShapeMismatch { expected: vec![], actual: vec![] },
            ExetreeError::io("", std::io::Error::new(std::io::ErrorKind::Other, "")),
            ExetreeError::Serialization { message: "".into() },
            ExetreeError::Internal { message: "".into() },
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
        assert!(codes.iter().all(|c| c.starts_with('E')));
    }

    #[test]
    fn test_user_errors_are_recoverable() {
        assert!(ExetreeError::ConfigNotFound { path: "".into() }.is_user_error());
        assert!(ExetreeError::EmptyValidationSet.is_user_error());
        assert!(!ExetreeError::Internal { message: "".into() }.is_user_error());
        assert!(!ExetreeError::ShapeMismatch { expected: vec![1], actual: vec![2] }
            .is_user_error());
    }

    #[test]
    fn test_malformed_log_names_location() {
        let err = ExetreeError::MalformedLog {
            path: "train/7.0".into(),
            line: 12,
            message: "invalid value 'abc'".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("train/7.0:12"));
        assert!(msg.contains("abc"));
        assert!(msg.contains("<value> <location>"));
    }

    #[test]
    fn test_io_error_constructor() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ExetreeError::io("reading fuzzlog", io_err);

        assert!(matches!(err, ExetreeError::Io { .. }));
        assert!(err.to_string().contains("reading fuzzlog"));
    }

    #[test]
    fn test_config_value_error_includes_suggestion() {
        let err = ExetreeError::ConfigValue {
            field: "training.batch_size".into(),
            message: "must be positive".into(),
            suggestion: "Use a value like 50".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("training.batch_size"));
        assert!(msg.contains("must be positive"));
        assert!(msg.contains("Use a value like 50"));
    }

    #[test]
    fn test_length_mismatch_display() {
        let err = ExetreeError::LengthMismatch { expected: 3, actual: 2 };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('2'));
    }
}
