//! Reading configuration files

use super::schema::ExetreeConfig;
use super::validate::validate_config;
use exetree_common::{ExetreeError, Result};
use std::fs;
use std::path::Path;

/// Parse YAML text. `path` is only used in error messages.
pub fn parse_config(yaml: &str, path: &Path) -> Result<ExetreeConfig> {
    // An empty document deserializes as null rather than an empty mapping.
    if yaml.trim().is_empty() {
        return Ok(ExetreeConfig::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| ExetreeError::ConfigParsing {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and validate a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ExetreeConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ExetreeError::ConfigNotFound { path: path.to_path_buf() });
    }
    let yaml = fs::read_to_string(path)
        .map_err(|e| ExetreeError::io(format!("reading config {}", path.display()), e))?;
    let config = parse_config(&yaml, path)?;
    validate_config(&config)?;
    Ok(config)
}

/// [`load_config`] when a path is given, the defaults otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<ExetreeConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(ExetreeConfig::default()),
    }
}
