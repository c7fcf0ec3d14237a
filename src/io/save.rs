//! Model saving functionality

use super::format::ModelFormat;
use super::model::{Checkpoint, ModelMetadata};
use crate::model::ConvClassifier;
use crate::tree::LocationIndex;
use exetree_common::{ExetreeError, Result};
use std::fs;
use std::path::Path;

/// How a checkpoint is written
#[derive(Debug, Clone, PartialEq)]
pub struct SaveConfig {
    /// Indent JSON output
    pub pretty: bool,
    /// Descriptive metadata stored with the weights
    pub metadata: ModelMetadata,
}

impl SaveConfig {
    /// Pretty JSON.
    pub fn new(metadata: ModelMetadata) -> Self {
        Self { pretty: true, metadata }
    }
}

/// Save `model` and the location index it was trained with.
///
/// `.yaml` / `.yml` paths are written as YAML, anything else as JSON.
///
/// # Example
///
/// ```no_run
/// use exetree::io::{save_model, ModelMetadata, SaveConfig};
/// # let model: exetree::model::ConvClassifier = todo!();
/// # let index = exetree::tree::LocationIndex::new();
///
/// save_model(&model, &index, "model.json", &SaveConfig::new(ModelMetadata::new("fuzz"))).unwrap();
/// ```
pub fn save_model(
    model: &ConvClassifier,
    locidx: &LocationIndex,
    path: impl AsRef<Path>,
    config: &SaveConfig,
) -> Result<()> {
    let path = path.as_ref();
    let checkpoint = Checkpoint::capture(model, locidx, config.metadata.clone());
    let format = ModelFormat::from_path(path);

    let data = match format {
        ModelFormat::Json if config.pretty => serde_json::to_string_pretty(&checkpoint)
            .map_err(|e| ExetreeError::Serialization {
                message: format!("JSON serialization failed: {e}"),
            })?,
        ModelFormat::Json => serde_json::to_string(&checkpoint).map_err(|e| {
            ExetreeError::Serialization { message: format!("JSON serialization failed: {e}") }
        })?,
        ModelFormat::Yaml => serde_yaml::to_string(&checkpoint).map_err(|e| {
            ExetreeError::Serialization { message: format!("YAML serialization failed: {e}") }
        })?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ExetreeError::io(format!("creating {}", parent.display()), e))?;
    }
    fs::write(path, data)
        .map_err(|e| ExetreeError::io(format!("writing checkpoint {}", path.display()), e))
}
