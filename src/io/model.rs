//! Serializable checkpoint structure

use crate::model::{ConvClassifier, ModelConfig};
use crate::tree::LocationIndex;
use exetree_common::{ExetreeError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Bumped whenever the checkpoint layout changes.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Descriptive fields carried alongside the weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Version of the crate that wrote the checkpoint
    pub version: String,

    /// Training epochs that produced the weights
    #[serde(default)]
    pub epochs: usize,

    /// Final training loss, if training ran
    #[serde(default)]
    pub final_loss: Option<f64>,
}

impl ModelMetadata {
    /// Metadata stamped with this crate's version
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            epochs: 0,
            final_loss: None,
        }
    }
}

/// Name and length of one flattened tensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Stable tensor name, e.g. `conv0.weight`
    pub name: String,
    /// Number of values
    pub len: usize,
}

/// Everything needed to rebuild a trained classifier and its location index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Layout version, see [`CHECKPOINT_VERSION`]
    pub format_version: u32,

    /// Descriptive metadata
    pub metadata: ModelMetadata,

    /// Row width the model was trained with
    pub poscount: usize,

    /// Location tags in id order (tag `i` has id `i + 1`)
    pub tags: Vec<String>,

    /// Network hyper-parameters
    pub config: ModelConfig,

    /// Tensor layout, in the order of `data`
    pub parameters: Vec<ParameterInfo>,

    /// All tensors, flattened and concatenated
    pub data: Vec<f64>,
}

impl Checkpoint {
    /// Snapshot `model` together with the index its ids came from.
    pub fn capture(
        model: &ConvClassifier,
        locidx: &LocationIndex,
        metadata: ModelMetadata,
    ) -> Self {
        let mut parameters = Vec::new();
        let mut data = Vec::new();
        for (name, tensor) in model.tensors() {
            parameters.push(ParameterInfo { name, len: tensor.len() });
            data.extend(tensor.iter().copied());
        }
        Self {
            format_version: CHECKPOINT_VERSION,
            metadata,
            poscount: model.poscount(),
            tags: locidx.tags().to_vec(),
            config: model.config().clone(),
            parameters,
            data,
        }
    }

    /// Rebuild the classifier and location index.
    ///
    /// # Errors
    ///
    /// [`ExetreeError::Serialization`] for an unknown format version,
    /// [`ExetreeError::ShapeMismatch`] when the stored tensors do not fit the
    /// architecture described by `config`, `poscount` and `tags`.
    pub fn restore(&self) -> Result<(ConvClassifier, LocationIndex)> {
        if self.format_version != CHECKPOINT_VERSION {
            return Err(ExetreeError::Serialization {
                message: format!(
                    "unsupported checkpoint version {} (expected {CHECKPOINT_VERSION})",
                    self.format_version
                ),
            });
        }

        let total: usize = self.parameters.iter().map(|p| p.len).sum();
        if total != self.data.len() {
            return Err(ExetreeError::ShapeMismatch {
                expected: vec![total],
                actual: vec![self.data.len()],
            });
        }

        let locidx = LocationIndex::from_tags(self.tags.iter().cloned());
        // Initial values are all overwritten below.
        let mut rng = StdRng::seed_from_u64(0);
        let mut model =
            ConvClassifier::new(self.config.clone(), self.poscount, locidx.watermark(), &mut rng);

        let slots = model.tensors_mut();
        if slots.len() != self.parameters.len() {
            return Err(ExetreeError::ShapeMismatch {
                expected: vec![slots.len()],
                actual: vec![self.parameters.len()],
            });
        }

        let mut offset = 0;
        for ((name, slot), info) in slots.into_iter().zip(&self.parameters) {
            if name != info.name || slot.len() != info.len {
                return Err(ExetreeError::ShapeMismatch {
                    expected: vec![slot.len()],
                    actual: vec![info.len],
                });
            }
            slot.as_slice_mut()
                .ok_or_else(|| ExetreeError::Internal {
                    message: format!("tensor {name} is not contiguous"),
                })?
                .copy_from_slice(&self.data[offset..offset + info.len]);
            offset += info.len;
        }

        Ok((model, locidx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ConvClassifier, LocationIndex) {
        let locidx = LocationIndex::from_tags(["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(9);
        let model = ConvClassifier::new(ModelConfig::default(), 9, locidx.watermark(), &mut rng);
        (model, locidx)
    }

    #[test]
    fn test_capture_restore_preserves_tensors() {
        let (model, locidx) = sample();
        let checkpoint = Checkpoint::capture(&model, &locidx, ModelMetadata::new("t"));
        let (restored, restored_idx) = checkpoint.restore().unwrap();

        assert_eq!(restored_idx, locidx);
        assert_eq!(restored.poscount(), 9);
        let before: Vec<Vec<f64>> = model.tensors().iter().map(|(_, t)| t.to_vec()).collect();
        let after: Vec<Vec<f64>> = restored.tensors().iter().map(|(_, t)| t.to_vec()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_truncated_data_is_rejected() {
        let (model, locidx) = sample();
        let mut checkpoint = Checkpoint::capture(&model, &locidx, ModelMetadata::new("t"));
        checkpoint.data.pop();
        let err = checkpoint.restore().unwrap_err();
        assert!(matches!(err, ExetreeError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_tags_must_match_embedding() {
        let (model, locidx) = sample();
        let mut checkpoint = Checkpoint::capture(&model, &locidx, ModelMetadata::new("t"));
        checkpoint.tags.push("d".to_string());
        let err = checkpoint.restore().unwrap_err();
        assert!(matches!(err, ExetreeError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let (model, locidx) = sample();
        let mut checkpoint = Checkpoint::capture(&model, &locidx, ModelMetadata::new("t"));
        checkpoint.format_version = 99;
        assert!(matches!(checkpoint.restore(), Err(ExetreeError::Serialization { .. })));
    }
}
