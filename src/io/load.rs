//! Model loading functionality

use super::format::ModelFormat;
use super::model::Checkpoint;
use crate::model::ConvClassifier;
use crate::tree::LocationIndex;
use exetree_common::{ExetreeError, Result};
use std::fs;
use std::path::Path;

/// Load a checkpoint written by [`super::save_model`].
///
/// The format is detected from the file extension (JSON by default).
pub fn load_model(path: impl AsRef<Path>) -> Result<(ConvClassifier, LocationIndex)> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ExetreeError::ModelNotFound { path: path.to_path_buf() });
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ExetreeError::io(format!("reading checkpoint {}", path.display()), e))?;

    let checkpoint: Checkpoint = match ModelFormat::from_path(path) {
        ModelFormat::Json => serde_json::from_str(&content).map_err(|e| {
            ExetreeError::Serialization { message: format!("JSON deserialization failed: {e}") }
        })?,
        ModelFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| {
            ExetreeError::Serialization { message: format!("YAML deserialization failed: {e}") }
        })?,
    };

    checkpoint.restore()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_run;
    use crate::io::{save_model, ModelMetadata, SaveConfig};
    use crate::model::ModelConfig;
    use crate::tree::Observation;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_reproduces_predictions() {
        let dir = TempDir::new().unwrap();
        let locidx = LocationIndex::from_tags(["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(21);
        let model = ConvClassifier::new(ModelConfig::default(), 10, locidx.watermark(), &mut rng);

        let run: Vec<Observation> =
            (0..10).map(|i| Observation::new(["a", "b", "c"][i % 3], i as f64 * 0.5)).collect();
        let features = encode_run(&run, 10, &locidx, true);
        let before = model.predict(&features);

        for name in ["model.json", "model.yml"] {
            let path = dir.path().join(name);
            save_model(&model, &locidx, &path, &SaveConfig::new(ModelMetadata::new("rt"))).unwrap();
            let (loaded, loaded_idx) = load_model(&path).unwrap();

            assert_eq!(loaded_idx, locidx);
            let after = loaded.predict(&encode_run(&run, 10, &loaded_idx, true));
            assert_relative_eq!(before[0], after[0], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_missing_checkpoint() {
        let err = load_model("/no/such/model.json").unwrap_err();
        assert!(matches!(err, ExetreeError::ModelNotFound { .. }));
    }

    #[test]
    fn test_garbage_checkpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_model(&path), Err(ExetreeError::Serialization { .. })));
    }
}
