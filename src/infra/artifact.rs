// ============================================================
// Layer 6 - Model Artifact Codec
// ============================================================
// Turns a TrainedModel into a portable artifact and back.
//
// An artifact is a directory (or a URL prefix) holding:
//
//   model.json               ← manifest: format tag, classifier
//                              config, class names, shard list,
//                              total weight bytes, save time
//   group1-shard1of1.bin     ← Burn record bytes, split into
//   ...                        shards of at most 4 MiB
//
// The config travels with the weights so the loader can rebuild
// the exact topology before restoring parameters into it.
//
// Weights are produced by Burn's BinBytesRecorder at full
// precision, so a save/load round trip reproduces predictions
// exactly.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use std::{fs, path::Path};

use burn::{
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{LabError, LabResult, StorageError};
use crate::ml::model::{ClassifierConfig, ClassifierRecord, TrainedModel};
use crate::ml::predictor::class_name;
use crate::ml::{InferBackend, InferDevice};

/// Format tag written into every manifest
pub const ARTIFACT_FORMAT: &str = "iris-lab-classifier/1";

/// File name of the manifest inside an artifact
pub const MANIFEST_FILE: &str = "model.json";

/// Largest weight shard written
pub const MAX_SHARD_BYTES: usize = 4 * 1024 * 1024;

/// In-memory recorder used for both directions
type WeightsRecorder = BinBytesRecorder<FullPrecisionSettings>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format:      String,
    pub config:      ClassifierConfig,
    pub class_names: Vec<String>,
    pub weights:     WeightsManifest,
    pub saved_at:    DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsManifest {
    /// Shard file names, relative to the manifest, in concatenation order
    pub shards:      Vec<String>,
    pub byte_length: u64,
}

/// A serialised model held in memory.
pub struct EncodedArtifact {
    pub manifest: ArtifactManifest,
    pub shards:   Vec<Vec<u8>>,
}

impl EncodedArtifact {
    pub fn manifest_json(&self) -> LabResult<String> {
        serde_json::to_string_pretty(&self.manifest)
            .map_err(|e| LabError::corrupt(format!("cannot serialise manifest: {e}")))
    }
}

/// Serialise model weights and describe them in a manifest.
pub fn encode(model: &TrainedModel) -> LabResult<EncodedArtifact> {
    let bytes = WeightsRecorder::new()
        .record(model.model.clone().into_record(), ())
        .map_err(|e| LabError::Tensor(format!("cannot serialise weights: {e}")))?;

    let byte_length = bytes.len() as u64;
    let mut shards: Vec<Vec<u8>> = bytes.chunks(MAX_SHARD_BYTES).map(<[u8]>::to_vec).collect();
    if shards.is_empty() {
        shards.push(Vec::new());
    }

    let count = shards.len();
    let names = (1..=count)
        .map(|i| format!("group1-shard{i}of{count}.bin"))
        .collect();

    let manifest = ArtifactManifest {
        format:      ARTIFACT_FORMAT.to_string(),
        config:      model.config.clone(),
        class_names: (0..model.config.num_classes).map(class_name).collect(),
        weights:     WeightsManifest { shards: names, byte_length },
        saved_at:    Utc::now(),
    };

    Ok(EncodedArtifact { manifest, shards })
}

/// Parse and sanity-check a manifest.
pub fn parse_manifest(json: &[u8]) -> LabResult<ArtifactManifest> {
    let manifest: ArtifactManifest = serde_json::from_slice(json)
        .map_err(|e| LabError::corrupt(format!("malformed manifest: {e}")))?;

    if manifest.format != ARTIFACT_FORMAT {
        return Err(LabError::corrupt(format!(
            "unsupported artifact format '{}' (expected '{}')",
            manifest.format, ARTIFACT_FORMAT
        )));
    }
    if manifest.weights.shards.is_empty() {
        return Err(LabError::corrupt("manifest lists no weight shards"));
    }
    for shard in &manifest.weights.shards {
        // shard names are resolved against the manifest location
        if shard.contains("..") || shard.starts_with('/') || shard.contains('\\') {
            return Err(LabError::corrupt(format!("invalid shard name '{shard}'")));
        }
    }
    let limit = (manifest.weights.shards.len() as u64).saturating_mul(MAX_SHARD_BYTES as u64);
    if manifest.weights.byte_length > limit {
        return Err(LabError::corrupt(format!(
            "manifest claims {} weight bytes, more than {} shards can hold",
            manifest.weights.byte_length,
            manifest.weights.shards.len()
        )));
    }
    manifest
        .config
        .validate()
        .map_err(|e| LabError::corrupt(format!("stored configuration is invalid: {e}")))?;
    Ok(manifest)
}

/// Rebuild the model described by `manifest` from its concatenated shards.
pub fn decode(manifest: &ArtifactManifest, weights: Vec<u8>) -> LabResult<TrainedModel> {
    if weights.len() as u64 != manifest.weights.byte_length {
        return Err(LabError::corrupt(format!(
            "expected {} weight bytes, found {}",
            manifest.weights.byte_length,
            weights.len()
        )));
    }

    let device = InferDevice::default();
    let model  = manifest.config.init::<InferBackend>(&device)?;

    let record: ClassifierRecord<InferBackend> = WeightsRecorder::new()
        .load(weights, &device)
        .map_err(|e| LabError::corrupt(format!("cannot decode weights: {e}")))?;

    // the stored tensors must fit the topology the manifest describes
    let expected = parameter_shapes(&model.clone().into_record());
    let found    = parameter_shapes(&record);
    if expected != found {
        return Err(LabError::corrupt(format!(
            "stored weights do not match the manifest configuration \
             (expected shapes {expected:?}, found {found:?})"
        )));
    }

    Ok(TrainedModel::new(manifest.config.clone(), model.load_record(record)))
}

/// Shape of every parameter tensor, embedding first, then each dense
/// stage's weight and bias in forward order.
fn parameter_shapes(record: &ClassifierRecord<InferBackend>) -> Vec<Vec<usize>> {
    let mut shapes = vec![record.embedding.weight.val().dims().to_vec()];
    for dense in record.hidden.iter().chain(std::iter::once(&record.output)) {
        shapes.push(dense.weight.val().dims().to_vec());
        if let Some(bias) = &dense.bias {
            shapes.push(bias.val().dims().to_vec());
        }
    }
    shapes
}

/// Concatenate shards, refusing to grow past the manifest's byte count.
pub fn append_shard(weights: &mut Vec<u8>, shard: &[u8], byte_length: u64) -> LabResult<()> {
    if (weights.len() + shard.len()) as u64 > byte_length {
        return Err(LabError::corrupt(format!(
            "weight shards exceed the {byte_length} bytes listed in the manifest"
        )));
    }
    weights.extend_from_slice(shard);
    Ok(())
}

/// Write an artifact into `dir`. Shards first, manifest last, so a
/// directory with a manifest always holds a complete artifact.
/// Returns the number of bytes written.
pub fn write_dir(dir: &Path, artifact: &EncodedArtifact) -> LabResult<u64> {
    fs::create_dir_all(dir)?;

    let mut written = 0u64;
    for (name, bytes) in artifact.manifest.weights.shards.iter().zip(&artifact.shards) {
        fs::write(dir.join(name), bytes)?;
        written += bytes.len() as u64;
    }

    let json = artifact.manifest_json()?;
    fs::write(dir.join(MANIFEST_FILE), &json)?;
    written += json.len() as u64;

    tracing::debug!("Wrote artifact to '{}' ({} bytes)", dir.display(), written);
    Ok(written)
}

/// Read an artifact from `dir`. A missing manifest is NotFound under `key`.
pub fn read_dir(dir: &Path, key: &str) -> LabResult<TrainedModel> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let json = match fs::read(&manifest_path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound { key: key.to_string() }.into());
        }
        Err(e) => return Err(e.into()),
    };
    let manifest = parse_manifest(&json)?;

    let mut weights = Vec::new();
    for shard in &manifest.weights.shards {
        let bytes = fs::read(dir.join(shard))
            .map_err(|e| LabError::corrupt(format!("cannot read shard '{shard}': {e}")))?;
        append_shard(&mut weights, &bytes, manifest.weights.byte_length)?;
    }

    decode(&manifest, weights)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::predictor::predict;

    fn sample_model() -> TrainedModel {
        let config = ClassifierConfig::new(16, 8, 4, vec![8, 4], 3);
        let model  = config.init::<InferBackend>(&Default::default()).unwrap();
        TrainedModel::new(config, model)
    }

    #[test]
    fn test_manifest_describes_weights() {
        let artifact = encode(&sample_model()).unwrap();
        let total: usize = artifact.shards.iter().map(Vec::len).sum();
        assert_eq!(artifact.manifest.weights.byte_length, total as u64);
        assert_eq!(artifact.manifest.weights.shards, vec!["group1-shard1of1.bin"]);
        assert_eq!(artifact.manifest.class_names.len(), 3);
    }

    #[test]
    fn test_dir_round_trip_predicts_identically() {
        let dir   = tempfile::tempdir().unwrap();
        let model = sample_model();
        write_dir(dir.path(), &encode(&model).unwrap()).unwrap();

        let restored = read_dir(dir.path(), "test").unwrap();
        let input    = [5.9, 3.0, 5.1, 1.8];
        let before   = predict(Some(&model), &input).unwrap();
        let after    = predict(Some(&restored), &input).unwrap();
        assert_eq!(before.scores, after.scores);
    }

    #[test]
    fn test_missing_manifest_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_dir(dir.path(), "k").unwrap_err();
        assert!(matches!(err, LabError::Storage(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_truncated_weights_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        write_dir(dir.path(), &encode(&sample_model()).unwrap()).unwrap();
        fs::write(dir.path().join("group1-shard1of1.bin"), b"short").unwrap();

        let err = read_dir(dir.path(), "k").unwrap_err();
        assert!(matches!(err, LabError::Storage(StorageError::Corrupt(_))));
    }

    fn assert_corrupt(result: LabResult<TrainedModel>) {
        assert!(matches!(result, Err(LabError::Storage(StorageError::Corrupt(_)))));
    }

    #[test]
    fn test_oversized_byte_length_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = encode(&sample_model()).unwrap();
        artifact.manifest.weights.byte_length = u64::MAX;
        write_dir(dir.path(), &artifact).unwrap();

        assert_corrupt(read_dir(dir.path(), "k"));
    }

    #[test]
    fn test_shards_longer_than_byte_length_are_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = encode(&sample_model()).unwrap();
        artifact.manifest.weights.byte_length = 8;
        write_dir(dir.path(), &artifact).unwrap();

        assert_corrupt(read_dir(dir.path(), "k"));
    }

    #[test]
    fn test_config_not_matching_weights_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = encode(&sample_model()).unwrap();
        artifact.manifest.config = ClassifierConfig::new(64, 8, 5, vec![8, 4], 3);
        write_dir(dir.path(), &artifact).unwrap();

        assert_corrupt(read_dir(dir.path(), "k"));
    }

    #[test]
    fn test_missing_hidden_stage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifact = encode(&sample_model()).unwrap();
        artifact.manifest.config = ClassifierConfig::new(16, 8, 4, vec![8], 3);
        write_dir(dir.path(), &artifact).unwrap();

        assert_corrupt(read_dir(dir.path(), "k"));
    }

    #[test]
    fn test_foreign_manifest_is_corrupt() {
        let err = parse_manifest(br#"{"format": "tfjs-layers-model"}"#).unwrap_err();
        assert!(matches!(err, LabError::Storage(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_shard_names_cannot_escape_the_artifact() {
        let mut artifact = encode(&sample_model()).unwrap();
        artifact.manifest.weights.shards = vec!["../../etc/passwd".into()];
        let json = artifact.manifest_json().unwrap();
        assert!(parse_manifest(json.as_bytes()).is_err());
    }
}
