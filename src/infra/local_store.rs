// ============================================================
// Layer 6 - Local Model Store
// ============================================================
// Keeps at most one model on this machine, under a fixed key:
//
//   <storage_dir>/
//     iris-lab/classifier/
//       model.json
//       group1-shard1of1.bin
//
// save   - overwrites whatever is stored. The new artifact is staged
//          in classifier.partial and renamed into place, so a failed
//          write leaves the previous model untouched
// load   - NotFound when nothing is stored
// remove - no-op when nothing is stored
// info   - existence, size and save time; never fails

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::{LabResult, StorageError};
use crate::infra::artifact::{self, MANIFEST_FILE};
use crate::ml::model::TrainedModel;

/// Key under which the single local model is stored
pub const LOCAL_MODEL_KEY: &str = "iris-lab/classifier";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalArtifactInfo {
    pub exists:     bool,
    pub size_bytes: Option<u64>,
    pub saved_at:   Option<DateTime<Utc>>,
}

impl LocalArtifactInfo {
    fn absent() -> Self {
        Self { exists: false, size_bytes: None, saved_at: None }
    }
}

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the stored artifact
    pub fn key_dir(&self) -> PathBuf {
        self.root.join(LOCAL_MODEL_KEY)
    }

    /// Persist `model`, replacing any previously stored one.
    pub fn save(&self, model: &TrainedModel) -> LabResult<LocalArtifactInfo> {
        let encoded  = artifact::encode(model)?;
        let dir      = self.key_dir();
        let staging  = dir.with_extension("partial");
        let previous = dir.with_extension("previous");

        remove_dir_if_present(&staging)?;
        if let Err(e) = artifact::write_dir(&staging, &encoded) {
            let _ = remove_dir_if_present(&staging);
            return Err(e);
        }

        remove_dir_if_present(&previous)?;
        if dir.exists() {
            fs::rename(&dir, &previous)?;
        }
        if let Err(e) = fs::rename(&staging, &dir) {
            let _ = fs::rename(&previous, &dir);
            return Err(e.into());
        }
        if let Err(e) = remove_dir_if_present(&previous) {
            tracing::warn!("Cannot clean up '{}': {}", previous.display(), e);
        }

        tracing::info!("Saved model to '{}'", dir.display());
        Ok(self.info())
    }

    pub fn load(&self) -> LabResult<TrainedModel> {
        let dir   = self.key_dir();
        let model = artifact::read_dir(&dir, LOCAL_MODEL_KEY)?;
        tracing::info!("Loaded model from '{}'", dir.display());
        Ok(model)
    }

    pub fn remove(&self) -> LabResult<()> {
        match fs::remove_dir_all(self.key_dir()) {
            Ok(()) => {
                tracing::info!("Removed local model '{}'", LOCAL_MODEL_KEY);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e).into()),
        }
    }

    pub fn info(&self) -> LocalArtifactInfo {
        let dir           = self.key_dir();
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return LocalArtifactInfo::absent();
        }

        let size_bytes = fs::read_dir(&dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter_map(|e| e.metadata().ok())
                    .filter(|m| m.is_file())
                    .map(|m| m.len())
                    .sum()
            })
            .ok();

        // an unreadable manifest still counts as present, just without details
        let saved_at = fs::read(&manifest_path)
            .ok()
            .and_then(|json| artifact::parse_manifest(&json).ok())
            .map(|m| m.saved_at);

        LocalArtifactInfo { exists: true, size_bytes, saved_at }
    }
}

fn remove_dir_if_present(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
