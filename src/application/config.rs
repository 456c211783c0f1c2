// ============================================================
// Layer 2 - Lab Configuration
// ============================================================
// All settings for a session: training hyperparameters, the
// dataset split, where models are stored locally, where the
// hosted model lives, and the classifier topology.
//
// Serialisable, so a JSON file can provide the base values
// (`--config lab.json`) and CLI flags override single fields.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ml::model::ClassifierConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub epochs:            usize,
    pub batch_size:        usize,
    pub learning_rate:     f64,
    /// Fraction of each class held out for validation/evaluation
    pub test_split:        f64,
    pub seed:              u64,
    /// Root directory of the local model store
    pub storage_dir:       PathBuf,
    /// URL of the hosted model manifest (model.json), if one is published
    pub remote_url:        Option<String>,
    pub http_timeout_secs: u64,
    /// When set, per-epoch metrics are appended to <dir>/metrics.csv
    pub metrics_dir:       Option<PathBuf>,
    pub model:             ClassifierConfig,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            epochs:            50,
            batch_size:        32,
            learning_rate:     1e-3,
            test_split:        0.15,
            seed:              42,
            storage_dir:       PathBuf::from(".iris-lab"),
            remote_url:        None,
            http_timeout_secs: 10,
            metrics_dir:       None,
            model:             ClassifierConfig::iris(),
        }
    }
}

impl LabConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let cfg: LabConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            anyhow::bail!("epochs must be at least 1");
        }
        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be at least 1");
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            anyhow::bail!("learning_rate must be positive, got {}", self.learning_rate);
        }
        if !(self.test_split > 0.0 && self.test_split < 1.0) {
            anyhow::bail!("test_split must be in (0, 1), got {}", self.test_split);
        }
        self.model.validate()?;
        Ok(())
    }
}
