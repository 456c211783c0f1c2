// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Subcommands:
//
//   train         train from scratch, optionally save and export
//   predict       classify one measurement vector
//   evaluate      results table for the test split
//   status        model slot, local artifact, remote availability
//   remove-local  delete the saved model
//   shell         interactive loop over stdin
//
// Global flags (--config, --storage-dir, --remote-url) work with
// every subcommand.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};

use crate::application::config::LabConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a new classifier on the Iris training split
    Train(TrainArgs),

    /// Classify one manually entered measurement vector
    Predict(PredictArgs),

    /// Print the results table for the held-out test split
    Evaluate(EvaluateArgs),

    /// Show whether a local or hosted model is available
    Status,

    /// Delete the locally saved model
    RemoveLocal,

    /// Interactive session reading one command per line from stdin
    Shell,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// JSON file with base settings; flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root directory of the local model store
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// URL of the hosted model manifest (…/model.json)
    #[arg(long, global = true)]
    pub remote_url: Option<String>,
}

impl GlobalArgs {
    /// Defaults, then the config file, then these flags.
    pub fn load_config(&self) -> Result<LabConfig> {
        let mut cfg = match &self.config {
            Some(path) => LabConfig::from_file(path)?,
            None       => LabConfig::default(),
        };
        if let Some(dir) = &self.storage_dir {
            cfg.storage_dir = dir.clone();
        }
        if let Some(url) = &self.remote_url {
            cfg.remote_url = Some(url.clone());
        }
        Ok(cfg)
    }
}

#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// Number of full passes through the training split
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Rows per optimiser step
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Adam learning rate
    #[arg(long)]
    pub lr: Option<f64>,

    /// Fraction of each class held out for evaluation, in (0, 1)
    #[arg(long)]
    pub test_split: Option<f64>,

    /// Seed for the split, weight initialisation and shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Append per-epoch metrics to <DIR>/metrics.csv
    #[arg(long)]
    pub metrics_dir: Option<PathBuf>,

    /// Save the trained model to the local store
    #[arg(long)]
    pub save_local: bool,

    /// Also write the model in the hosted layout to this directory
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl TrainArgs {
    /// Overlay the training flags on a base configuration.
    pub fn apply(&self, mut cfg: LabConfig) -> LabConfig {
        if let Some(v) = self.epochs {
            cfg.epochs = v;
        }
        if let Some(v) = self.batch_size {
            cfg.batch_size = v;
        }
        if let Some(v) = self.lr {
            cfg.learning_rate = v;
        }
        if let Some(v) = self.test_split {
            cfg.test_split = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if let Some(dir) = &self.metrics_dir {
            cfg.metrics_dir = Some(dir.clone());
        }
        cfg
    }
}

/// Where a command takes its model from
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModelSource {
    /// The locally saved model
    #[default]
    Local,
    /// The hosted model at --remote-url
    Remote,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Comma-separated measurements: sepal length, sepal width, petal length, petal width
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub features: Vec<f32>,

    #[arg(long, value_enum, default_value_t = ModelSource::Local)]
    pub source: ModelSource,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long, value_enum, default_value_t = ModelSource::Local)]
    pub source: ModelSource,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_flags_override_config() {
        let args = TrainArgs { epochs: Some(7), lr: Some(0.01), ..TrainArgs::default() };
        let cfg  = args.apply(LabConfig::default());
        assert_eq!(cfg.epochs, 7);
        assert_eq!(cfg.learning_rate, 0.01);
        assert_eq!(cfg.batch_size, 32);
    }

    #[test]
    fn test_global_flags_override_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("lab.json");
        std::fs::write(&path, r#"{ "storage_dir": "from-file", "epochs": 9 }"#).unwrap();

        let global = GlobalArgs {
            config:      Some(path),
            storage_dir: Some(PathBuf::from("from-flag")),
            remote_url:  None,
        };
        let cfg = global.load_config().unwrap();
        assert_eq!(cfg.storage_dir, PathBuf::from("from-flag"));
        assert_eq!(cfg.epochs, 9);
        assert!(cfg.remote_url.is_none());
    }
}
