// ============================================================
// Layer 2 - Session
// ============================================================
// Owns everything a user interacts with during one run:
//
//   config    - LabConfig (hyperparameters, storage, remote URL)
//   split     - the Iris train/test split, fixed at construction
//   local     - LocalStore under config.storage_dir
//   remote    - RemoteStore with the configured HTTP timeout
//   model     - the single current-model slot
//   last_log  - the log of the most recent training run
//
// The slot is replaced wholesale by train/load and never changed
// by a failed operation: the new model is only assigned after the
// fallible work has succeeded.
//
// Slot-mutating operations take &mut self, so a second training
// run cannot start while one is in progress.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::config::LabConfig;
use crate::data::iris::{load_iris, IrisSplit};
use crate::domain::error::LabError;
use crate::domain::prediction::{EvaluationReport, Prediction};
use crate::domain::traits::{EpochObserver, FanOut};
use crate::domain::training::TrainingLog;
use crate::infra::{
    artifact,
    local_store::{LocalArtifactInfo, LocalStore},
    metrics::MetricsLogger,
    remote_store::RemoteStore,
};
use crate::ml::{model::TrainedModel, predictor, trainer::run_training};

pub struct Session {
    config:   LabConfig,
    split:    IrisSplit,
    local:    LocalStore,
    remote:   RemoteStore,
    model:    Option<TrainedModel>,
    last_log: Option<TrainingLog>,
}

impl Session {
    pub fn new(config: LabConfig) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let split = load_iris(config.test_split, config.seed)
            .context("Cannot prepare the Iris dataset")?;
        tracing::info!(
            "Dataset ready: {} train / {} test rows (test_split={})",
            split.train().len(),
            split.test().len(),
            split.test_split()
        );

        let local  = LocalStore::new(&config.storage_dir);
        let remote = RemoteStore::new(Duration::from_secs(config.http_timeout_secs))?;

        Ok(Self { config, split, local, remote, model: None, last_log: None })
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    pub fn last_log(&self) -> Option<&TrainingLog> {
        self.last_log.as_ref()
    }

    // ─── Model slot ───────────────────────────────────────────────────────────

    /// Build a fresh model and train it on the train split.
    /// `observer` sees every epoch; the metrics CSV is appended too
    /// when `metrics_dir` is configured.
    pub fn train_from_scratch(&mut self, observer: &mut dyn EpochObserver) -> Result<&TrainingLog> {
        let mut metrics = match &self.config.metrics_dir {
            Some(dir) => {
                let logger = MetricsLogger::new(dir).context("Cannot open metrics log")?;
                tracing::info!("Appending epoch metrics to '{}'", logger.csv_path().display());
                Some(logger)
            }
            None      => None,
        };

        let mut observers: Vec<&mut dyn EpochObserver> = vec![observer];
        if let Some(m) = metrics.as_mut() {
            observers.push(m);
        }
        let mut fan_out = FanOut::new(observers);

        let (model, log) = run_training(&self.config, &self.split, &mut fan_out)
            .context("Training failed")?;

        self.model = Some(model);
        Ok(&*self.last_log.insert(log))
    }

    /// Replace the current model with the hosted one.
    pub fn load_remote(&mut self) -> Result<()> {
        let url = self
            .config
            .remote_url
            .as_deref()
            .ok_or_else(|| LabError::Configuration("no remote model URL is configured".into()))?;

        let model = self
            .remote
            .load(url)
            .with_context(|| format!("Cannot load the hosted model from '{url}'"))?;
        tracing::info!("Hosted model ready ({} parameters)", model.num_params());
        self.model = Some(model);
        Ok(())
    }

    /// Replace the current model with the locally saved one.
    pub fn load_local(&mut self) -> Result<()> {
        let model = self.local.load().context("Cannot load the local model")?;
        tracing::info!("Local model ready ({} parameters)", model.num_params());
        self.model = Some(model);
        Ok(())
    }

    // ─── Local storage ────────────────────────────────────────────────────────

    pub fn save_local(&self) -> Result<LocalArtifactInfo> {
        let model = self.model.as_ref().ok_or(LabError::ModelNotReady)?;
        let info  = self.local.save(model).context("Cannot save the model locally")?;
        Ok(info)
    }

    pub fn remove_local(&self) -> Result<()> {
        self.local.remove().context("Cannot remove the local model")?;
        Ok(())
    }

    pub fn local_status(&self) -> LocalArtifactInfo {
        self.local.info()
    }

    /// False when no remote URL is configured or the host does not answer.
    pub fn remote_available(&self) -> bool {
        self.config
            .remote_url
            .as_deref()
            .is_some_and(|url| self.remote.exists(url))
    }

    /// Write the current model in the hosted layout into `dir`.
    pub fn export(&self, dir: &Path) -> Result<u64> {
        let model   = self.model.as_ref().ok_or(LabError::ModelNotReady)?;
        let encoded = artifact::encode(model)?;
        let bytes   = artifact::write_dir(dir, &encoded)
            .with_context(|| format!("Cannot export the model to '{}'", dir.display()))?;
        tracing::info!("Exported model to '{}' ({} bytes)", dir.display(), bytes);
        Ok(bytes)
    }

    // ─── Inference ────────────────────────────────────────────────────────────

    pub fn predict(&self, features: &[f32]) -> Result<Prediction> {
        Ok(predictor::predict(self.model.as_ref(), features)?)
    }

    /// Score the current model on the held-out test split.
    pub fn evaluate_test(&self) -> Result<EvaluationReport> {
        Ok(predictor::evaluate(self.model.as_ref(), self.split.test())?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::NoProgress;
    use crate::domain::training::TrainingLogEntry;
    use crate::ml::model::ClassifierConfig;

    fn test_config(storage: &Path) -> LabConfig {
        LabConfig {
            epochs:        3,
            learning_rate: 1e-2,
            storage_dir:   storage.to_path_buf(),
            model:         ClassifierConfig::new(16, 8, 4, vec![8], 3),
            ..LabConfig::default()
        }
    }

    fn is_not_ready(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<LabError>(), Some(LabError::ModelNotReady))
    }

    #[test]
    fn test_new_session_has_no_model() {
        let dir     = tempfile::tempdir().unwrap();
        let session = Session::new(test_config(dir.path())).unwrap();
        assert!(session.model().is_none());
        assert_eq!(session.split.test().len(), 24);
        assert!(is_not_ready(&session.predict(&[5.1, 3.5, 1.4, 0.2]).unwrap_err()));
        assert!(is_not_ready(&session.evaluate_test().unwrap_err()));
        assert!(is_not_ready(&session.save_local().unwrap_err()));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LabConfig { test_split: 0.0, ..test_config(dir.path()) };
        assert!(Session::new(cfg).is_err());
    }

    #[test]
    fn test_train_fills_slot_and_log() {
        let dir         = tempfile::tempdir().unwrap();
        let mut session = Session::new(test_config(dir.path())).unwrap();

        let mut seen = 0;
        let mut observer = |_: usize, _: &TrainingLogEntry| -> anyhow::Result<()> {
            seen += 1;
            Ok(())
        };
        let epochs = session.train_from_scratch(&mut observer).unwrap().len();
        assert_eq!(epochs, 3);
        assert_eq!(seen, 3);
        assert!(session.model().is_some());

        let report = session.evaluate_test().unwrap();
        assert_eq!(report.examples.len(), 24);
    }

    #[test]
    fn test_metrics_dir_receives_csv() {
        let dir     = tempfile::tempdir().unwrap();
        let metrics = dir.path().join("metrics");
        let cfg     = LabConfig { metrics_dir: Some(metrics.clone()), ..test_config(dir.path()) };

        let mut session = Session::new(cfg).unwrap();
        session.train_from_scratch(&mut NoProgress).unwrap();

        let csv = std::fs::read_to_string(metrics.join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn test_failed_load_keeps_current_model() {
        let dir         = tempfile::tempdir().unwrap();
        let mut session = Session::new(test_config(dir.path())).unwrap();
        session.train_from_scratch(&mut NoProgress).unwrap();
        let before = session.predict(&[6.0, 2.2, 5.0, 1.5]).unwrap();

        assert!(session.load_local().is_err());
        assert!(session.load_remote().is_err());

        let after = session.predict(&[6.0, 2.2, 5.0, 1.5]).unwrap();
        assert_eq!(before.scores, after.scores);
    }

    #[test]
    fn test_save_load_remove_cycle() {
        let dir         = tempfile::tempdir().unwrap();
        let mut session = Session::new(test_config(dir.path())).unwrap();
        session.train_from_scratch(&mut NoProgress).unwrap();
        let features = [5.8, 2.7, 5.1, 1.9];
        let trained  = session.predict(&features).unwrap();

        assert!(session.save_local().unwrap().exists);

        let mut fresh = Session::new(test_config(dir.path())).unwrap();
        fresh.load_local().unwrap();
        assert_eq!(fresh.predict(&features).unwrap().scores, trained.scores);

        fresh.remove_local().unwrap();
        assert!(!fresh.local_status().exists);
    }

    #[test]
    fn test_remote_unavailable_without_url() {
        let dir     = tempfile::tempdir().unwrap();
        let session = Session::new(test_config(dir.path())).unwrap();
        assert!(!session.remote_available());
    }

    #[test]
    fn test_export_writes_hosted_layout() {
        let dir         = tempfile::tempdir().unwrap();
        let mut session = Session::new(test_config(dir.path())).unwrap();
        session.train_from_scratch(&mut NoProgress).unwrap();

        let out = dir.path().join("public");
        assert!(session.export(&out).unwrap() > 0);
        assert!(out.join(artifact::MANIFEST_FILE).is_file());
        assert!(out.join("group1-shard1of1.bin").is_file());
    }
}
