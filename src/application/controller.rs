// ============================================================
// Layer 2 - Controller
// ============================================================
// One Request per user trigger, one Response back. The CLI and
// the interactive shell both go through here.
//
//   Train        → train from scratch, then evaluate on the test split
//   LoadRemote   → load the hosted model, then evaluate
//   LoadLocal    → load the saved model, then evaluate
//   SaveLocal    → persist the current model
//   RemoveLocal  → delete the saved model
//   Predict      → classify one manually entered measurement vector
//   Evaluate     → results table for the test split
//   Status       → model slot, local artifact, remote availability
//   Export       → write the current model in the hosted layout
//
// Per-epoch progress reaches the console through the trainer's
// tracing output and, when configured, the metrics CSV.
//
// handle() never returns an error: a failed operation becomes
// Response::Failed with a status message, and the model slot is
// left as it was.

use std::fmt;
use std::path::PathBuf;

use crate::application::session::Session;
use crate::domain::error::LabError;
use crate::domain::prediction::{EvaluationReport, Prediction};
use crate::domain::traits::NoProgress;
use crate::domain::training::TrainingLogEntry;
use crate::domain::IRIS_CLASSES;
use crate::infra::local_store::LocalArtifactInfo;

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Train,
    LoadRemote,
    LoadLocal,
    SaveLocal,
    RemoveLocal,
    Predict(Vec<f32>),
    Evaluate,
    Status,
    Export(PathBuf),
}

#[derive(Debug, Clone)]
pub enum Response {
    Trained { last: Option<TrainingLogEntry>, report: EvaluationReport },
    Loaded { source: &'static str, report: EvaluationReport },
    Saved(LocalArtifactInfo),
    Removed,
    Predicted(Prediction),
    Evaluated(EvaluationReport),
    Status(StatusReport),
    Exported { dir: PathBuf, bytes: u64 },
    Failed(String),
}

impl Response {
    pub fn is_failure(&self) -> bool {
        matches!(self, Response::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub model_loaded:     bool,
    pub last_training:    Option<TrainingLogEntry>,
    pub local:            LocalArtifactInfo,
    pub remote_url:       Option<String>,
    pub remote_available: bool,
}

pub struct Controller {
    session: Session,
}

impl Controller {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn handle(&mut self, request: Request) -> Response {
        tracing::debug!("Handling {:?}", request);
        match self.dispatch(request) {
            Ok(response) => response,
            Err(e) => {
                let fatal = e.chain().any(|cause| {
                    cause.downcast_ref::<LabError>().is_some_and(LabError::is_fatal)
                });
                if fatal {
                    tracing::error!("Request failed: {:#}", e);
                } else {
                    tracing::warn!("Request failed: {:#}", e);
                }
                Response::Failed(failure_message(&e))
            }
        }
    }

    fn dispatch(&mut self, request: Request) -> anyhow::Result<Response> {
        let response = match request {
            Request::Train => {
                let last = self
                    .session
                    .train_from_scratch(&mut NoProgress)?
                    .last()
                    .cloned();
                Response::Trained { last, report: self.session.evaluate_test()? }
            }
            Request::LoadRemote => {
                self.session.load_remote()?;
                Response::Loaded { source: "remote", report: self.session.evaluate_test()? }
            }
            Request::LoadLocal => {
                self.session.load_local()?;
                Response::Loaded { source: "local", report: self.session.evaluate_test()? }
            }
            Request::SaveLocal   => Response::Saved(self.session.save_local()?),
            Request::RemoveLocal => {
                self.session.remove_local()?;
                Response::Removed
            }
            Request::Predict(features) => Response::Predicted(self.session.predict(&features)?),
            Request::Evaluate => Response::Evaluated(self.session.evaluate_test()?),
            Request::Status => Response::Status(StatusReport {
                model_loaded:     self.session.model().is_some(),
                last_training:    self.session.last_log().and_then(|log| log.last()).cloned(),
                local:            self.session.local_status(),
                remote_url:       self.session.config().remote_url.clone(),
                remote_available: self.session.remote_available(),
            }),
            Request::Export(dir) => {
                let bytes = self.session.export(&dir)?;
                Response::Exported { dir, bytes }
            }
        };
        Ok(response)
    }
}

/// Status line for a failed request.
fn failure_message(err: &anyhow::Error) -> String {
    let not_ready = err
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<LabError>(), Some(LabError::ModelNotReady)));
    if not_ready {
        "No model loaded: train or load a model first.".to_string()
    } else {
        format!("Error: {err:#}")
    }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Trained { last, report } => {
                if let Some(e) = last {
                    writeln!(
                        f,
                        "Training complete after {} epochs: loss={:.4} acc={:.1}% val_loss={:.4} val_acc={:.1}% (~{:.4} s/epoch)",
                        e.epoch, e.loss, e.accuracy * 100.0,
                        e.val_loss, e.val_accuracy * 100.0, e.secs_per_epoch,
                    )?;
                }
                write!(f, "{report}")
            }
            Response::Loaded { source, report } => {
                writeln!(f, "Loaded {source} model.")?;
                write!(f, "{report}")
            }
            Response::Saved(info) => write!(f, "Model saved locally. {}", DisplayInfo(info)),
            Response::Removed => write!(f, "Local model removed."),
            Response::Predicted(p) => write!(
                f,
                "Prediction: {} ({:.1}%)  scores: {}",
                p.label,
                p.confidence() * 100.0,
                format_scores(&p.scores)
            ),
            Response::Evaluated(report) => write!(f, "{report}"),
            Response::Status(s) => {
                writeln!(f, "Model loaded:  {}", if s.model_loaded { "yes" } else { "no" })?;
                if let Some(e) = &s.last_training {
                    writeln!(
                        f,
                        "Last training: {} epochs, val_loss={:.4} val_acc={:.1}%",
                        e.epoch, e.val_loss, e.val_accuracy * 100.0
                    )?;
                }
                writeln!(f, "Local model:   {}", DisplayInfo(&s.local))?;
                match &s.remote_url {
                    Some(url) => write!(
                        f,
                        "Remote model:  {} ({})",
                        url,
                        if s.remote_available { "available" } else { "unavailable" }
                    ),
                    None => write!(f, "Remote model:  not configured"),
                }
            }
            Response::Exported { dir, bytes } => {
                write!(f, "Exported model to '{}' ({} bytes).", dir.display(), bytes)
            }
            Response::Failed(message) => write!(f, "{message}"),
        }
    }
}

struct DisplayInfo<'a>(&'a LocalArtifactInfo);

impl fmt::Display for DisplayInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.0;
        if !info.exists {
            return write!(f, "none saved");
        }
        write!(f, "saved")?;
        if let Some(size) = info.size_bytes {
            write!(f, ", {size} bytes")?;
        }
        if let Some(at) = info.saved_at {
            write!(f, ", at {}", at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        Ok(())
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<24} {:<16} {:<16} {}",
            "features", "true", "predicted", "scores"
        )?;
        for ex in &self.examples {
            let features = ex
                .features
                .iter()
                .map(|v| format!("{v:.1}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                f,
                "{:<24} {:<16} {:<16} {}{}",
                features,
                ex.true_label,
                ex.predicted_label,
                format_scores(&ex.scores),
                if ex.is_correct() { "" } else { "  ✗" }
            )?;
        }

        writeln!(f, "\nConfusion matrix (rows = true, columns = predicted):")?;
        for (i, row) in self.confusion.iter().enumerate() {
            let name   = IRIS_CLASSES.get(i).copied().unwrap_or("?");
            let counts = row.iter().map(|c| format!("{c:>4}")).collect::<String>();
            writeln!(f, "  {name:<16}{counts}")?;
        }
        write!(f, "Test accuracy: {:.1}% ({} examples)", self.accuracy * 100.0, self.examples.len())
    }
}

fn format_scores(scores: &[f32]) -> String {
    let parts: Vec<String> = scores.iter().map(|s| format!("{s:.3}")).collect();
    format!("[{}]", parts.join(", "))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::LabConfig;
    use crate::ml::model::ClassifierConfig;

    fn controller(storage: &std::path::Path) -> Controller {
        let cfg = LabConfig {
            epochs:        2,
            learning_rate: 1e-2,
            storage_dir:   storage.to_path_buf(),
            model:         ClassifierConfig::new(16, 8, 4, vec![8], 3),
            ..LabConfig::default()
        };
        Controller::new(Session::new(cfg).unwrap())
    }

    #[test]
    fn test_predict_before_training_asks_for_a_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(dir.path());
        match c.handle(Request::Predict(vec![5.1, 3.5, 1.4, 0.2])) {
            Response::Failed(msg) => assert!(msg.contains("train or load a model first")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_failures_are_messages_not_panics() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(dir.path());
        assert!(c.handle(Request::LoadLocal).is_failure());
        assert!(c.handle(Request::LoadRemote).is_failure());
        assert!(c.handle(Request::SaveLocal).is_failure());
        assert!(!c.handle(Request::RemoveLocal).is_failure());
        assert!(c.session.model().is_none());
    }

    #[test]
    fn test_train_then_predict_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(dir.path());

        match c.handle(Request::Train) {
            Response::Trained { last, report } => {
                assert_eq!(last.map(|e| e.epoch), Some(2));
                assert_eq!(report.examples.len(), 24);
            }
            other => panic!("expected Trained, got {other:?}"),
        }

        let predicted = c.handle(Request::Predict(vec![6.4, 3.2, 4.5, 1.5]));
        assert!(matches!(predicted, Response::Predicted(_)));
        assert!(predicted.to_string().starts_with("Prediction: Iris-"));

        assert!(matches!(c.handle(Request::SaveLocal), Response::Saved(info) if info.exists));
        match c.handle(Request::Status) {
            Response::Status(s) => {
                assert!(s.model_loaded);
                assert_eq!(s.last_training.map(|e| e.epoch), Some(2));
                assert!(s.local.exists);
                assert!(!s.remote_available);
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_width_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(dir.path());
        c.handle(Request::Train);
        match c.handle(Request::Predict(vec![1.0, 2.0])) {
            Response::Failed(msg) => assert!(msg.contains("4"), "{msg}"),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
