// ============================================================
// Layer 3 - Training Log
// ============================================================
// One entry per epoch, appended in order by the trainer and
// consumed by progress observers (console, CSV sink).
//
// How to read the metrics:
//   - loss should fall epoch over epoch
//   - val_loss rising while loss keeps falling means overfitting
//   - accuracy values are fractions in [0, 1]

use serde::{Deserialize, Serialize};

/// Metrics recorded at the end of one training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLogEntry {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean categorical cross-entropy over the training batches
    pub loss: f64,

    /// Fraction of training examples classified correctly
    pub accuracy: f64,

    /// Mean categorical cross-entropy on the held-out partition
    pub val_loss: f64,

    /// Fraction of held-out examples classified correctly
    pub val_accuracy: f64,

    /// Average wall-clock seconds per epoch since training began
    pub secs_per_epoch: f64,
}

impl TrainingLogEntry {
    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Append-only sequence of epoch entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingLog {
    entries: Vec<TrainingLogEntry>,
}

impl TrainingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TrainingLogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TrainingLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TrainingLogEntry> {
        self.entries.last()
    }

    /// Lowest validation loss seen so far, if any epoch has finished
    pub fn best_val_loss(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|e| e.val_loss)
            .fold(None, |best, v| match best {
                Some(b) if b <= v => Some(b),
                _ => Some(v),
            })
    }
}
