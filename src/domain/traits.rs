// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The trainer reports progress through EpochObserver instead
// of calling into the console or a plotting surface directly.
//
// Implementations:
//   - closures  (FnMut(usize, &TrainingLogEntry) -> Result<()>)
//   - MetricsLogger → appends each entry to a CSV file
//   - Progress fan-out in the CLI (console + CSV)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::training::TrainingLogEntry;

// ─── EpochObserver ────────────────────────────────────────────────────────────
/// Receives every training log entry as soon as its epoch finishes.
///
/// An `Err` is reported by the trainer and otherwise ignored: a broken
/// progress sink never aborts a training run.
pub trait EpochObserver {
    fn on_epoch_end(&mut self, epoch: usize, entry: &TrainingLogEntry) -> Result<()>;
}

impl<F> EpochObserver for F
where
    F: FnMut(usize, &TrainingLogEntry) -> Result<()>,
{
    fn on_epoch_end(&mut self, epoch: usize, entry: &TrainingLogEntry) -> Result<()> {
        self(epoch, entry)
    }
}

/// Observer that does nothing; used when the caller wants no progress.
pub struct NoProgress;

impl EpochObserver for NoProgress {
    fn on_epoch_end(&mut self, _epoch: usize, _entry: &TrainingLogEntry) -> Result<()> {
        Ok(())
    }
}

/// Forwards every entry to several observers in order.
pub struct FanOut<'a> {
    observers: Vec<&'a mut dyn EpochObserver>,
}

impl<'a> FanOut<'a> {
    pub fn new(observers: Vec<&'a mut dyn EpochObserver>) -> Self {
        Self { observers }
    }
}

impl EpochObserver for FanOut<'_> {
    fn on_epoch_end(&mut self, epoch: usize, entry: &TrainingLogEntry) -> Result<()> {
        let mut first_err = None;
        for obs in self.observers.iter_mut() {
            if let Err(e) = obs.on_epoch_end(epoch, entry) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> TrainingLogEntry {
        TrainingLogEntry {
            epoch: 1,
            loss: 1.0,
            accuracy: 0.3,
            val_loss: 1.1,
            val_accuracy: 0.3,
            secs_per_epoch: 0.1,
        }
    }

    #[test]
    fn test_closure_is_an_observer() {
        let mut seen = Vec::new();
        let mut obs = |epoch: usize, _e: &TrainingLogEntry| -> Result<()> {
            seen.push(epoch);
            Ok(())
        };
        obs.on_epoch_end(7, &entry()).unwrap();
        assert_eq!(seen, vec![7]);
    }

    #[test]
    fn test_fan_out_reaches_all_observers_even_after_error() {
        let mut failing = |_: usize, _: &TrainingLogEntry| -> Result<()> {
            anyhow::bail!("sink closed")
        };
        let mut count = 0usize;
        let mut counting = |_: usize, _: &TrainingLogEntry| -> Result<()> {
            count += 1;
            Ok(())
        };
        let result = FanOut::new(vec![&mut failing, &mut counting]).on_epoch_end(1, &entry());
        assert!(result.is_err());
        assert_eq!(count, 1);
    }
}
