// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Appends one CSV row per training epoch, so learning curves can
// be plotted after the run.
//
// Columns:
//   epoch           - epoch number, starting at 1
//   loss            - mean categorical cross-entropy on the train split
//   accuracy        - fraction of train rows classified correctly
//   val_loss        - the same loss on the held-out split
//   val_accuracy    - the same accuracy on the held-out split
//   secs_per_epoch  - mean wall-clock time per epoch so far
//
// Example:
//   epoch,loss,accuracy,val_loss,val_accuracy,secs_per_epoch
//   1,1.098100,0.333333,1.097400,0.333333,0.004210
//   2,1.071300,0.547619,1.065000,0.583333,0.004010
//
// The header is written only when the file is new, so repeated
// runs append to the same log.
//
// MetricsLogger is an EpochObserver, so it plugs straight into
// run_training next to any other progress surface.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::traits::EpochObserver;
use crate::domain::training::TrainingLogEntry;

const CSV_HEADER: &str = "epoch,loss,accuracy,val_loss,val_accuracy,secs_per_epoch";

/// Logs epoch metrics to `<dir>/metrics.csv`.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory if needed and write the header if the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &TrainingLogEntry) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.loss,
            m.accuracy,
            m.val_loss,
            m.val_accuracy,
            m.secs_per_epoch,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl EpochObserver for MetricsLogger {
    fn on_epoch_end(&mut self, _epoch: usize, entry: &TrainingLogEntry) -> Result<()> {
        self.log(entry)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(epoch: usize) -> TrainingLogEntry {
        TrainingLogEntry {
            epoch,
            loss:           1.0 / epoch as f64,
            accuracy:       0.5,
            val_loss:       1.2 / epoch as f64,
            val_accuracy:   0.4,
            secs_per_epoch: 0.01,
        }
    }

    #[test]
    fn test_header_then_one_row_per_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = MetricsLogger::new(dir.path()).unwrap();
        logger.on_epoch_end(1, &entry(1)).unwrap();
        logger.on_epoch_end(2, &entry(2)).unwrap();

        let text  = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].starts_with("1,1.000000,0.500000,"));
        assert!(lines[2].starts_with("2,0.500000,"));
    }

    #[test]
    fn test_second_logger_appends_without_new_header() {
        let dir = tempfile::tempdir().unwrap();
        MetricsLogger::new(dir.path()).unwrap().log(&entry(1)).unwrap();
        MetricsLogger::new(dir.path()).unwrap().log(&entry(1)).unwrap();

        let text = fs::read_to_string(dir.path().join("metrics.csv")).unwrap();
        assert_eq!(text.lines().filter(|l| *l == CSV_HEADER).count(), 1);
        assert_eq!(text.lines().count(), 3);
    }
}
