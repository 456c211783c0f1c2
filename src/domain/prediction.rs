// ============================================================
// Layer 3 - Prediction Domain Types
// ============================================================
// Results produced by the predictor. These are plain vectors
// copied out of the tensor engine, so they can be printed,
// serialised or compared without touching Burn.

use serde::{Deserialize, Serialize};

/// The outcome of running one feature vector through the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Softmax probability per class, in class-id order
    pub scores: Vec<f32>,

    /// Index of the highest score
    pub class_index: usize,

    /// Class name for class_index
    pub label: String,
}

impl Prediction {
    /// Probability assigned to the winning class
    pub fn confidence(&self) -> f32 {
        self.scores.get(self.class_index).copied().unwrap_or(0.0)
    }
}

/// One row of the test-set results table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedExample {
    pub features:        Vec<f32>,
    pub true_label:      String,
    pub predicted_label: String,
    pub scores:          Vec<f32>,
}

impl EvaluatedExample {
    pub fn is_correct(&self) -> bool {
        self.true_label == self.predicted_label
    }
}

/// Per-example results plus aggregates for a labelled partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub examples: Vec<EvaluatedExample>,

    /// Fraction of examples predicted correctly, in [0, 1]
    pub accuracy: f64,

    /// confusion[true_class][predicted_class] = count
    pub confusion: Vec<Vec<usize>>,
}

impl EvaluationReport {
    /// Build the report from rows and the (true, predicted) class pairs.
    pub fn new(
        examples:    Vec<EvaluatedExample>,
        pairs:       &[(usize, usize)],
        num_classes: usize,
    ) -> Self {
        let mut confusion = vec![vec![0usize; num_classes]; num_classes];
        for &(truth, pred) in pairs {
            if truth < num_classes && pred < num_classes {
                confusion[truth][pred] += 1;
            }
        }
        let correct = pairs.iter().filter(|(t, p)| t == p).count();
        let accuracy = if pairs.is_empty() {
            0.0
        } else {
            correct as f64 / pairs.len() as f64
        };
        Self { examples, accuracy, confusion }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix_and_accuracy() {
        let pairs = [(0, 0), (1, 1), (1, 2), (2, 2)];
        let report = EvaluationReport::new(Vec::new(), &pairs, 3);
        assert_eq!(report.confusion[1][2], 1);
        assert_eq!(report.confusion[2][2], 1);
        assert!((report.accuracy - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report_has_zero_accuracy() {
        let report = EvaluationReport::new(Vec::new(), &[], 3);
        assert_eq!(report.accuracy, 0.0);
    }

    #[test]
    fn test_confidence_reads_winning_score() {
        let p = Prediction {
            scores: vec![0.1, 0.7, 0.2],
            class_index: 1,
            label: "Iris-versicolor".into(),
        };
        assert!((p.confidence() - 0.7).abs() < f32::EPSILON);
    }
}
