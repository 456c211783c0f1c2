// ============================================================
// Layer 5 - Predictor
// ============================================================
// Forward-only inference with a TrainedModel:
//
//   predict        - one manually entered measurement vector
//   predict_batch  - several vectors at once
//   evaluate       - labelled items → results table + accuracy
//                    + confusion matrix
//
// Every tensor is created and consumed inside score_rows; only
// plain Vec<f32> values leave it, so backend buffers are freed
// on every exit path, early returns included.
//
// A missing model is reported as LabError::ModelNotReady before
// anything else happens.

use burn::prelude::*;

use crate::data::dataset::IrisItem;
use crate::domain::error::{LabError, LabResult};
use crate::domain::prediction::{EvaluatedExample, EvaluationReport, Prediction};
use crate::domain::IRIS_CLASSES;
use crate::ml::model::TrainedModel;
use crate::ml::{InferBackend, InferDevice};

/// Run one feature vector through the model.
pub fn predict(model: Option<&TrainedModel>, features: &[f32]) -> LabResult<Prediction> {
    let model = model.ok_or(LabError::ModelNotReady)?;
    let mut scores = score_rows(model, &[features])?;
    let scores = scores.pop().ok_or_else(|| LabError::Tensor("empty model output".into()))?;
    Ok(to_prediction(scores))
}

/// Run several feature vectors through the model in one forward pass.
pub fn predict_batch(model: Option<&TrainedModel>, rows: &[Vec<f32>]) -> LabResult<Vec<Prediction>> {
    let model = model.ok_or(LabError::ModelNotReady)?;
    let rows: Vec<&[f32]> = rows.iter().map(Vec::as_slice).collect();
    Ok(score_rows(model, &rows)?.into_iter().map(to_prediction).collect())
}

/// Predict every labelled item and compare against its label.
pub fn evaluate(model: Option<&TrainedModel>, items: &[IrisItem]) -> LabResult<EvaluationReport> {
    let model = model.ok_or(LabError::ModelNotReady)?;
    let rows: Vec<&[f32]> = items.iter().map(|i| i.features.as_slice()).collect();
    let all_scores = score_rows(model, &rows)?;

    let mut examples = Vec::with_capacity(items.len());
    let mut pairs    = Vec::with_capacity(items.len());

    for (item, scores) in items.iter().zip(all_scores) {
        let predicted = argmax(&scores);
        pairs.push((item.label, predicted));
        examples.push(EvaluatedExample {
            features:        item.features.clone(),
            true_label:      class_name(item.label),
            predicted_label: class_name(predicted),
            scores,
        });
    }

    let report = EvaluationReport::new(examples, &pairs, model.config.num_classes);
    tracing::debug!("Evaluated {} examples: accuracy {:.4}", items.len(), report.accuracy);
    Ok(report)
}

/// Display name of a class id
pub fn class_name(index: usize) -> String {
    IRIS_CLASSES
        .get(index)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("class-{index}"))
}

fn to_prediction(scores: Vec<f32>) -> Prediction {
    let class_index = argmax(&scores);
    Prediction { label: class_name(class_index), class_index, scores }
}

/// Index of the largest score; the first one wins ties.
fn argmax(scores: &[f32]) -> usize {
    scores
        .iter()
        .enumerate()
        .fold((0usize, f32::NEG_INFINITY), |(best_i, best), (i, &s)| {
            if s > best { (i, s) } else { (best_i, best) }
        })
        .0
}

/// Softmax scores per row. The only place tensors exist during inference.
fn score_rows(model: &TrainedModel, rows: &[&[f32]]) -> LabResult<Vec<Vec<f32>>> {
    let width   = model.config.seq_len;
    let encoder = model.config.encoder();

    for row in rows {
        encoder.check(row, width)?;
    }
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().flat_map(|row| encoder.encode(row)).collect();
    let device = InferDevice::default();
    let inputs = Tensor::<InferBackend, 2, Int>::from_data(
        TensorData::new(ids, [rows.len(), width]),
        &device,
    );

    let probs = model.model.forward(inputs);
    let flat: Vec<f32> = probs
        .into_data()
        .to_vec()
        .map_err(|e| LabError::Tensor(format!("{e:?}")))?;

    Ok(flat
        .chunks(model.config.num_classes)
        .map(|row| row.to_vec())
        .collect())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::iris::load_iris;
    use crate::ml::model::ClassifierConfig;

    fn untrained() -> TrainedModel {
        let config = ClassifierConfig::new(16, 8, 4, vec![8], 3);
        let model  = config.init::<InferBackend>(&Default::default()).unwrap();
        TrainedModel::new(config, model)
    }

    #[test]
    fn test_predict_without_model_is_not_ready() {
        let err = predict(None, &[5.1, 3.5, 1.4, 0.2]).unwrap_err();
        assert!(matches!(err, LabError::ModelNotReady));
        assert!(matches!(predict_batch(None, &[]), Err(LabError::ModelNotReady)));
        assert!(matches!(evaluate(None, &[]), Err(LabError::ModelNotReady)));
    }

    #[test]
    fn test_manual_input_gives_one_known_label() {
        let model = untrained();
        let p = predict(Some(&model), &[6.3, 3.3, 6.0, 2.5]).unwrap();
        assert_eq!(p.scores.len(), IRIS_CLASSES.len());
        assert!(IRIS_CLASSES.contains(&p.label.as_str()));
        assert_eq!(p.label, IRIS_CLASSES[p.class_index]);
        let sum: f32 = p.scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let model = untrained();
        let err = predict(Some(&model), &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, LabError::InputWidth { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_batch_matches_single_predictions() {
        let model = untrained();
        let rows = vec![vec![5.1, 3.5, 1.4, 0.2], vec![7.0, 3.2, 4.7, 1.4]];
        let batch = predict_batch(Some(&model), &rows).unwrap();
        assert_eq!(batch.len(), 2);
        for (row, p) in rows.iter().zip(&batch) {
            let single = predict(Some(&model), row).unwrap();
            assert_eq!(single.class_index, p.class_index);
            for (a, b) in single.scores.iter().zip(&p.scores) {
                assert!((a - b).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_evaluate_reports_every_test_row() {
        let model = untrained();
        let split = load_iris(0.15, 42).unwrap();
        let report = evaluate(Some(&model), split.test()).unwrap();
        assert_eq!(report.examples.len(), split.test().len());
        assert!((0.0..=1.0).contains(&report.accuracy));
        let counted: usize = report.confusion.iter().flatten().sum();
        assert_eq!(counted, split.test().len());
    }

    #[test]
    fn test_argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[0.9, 0.05, 0.05]), 0);
    }
}
