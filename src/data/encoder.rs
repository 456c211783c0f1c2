// ============================================================
// Layer 4 - Feature Encoder
// ============================================================
// The model's first stage is an embedding lookup, which takes
// integer ids rather than real numbers. Each measurement is
// bucketed into an id:
//
//   id = clamp(floor(value * bucket_scale), 0, vocab_size - 1)
//
// With the default scale of 2.0 each id covers half a centimetre,
// and vocab_size = 16 covers 0.0 cm to 8.0 cm.
//
// The scale lives in ClassifierConfig, so a restored model always
// buckets manual input exactly like the model that was trained.

use crate::domain::error::{LabError, LabResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureEncoder {
    bucket_scale: f64,
    vocab_size:   usize,
}

impl FeatureEncoder {
    pub fn new(bucket_scale: f64, vocab_size: usize) -> Self {
        Self { bucket_scale, vocab_size }
    }

    /// Bucket a single measurement. Non-finite values map to id 0;
    /// callers that accept user input should run `check` first.
    pub fn token(&self, value: f32) -> i64 {
        if !value.is_finite() || self.vocab_size == 0 {
            return 0;
        }
        let id = (f64::from(value) * self.bucket_scale).floor();
        id.clamp(0.0, (self.vocab_size - 1) as f64) as i64
    }

    pub fn encode(&self, features: &[f32]) -> Vec<i64> {
        features.iter().map(|&v| self.token(v)).collect()
    }

    /// Validate a manually entered feature vector.
    pub fn check(&self, features: &[f32], expected_width: usize) -> LabResult<()> {
        if features.len() != expected_width {
            return Err(LabError::InputWidth {
                expected: expected_width,
                actual:   features.len(),
            });
        }
        if let Some(bad) = features.iter().find(|v| !v.is_finite()) {
            return Err(LabError::InvalidInput(format!(
                "feature values must be finite numbers, got {bad}"
            )));
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_centimetre_buckets() {
        let enc = FeatureEncoder::new(2.0, 16);
        assert_eq!(enc.encode(&[5.1, 3.5, 1.4, 0.2]), vec![10, 7, 2, 0]);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let enc = FeatureEncoder::new(2.0, 16);
        assert_eq!(enc.token(-3.0), 0);
        assert_eq!(enc.token(42.0), 15);
        assert_eq!(enc.token(f32::NAN), 0);
    }

    #[test]
    fn test_check_rejects_wrong_width() {
        let enc = FeatureEncoder::new(2.0, 16);
        let err = enc.check(&[1.0, 2.0], 4).unwrap_err();
        assert!(matches!(err, LabError::InputWidth { expected: 4, actual: 2 }));
    }

    #[test]
    fn test_check_rejects_non_finite() {
        let enc = FeatureEncoder::new(2.0, 16);
        assert!(matches!(
            enc.check(&[1.0, f32::INFINITY, 1.0, 1.0], 4),
            Err(LabError::InvalidInput(_))
        ));
        assert!(enc.check(&[1.0, 2.0, 3.0, 4.0], 4).is_ok());
    }
}
