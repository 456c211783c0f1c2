// ============================================================
// Layer 4 - Iris Dataset Provider
// ============================================================
// The classic Fisher/Anderson Iris measurements, 50 flowers per
// species, held in memory. Each row is:
//
//   [sepal length, sepal width, petal length, petal width, class id]
//
// with lengths in centimetres and class ids indexing IRIS_CLASSES.
//
// load_iris() turns the table into an IrisSplit, holding the
// training and held-out partitions used everywhere else.

use crate::data::dataset::{IrisDataset, IrisItem};
use crate::data::splitter::split_stratified;
use crate::domain::error::{LabError, LabResult};
use crate::domain::{IRIS_CLASSES, IRIS_FEATURES};

/// Total number of rows in the table
pub const IRIS_ROWS: usize = 150;

#[rustfmt::skip]
const IRIS_DATA: [[f32; 5]; IRIS_ROWS] = [
    // Iris-setosa
    [5.1, 3.5, 1.4, 0.2, 0.0], [4.9, 3.0, 1.4, 0.2, 0.0], [4.7, 3.2, 1.3, 0.2, 0.0],
    [4.6, 3.1, 1.5, 0.2, 0.0], [5.0, 3.6, 1.4, 0.2, 0.0], [5.4, 3.9, 1.7, 0.4, 0.0],
    [4.6, 3.4, 1.4, 0.3, 0.0], [5.0, 3.4, 1.5, 0.2, 0.0], [4.4, 2.9, 1.4, 0.2, 0.0],
    [4.9, 3.1, 1.5, 0.1, 0.0], [5.4, 3.7, 1.5, 0.2, 0.0], [4.8, 3.4, 1.6, 0.2, 0.0],
    [4.8, 3.0, 1.4, 0.1, 0.0], [4.3, 3.0, 1.1, 0.1, 0.0], [5.8, 4.0, 1.2, 0.2, 0.0],
    [5.7, 4.4, 1.5, 0.4, 0.0], [5.4, 3.9, 1.3, 0.4, 0.0], [5.1, 3.5, 1.4, 0.3, 0.0],
    [5.7, 3.8, 1.7, 0.3, 0.0], [5.1, 3.8, 1.5, 0.3, 0.0], [5.4, 3.4, 1.7, 0.2, 0.0],
    [5.1, 3.7, 1.5, 0.4, 0.0], [4.6, 3.6, 1.0, 0.2, 0.0], [5.1, 3.3, 1.7, 0.5, 0.0],
    [4.8, 3.4, 1.9, 0.2, 0.0], [5.0, 3.0, 1.6, 0.2, 0.0], [5.0, 3.4, 1.6, 0.4, 0.0],
    [5.2, 3.5, 1.5, 0.2, 0.0], [5.2, 3.4, 1.4, 0.2, 0.0], [4.7, 3.2, 1.6, 0.2, 0.0],
    [4.8, 3.1, 1.6, 0.2, 0.0], [5.4, 3.4, 1.5, 0.4, 0.0], [5.2, 4.1, 1.5, 0.1, 0.0],
    [5.5, 4.2, 1.4, 0.2, 0.0], [4.9, 3.1, 1.5, 0.1, 0.0], [5.0, 3.2, 1.2, 0.2, 0.0],
    [5.5, 3.5, 1.3, 0.2, 0.0], [4.9, 3.1, 1.5, 0.1, 0.0], [4.4, 3.0, 1.3, 0.2, 0.0],
    [5.1, 3.4, 1.5, 0.2, 0.0], [5.0, 3.5, 1.3, 0.3, 0.0], [4.5, 2.3, 1.3, 0.3, 0.0],
    [4.4, 3.2, 1.3, 0.2, 0.0], [5.0, 3.5, 1.6, 0.6, 0.0], [5.1, 3.8, 1.9, 0.4, 0.0],
    [4.8, 3.0, 1.4, 0.3, 0.0], [5.1, 3.8, 1.6, 0.2, 0.0], [4.6, 3.2, 1.4, 0.2, 0.0],
    [5.3, 3.7, 1.5, 0.2, 0.0], [5.0, 3.3, 1.4, 0.2, 0.0],
    // Iris-versicolor
    [7.0, 3.2, 4.7, 1.4, 1.0], [6.4, 3.2, 4.5, 1.5, 1.0], [6.9, 3.1, 4.9, 1.5, 1.0],
    [5.5, 2.3, 4.0, 1.3, 1.0], [6.5, 2.8, 4.6, 1.5, 1.0], [5.7, 2.8, 4.5, 1.3, 1.0],
    [6.3, 3.3, 4.7, 1.6, 1.0], [4.9, 2.4, 3.3, 1.0, 1.0], [6.6, 2.9, 4.6, 1.3, 1.0],
    [5.2, 2.7, 3.9, 1.4, 1.0], [5.0, 2.0, 3.5, 1.0, 1.0], [5.9, 3.0, 4.2, 1.5, 1.0],
    [6.0, 2.2, 4.0, 1.0, 1.0], [6.1, 2.9, 4.7, 1.4, 1.0], [5.6, 2.9, 3.6, 1.3, 1.0],
    [6.7, 3.1, 4.4, 1.4, 1.0], [5.6, 3.0, 4.5, 1.5, 1.0], [5.8, 2.7, 4.1, 1.0, 1.0],
    [6.2, 2.2, 4.5, 1.5, 1.0], [5.6, 2.5, 3.9, 1.1, 1.0], [5.9, 3.2, 4.8, 1.8, 1.0],
    [6.1, 2.8, 4.0, 1.3, 1.0], [6.3, 2.5, 4.9, 1.5, 1.0], [6.1, 2.8, 4.7, 1.2, 1.0],
    [6.4, 2.9, 4.3, 1.3, 1.0], [6.6, 3.0, 4.4, 1.4, 1.0], [6.8, 2.8, 4.8, 1.4, 1.0],
    [6.7, 3.0, 5.0, 1.7, 1.0], [6.0, 2.9, 4.5, 1.5, 1.0], [5.7, 2.6, 3.5, 1.0, 1.0],
    [5.5, 2.4, 3.8, 1.1, 1.0], [5.5, 2.4, 3.7, 1.0, 1.0], [5.8, 2.7, 3.9, 1.2, 1.0],
    [6.0, 2.7, 5.1, 1.6, 1.0], [5.4, 3.0, 4.5, 1.5, 1.0], [6.0, 3.4, 4.5, 1.6, 1.0],
    [6.7, 3.1, 4.7, 1.5, 1.0], [6.3, 2.3, 4.4, 1.3, 1.0], [5.6, 3.0, 4.1, 1.3, 1.0],
    [5.5, 2.5, 4.0, 1.3, 1.0], [5.5, 2.6, 4.4, 1.2, 1.0], [6.1, 3.0, 4.6, 1.4, 1.0],
    [5.8, 2.6, 4.0, 1.2, 1.0], [5.0, 2.3, 3.3, 1.0, 1.0], [5.6, 2.7, 4.2, 1.3, 1.0],
    [5.7, 3.0, 4.2, 1.2, 1.0], [5.7, 2.9, 4.2, 1.3, 1.0], [6.2, 2.9, 4.3, 1.3, 1.0],
    [5.1, 2.5, 3.0, 1.1, 1.0], [5.7, 2.8, 4.1, 1.3, 1.0],
    // Iris-virginica
    [6.3, 3.3, 6.0, 2.5, 2.0], [5.8, 2.7, 5.1, 1.9, 2.0], [7.1, 3.0, 5.9, 2.1, 2.0],
    [6.3, 2.9, 5.6, 1.8, 2.0], [6.5, 3.0, 5.8, 2.2, 2.0], [7.6, 3.0, 6.6, 2.1, 2.0],
    [4.9, 2.5, 4.5, 1.7, 2.0], [7.3, 2.9, 6.3, 1.8, 2.0], [6.7, 2.5, 5.8, 1.8, 2.0],
    [7.2, 3.6, 6.1, 2.5, 2.0], [6.5, 3.2, 5.1, 2.0, 2.0], [6.4, 2.7, 5.3, 1.9, 2.0],
    [6.8, 3.0, 5.5, 2.1, 2.0], [5.7, 2.5, 5.0, 2.0, 2.0], [5.8, 2.8, 5.1, 2.4, 2.0],
    [6.4, 3.2, 5.3, 2.3, 2.0], [6.5, 3.0, 5.5, 1.8, 2.0], [7.7, 3.8, 6.7, 2.2, 2.0],
    [7.7, 2.6, 6.9, 2.3, 2.0], [6.0, 2.2, 5.0, 1.5, 2.0], [6.9, 3.2, 5.7, 2.3, 2.0],
    [5.6, 2.8, 4.9, 2.0, 2.0], [7.7, 2.8, 6.7, 2.0, 2.0], [6.3, 2.7, 4.9, 1.8, 2.0],
    [6.7, 3.3, 5.7, 2.1, 2.0], [7.2, 3.2, 6.0, 1.8, 2.0], [6.2, 2.8, 4.8, 1.8, 2.0],
    [6.1, 3.0, 4.9, 1.8, 2.0], [6.4, 2.8, 5.6, 2.1, 2.0], [7.2, 3.0, 5.8, 1.6, 2.0],
    [7.4, 2.8, 6.1, 1.9, 2.0], [7.9, 3.8, 6.4, 2.0, 2.0], [6.4, 2.8, 5.6, 2.2, 2.0],
    [6.3, 2.8, 5.1, 1.5, 2.0], [6.1, 2.6, 5.6, 1.4, 2.0], [7.7, 3.0, 6.1, 2.3, 2.0],
    [6.3, 3.4, 5.6, 2.4, 2.0], [6.4, 3.1, 5.5, 1.8, 2.0], [6.0, 3.0, 4.8, 1.8, 2.0],
    [6.9, 3.1, 5.4, 2.1, 2.0], [6.7, 3.1, 5.6, 2.4, 2.0], [6.9, 3.1, 5.1, 2.3, 2.0],
    [5.8, 2.7, 5.1, 1.9, 2.0], [6.8, 3.2, 5.9, 2.3, 2.0], [6.7, 3.3, 5.7, 2.5, 2.0],
    [6.7, 3.0, 5.2, 2.3, 2.0], [6.3, 2.5, 5.0, 1.9, 2.0], [6.5, 3.0, 5.2, 2.0, 2.0],
    [6.2, 3.4, 5.4, 2.3, 2.0], [5.9, 3.0, 5.1, 1.8, 2.0],
];

/// The dataset after the train/test split. Fixed once built.
#[derive(Debug, Clone)]
pub struct IrisSplit {
    train:      Vec<IrisItem>,
    test:       Vec<IrisItem>,
    test_split: f64,
}

impl IrisSplit {
    pub fn train(&self) -> &[IrisItem] {
        &self.train
    }

    pub fn test(&self) -> &[IrisItem] {
        &self.test
    }

    pub fn test_split(&self) -> f64 {
        self.test_split
    }

    pub fn total(&self) -> usize {
        self.train.len() + self.test.len()
    }

    /// Burn dataset over the training partition
    pub fn train_dataset(&self) -> IrisDataset {
        IrisDataset::new(self.train.clone())
    }

    /// Burn dataset over the held-out partition
    pub fn test_dataset(&self) -> IrisDataset {
        IrisDataset::new(self.test.clone())
    }
}

/// Every row of the table as an IrisItem, in table order
pub fn all_items() -> Vec<IrisItem> {
    IRIS_DATA
        .iter()
        .map(|row| IrisItem::new(row[..IRIS_FEATURES].to_vec(), row[IRIS_FEATURES] as usize))
        .collect()
}

/// Load the Iris table and hold out `test_split` of each class.
///
/// `test_split` must lie strictly between 0 and 1 and leave at least one
/// example on each side of the split.
pub fn load_iris(test_split: f64, seed: u64) -> LabResult<IrisSplit> {
    if !(test_split > 0.0 && test_split < 1.0) {
        return Err(LabError::Dataset(format!(
            "test split must be in (0, 1), got {test_split}"
        )));
    }

    let (train, test) = split_stratified(all_items(), IRIS_CLASSES.len(), test_split, seed);
    if train.is_empty() || test.is_empty() {
        return Err(LabError::Dataset(format!(
            "test split {test_split} leaves an empty partition ({} train, {} test)",
            train.len(),
            test.len()
        )));
    }

    tracing::debug!(
        "Loaded Iris data: {} train, {} test (split {})",
        train.len(),
        test.len(),
        test_split
    );
    Ok(IrisSplit { train, test, test_split })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_fifty_rows_per_class() {
        let items = all_items();
        assert_eq!(items.len(), IRIS_ROWS);
        for class in 0..IRIS_CLASSES.len() {
            assert_eq!(items.iter().filter(|i| i.label == class).count(), 50);
        }
    }

    #[test]
    fn test_fifteen_percent_split_sizes() {
        let split = load_iris(0.15, 42).unwrap();
        // round(50 * 0.15) = 8 held out per class
        assert_eq!(split.test().len(), 24);
        assert_eq!(split.train().len(), 126);
        assert_eq!(split.total(), IRIS_ROWS);
    }

    #[test]
    fn test_partitions_always_cover_the_table() {
        for &frac in &[0.05, 0.2, 0.33, 0.5, 0.9] {
            let split = load_iris(frac, 7).unwrap();
            assert_eq!(split.train().len() + split.test().len(), IRIS_ROWS);
            let expected_test = IRIS_CLASSES.len() * (50.0 * frac).round() as usize;
            assert_eq!(split.test().len(), expected_test);
        }
    }

    #[test]
    fn test_rejects_out_of_range_split() {
        assert!(load_iris(0.0, 1).is_err());
        assert!(load_iris(1.0, 1).is_err());
        assert!(load_iris(-0.2, 1).is_err());
        assert!(load_iris(f64::NAN, 1).is_err());
    }

    #[test]
    fn test_rejects_split_that_empties_a_partition() {
        // round(50 * 0.005) = 0 per class → empty test partition
        assert!(matches!(load_iris(0.005, 1), Err(LabError::Dataset(_))));
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = load_iris(0.15, 3).unwrap();
        let b = load_iris(0.15, 3).unwrap();
        assert_eq!(a.test(), b.test());
    }
}
