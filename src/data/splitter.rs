// ============================================================
// Layer 4 - Train/Test Splitter
// ============================================================
// Splits labelled items into a training partition and a
// held-out test partition, class by class:
//
//   for each class c:
//       shuffle the items of class c
//       n_test = round(len(c) * test_fraction)
//       first n_test items  → test
//       the rest            → train
//
// Splitting per class keeps every species represented in the
// test partition in the same proportion as in the full table.
//
// The shuffle is seeded, so the same seed always yields the
// same split.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::dataset::IrisItem;

/// Shuffle each class and split it into (train, test).
///
/// # Arguments
/// * `items`         - All available items (consumed by this function)
/// * `num_classes`   - Number of distinct labels
/// * `test_fraction` - Proportion held out per class, e.g. 0.15 = 15%
/// * `seed`          - RNG seed for the per-class shuffle
///
/// Items with a label >= num_classes are dropped with a warning.
pub fn split_stratified(
    items:         Vec<IrisItem>,
    num_classes:   usize,
    test_fraction: f64,
    seed:          u64,
) -> (Vec<IrisItem>, Vec<IrisItem>) {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut by_class: Vec<Vec<IrisItem>> = vec![Vec::new(); num_classes];
    for item in items {
        match by_class.get_mut(item.label) {
            Some(bucket) => bucket.push(item),
            None => tracing::warn!("Dropping item with unknown label {}", item.label),
        }
    }

    let mut train = Vec::new();
    let mut test  = Vec::new();

    for mut class_items in by_class {
        class_items.shuffle(&mut rng);

        let n_test = ((class_items.len() as f64) * test_fraction).round() as usize;
        let n_test = n_test.min(class_items.len());

        // split_off(n) leaves [0..n) in class_items and returns [n..)
        let class_train = class_items.split_off(n_test);
        test.extend(class_items);
        train.extend(class_train);
    }

    tracing::debug!(
        "Stratified split: {} training, {} test",
        train.len(),
        test.len(),
    );

    (train, test)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn items(per_class: usize, classes: usize) -> Vec<IrisItem> {
        (0..classes)
            .flat_map(|c| (0..per_class).map(move |i| IrisItem::new(vec![i as f32], c)))
            .collect()
    }

    #[test]
    fn test_correct_split_sizes() {
        let (train, test) = split_stratified(items(20, 2), 2, 0.25, 1);
        assert_eq!(test.len(), 10);
        assert_eq!(train.len(), 30);
    }

    #[test]
    fn test_each_class_is_held_out_proportionally() {
        let (_, test) = split_stratified(items(50, 3), 3, 0.2, 9);
        for c in 0..3 {
            assert_eq!(test.iter().filter(|i| i.label == c).count(), 10);
        }
    }

    #[test]
    fn test_all_items_preserved() {
        let (train, test) = split_stratified(items(17, 3), 3, 0.3, 5);
        assert_eq!(train.len() + test.len(), 51);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, test) = split_stratified(Vec::new(), 3, 0.5, 0);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_unknown_labels_are_dropped() {
        let mut all = items(4, 2);
        all.push(IrisItem::new(vec![0.0], 5));
        let (train, test) = split_stratified(all, 2, 0.5, 0);
        assert_eq!(train.len() + test.len(), 8);
    }
}
