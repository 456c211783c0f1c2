use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One labelled flower: raw measurements plus its class id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrisItem {
    pub features: Vec<f32>,
    pub label:    usize,
}

impl IrisItem {
    pub fn new(features: Vec<f32>, label: usize) -> Self {
        Self { features, label }
    }

    /// The label as a one-hot vector of length `num_classes`
    pub fn one_hot(&self, num_classes: usize) -> Vec<f32> {
        let mut v = vec![0.0; num_classes];
        if let Some(slot) = v.get_mut(self.label) {
            *slot = 1.0;
        }
        v
    }
}

pub struct IrisDataset {
    items: Vec<IrisItem>,
}

impl IrisDataset {
    pub fn new(items: Vec<IrisItem>) -> Self { Self { items } }
}

impl Dataset<IrisItem> for IrisDataset {
    fn get(&self, index: usize) -> Option<IrisItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hot() {
        let item = IrisItem::new(vec![5.1, 3.5, 1.4, 0.2], 2);
        assert_eq!(item.one_hot(3), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_dataset_get_and_len() {
        let ds = IrisDataset::new(vec![IrisItem::new(vec![1.0], 0), IrisItem::new(vec![2.0], 1)]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).map(|i| i.label), Some(1));
        assert!(ds.get(2).is_none());
    }
}
