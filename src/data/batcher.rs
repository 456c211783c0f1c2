// ============================================================
// Layer 4 - Iris Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<IrisItem>
// into tensors the model can consume.
//
// How batching works here:
//   Input:  Vec of N IrisItems, each with F raw measurements
//   Output: IrisBatch with
//             inputs  [N, F]  (bucketed token ids, Int)
//             targets [N, C]  (one-hot labels, Float)
//
//   Ids and one-hot rows are flattened into one Vec each and
//   reshaped:  [x1_f1, x1_f2, ..., xN_fF] → [N, F]
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::IrisItem;
use crate::data::encoder::FeatureEncoder;

// ─── IrisBatch ────────────────────────────────────────────────────────────────
/// A batch of labelled flowers ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
#[derive(Debug, Clone)]
pub struct IrisBatch<B: Backend> {
    /// Bucketed measurement ids - shape: [batch_size, num_features]
    pub inputs: Tensor<B, 2, Int>,

    /// One-hot labels - shape: [batch_size, num_classes]
    pub targets: Tensor<B, 2>,
}

// ─── IrisBatcher ──────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct IrisBatcher<B: Backend> {
    pub device:  B::Device,
    encoder:     FeatureEncoder,
    num_classes: usize,
}

impl<B: Backend> IrisBatcher<B> {
    pub fn new(device: B::Device, encoder: FeatureEncoder, num_classes: usize) -> Self {
        Self { device, encoder, num_classes }
    }
}

impl<B: Backend> Batcher<IrisItem, IrisBatch<B>> for IrisBatcher<B> {
    fn batch(&self, items: Vec<IrisItem>) -> IrisBatch<B> {
        let batch_size   = items.len();
        let num_features = items.first().map(|i| i.features.len()).unwrap_or(0);

        let ids: Vec<i64> = items
            .iter()
            .flat_map(|item| self.encoder.encode(&item.features))
            .collect();

        let one_hot: Vec<f32> = items
            .iter()
            .flat_map(|item| item.one_hot(self.num_classes))
            .collect();

        let inputs = Tensor::<B, 2, Int>::from_data(
            TensorData::new(ids, [batch_size, num_features]),
            &self.device,
        );
        let targets = Tensor::<B, 2>::from_data(
            TensorData::new(one_hot, [batch_size, self.num_classes]),
            &self.device,
        );

        IrisBatch { inputs, targets }
    }
}
