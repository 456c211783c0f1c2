// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything from the in-memory Iris table to tensor batches.
//
// The pipeline flows in this order:
//
//   IRIS_DATA table
//       │
//       ▼
//   split_stratified  → per-class shuffle, hold out a fraction
//       │
//       ▼
//   IrisDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   IrisBatcher       → buckets features (FeatureEncoder),
//       │               one-hot encodes labels, stacks tensors
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// The Iris table and the fixed train/test split
pub mod iris;

/// Shuffles and splits items into train/test partitions per class
pub mod splitter;

/// Implements Burn's Dataset trait for Iris items
pub mod dataset;

/// Buckets raw measurements into embedding ids
pub mod encoder;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
