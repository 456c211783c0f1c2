// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types shared by every other layer:
//
//   error.rs      - the error taxonomy (configuration, network,
//                   storage, model-not-ready, numerical, input)
//   prediction.rs - results of inference and test-set evaluation
//   training.rs   - per-epoch training log entries
//   traits.rs     - the epoch observer used for live progress
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//
// Reference: Rust Book §5 (Structs), §9 (Error Handling), §10 (Traits)

/// Error taxonomy for the whole crate
pub mod error;

/// Prediction and evaluation results
pub mod prediction;

/// Training log entries
pub mod training;

// Core abstractions (traits) that other layers implement
pub mod traits;

/// Names of the three Iris species, indexed by class id.
pub const IRIS_CLASSES: [&str; 3] = ["Iris-setosa", "Iris-versicolor", "Iris-virginica"];

/// Number of measurements per flower (sepal length/width, petal length/width).
pub const IRIS_FEATURES: usize = 4;
