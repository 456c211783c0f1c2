// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn code that defines, trains and
// runs the classifier. The data layer only reaches into Burn
// for its Dataset/Batcher impls; everything else sees plain
// vectors and domain types.
//
// What's in this layer:
//
//   model.rs     - The classifier topology
//                  • Embedding lookup over bucketed measurements
//                  • Dense + ReLU stages applied per position
//                  • Flatten + dense output stage
//                  • Softmax over the three species
//
//   trainer.rs   - The training loop
//                  Forward pass, categorical cross-entropy,
//                  backward pass, Adam step, then a validation
//                  pass over the held-out partition per epoch
//
//   predictor.rs - Forward-only inference
//                  Single manual vectors, batches, and the
//                  test-set evaluation report
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Classifier architecture and configuration
pub mod model;

/// Epoch loop with validation
pub mod trainer;

/// Inference and evaluation
pub mod predictor;

/// CPU backend used for inference and for stored models
pub type InferBackend = burn::backend::NdArray;

/// Device handle for InferBackend
pub type InferDevice = burn::backend::ndarray::NdArrayDevice;

/// InferBackend with automatic differentiation, used while training
pub type TrainBackend = burn::backend::Autodiff<InferBackend>;
