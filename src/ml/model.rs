// ============================================================
// Layer 5 - Classifier Model
// ============================================================
// Stages, in order:
//
//   Embedding   [batch, 4] ids → [batch, 4, embedding_dim]
//   Dense+ReLU  applied to every position, widths from `hidden`
//   Flatten     [batch, 4, last] → [batch, 4 * last]
//   Dense       → [batch, num_classes] logits
//   Softmax     → class probabilities (inference only; training
//                 uses log_softmax inside the loss)
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig, Relu},
    prelude::*,
    tensor::activation::{log_softmax, softmax},
};

use crate::data::encoder::FeatureEncoder;
use crate::domain::error::{LabError, LabResult};
use crate::domain::IRIS_CLASSES;
use crate::ml::InferBackend;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally - do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ClassifierConfig {
    /// Number of distinct embedding ids (measurement buckets)
    pub vocab_size:    usize,
    pub embedding_dim: usize,
    /// Measurements per example; the model's fixed input width
    pub seq_len:       usize,
    /// Widths of the ReLU dense stages, applied per position
    pub hidden:        Vec<usize>,
    pub num_classes:   usize,
    /// Embedding ids per centimetre, see FeatureEncoder
    #[config(default = 2.0)]
    pub bucket_scale:  f64,
}

impl ClassifierConfig {
    /// The topology used by the demo: embed(16 → 500) → 64 → 32 → 16
    /// → flatten → 3-way softmax.
    pub fn iris() -> Self {
        Self::new(16, 500, 4, vec![64, 32, 16], IRIS_CLASSES.len())
    }

    /// Reject definitions whose stages cannot be wired together.
    pub fn validate(&self) -> LabResult<()> {
        let fail = |msg: String| Err(LabError::Configuration(msg));

        if self.vocab_size == 0 {
            return fail("vocab_size must be at least 1".into());
        }
        if self.embedding_dim == 0 {
            return fail("embedding_dim must be at least 1".into());
        }
        if self.seq_len == 0 {
            return fail("seq_len must be at least 1".into());
        }
        if self.hidden.is_empty() {
            return fail("at least one hidden stage is required".into());
        }
        if let Some(pos) = self.hidden.iter().position(|&w| w == 0) {
            return fail(format!("hidden stage {pos} has width 0"));
        }
        if self.num_classes < 2 {
            return fail(format!("num_classes must be at least 2, got {}", self.num_classes));
        }
        if !(self.bucket_scale.is_finite() && self.bucket_scale > 0.0) {
            return fail(format!("bucket_scale must be positive, got {}", self.bucket_scale));
        }
        Ok(())
    }

    pub fn encoder(&self) -> FeatureEncoder {
        FeatureEncoder::new(self.bucket_scale, self.vocab_size)
    }

    /// Build an untrained model. Fails only if `validate` fails.
    pub fn init<B: Backend>(&self, device: &B::Device) -> LabResult<Classifier<B>> {
        self.validate()?;

        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device);

        let mut width  = self.embedding_dim;
        let mut hidden = Vec::with_capacity(self.hidden.len());
        for &units in &self.hidden {
            hidden.push(LinearConfig::new(width, units).init(device));
            width = units;
        }

        // flatten: [batch, seq_len, width] → [batch, seq_len * width]
        let output = LinearConfig::new(self.seq_len * width, self.num_classes).init(device);

        Ok(Classifier {
            embedding,
            hidden,
            activation: Relu::new(),
            output,
            seq_len: self.seq_len,
        })
    }

    /// One line per stage, like a Keras model summary.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "embedding   [{} ids → {}] x {} positions",
            self.vocab_size, self.embedding_dim, self.seq_len
        )];
        let mut width = self.embedding_dim;
        for units in &self.hidden {
            lines.push(format!("dense+relu  {width} → {units}"));
            width = *units;
        }
        lines.push(format!("flatten     {} x {} → {}", self.seq_len, width, self.seq_len * width));
        lines.push(format!("dense+softmax {} → {}", self.seq_len * width, self.num_classes));
        lines.join("\n")
    }
}

#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    pub embedding:  Embedding<B>,
    pub hidden:     Vec<Linear<B>>,
    pub activation: Relu,
    pub output:     Linear<B>,
    pub seq_len:    usize,
}

impl<B: Backend> Classifier<B> {
    /// inputs: [batch, seq_len] ids → logits: [batch, num_classes]
    pub fn forward_logits(&self, inputs: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch_size, _] = inputs.dims();

        let mut x = self.embedding.forward(inputs); // [batch, seq_len, embedding_dim]
        for stage in &self.hidden {
            x = self.activation.forward(stage.forward(x));
        }

        let [_, seq_len, width] = x.dims();
        let x = x.reshape([batch_size, seq_len * width]);
        self.output.forward(x)
    }

    /// Class probabilities: [batch, num_classes], rows sum to 1
    pub fn forward(&self, inputs: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        softmax(self.forward_logits(inputs), 1)
    }

    /// Mean categorical cross-entropy against one-hot targets, plus the logits.
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 2, Int>,
        targets: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward_logits(inputs);
        let loss = categorical_cross_entropy(logits.clone(), targets);
        (loss, logits)
    }
}

/// -mean_over_batch( sum_over_classes( onehot * log_softmax(logits) ) )
pub fn categorical_cross_entropy<B: Backend>(
    logits:  Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    (log_softmax(logits, 1) * targets).sum_dim(1).mean().neg()
}

/// Number of rows whose highest logit matches the one-hot target.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 2>) -> usize {
    let predicted = logits.argmax(1);
    let expected  = targets.argmax(1);
    predicted
        .equal(expected)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

// ─── TrainedModel ─────────────────────────────────────────────────────────────
/// A model ready for inference, together with the configuration it was
/// built from. This is what the session slot holds and what gets persisted.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub config: ClassifierConfig,
    pub model:  Classifier<InferBackend>,
}

impl TrainedModel {
    pub fn new(config: ClassifierConfig, model: Classifier<InferBackend>) -> Self {
        Self { config, model }
    }

    pub fn num_params(&self) -> usize {
        self.model.num_params()
    }
}
