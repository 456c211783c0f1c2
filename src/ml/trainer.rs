// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on InferBackend (NdArray)
//   - The validation batcher must also use InferBackend
//   - Loss is categorical cross-entropy against one-hot labels
//
// After every epoch a TrainingLogEntry is appended and handed to
// the caller's EpochObserver. A failing observer is logged and
// ignored; a non-finite training loss aborts the run.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::time::Instant;

use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::config::LabConfig;
use crate::data::{batcher::IrisBatcher, iris::IrisSplit};
use crate::domain::error::{LabError, LabResult};
use crate::domain::traits::EpochObserver;
use crate::domain::training::{TrainingLog, TrainingLogEntry};
use crate::ml::model::{count_correct, Classifier, TrainedModel};
use crate::ml::{InferBackend, InferDevice, TrainBackend};

pub fn run_training(
    cfg:      &LabConfig,
    split:    &IrisSplit,
    observer: &mut dyn EpochObserver,
) -> LabResult<(TrainedModel, TrainingLog)> {
    if cfg.epochs == 0 {
        return Err(LabError::Configuration("epochs must be at least 1".into()));
    }
    if cfg.batch_size == 0 {
        return Err(LabError::Configuration("batch_size must be at least 1".into()));
    }

    let device = InferDevice::default();
    tracing::info!("Training on device: {:?}", device);
    train_loop(cfg, split, observer, device)
}

fn train_loop(
    cfg:      &LabConfig,
    split:    &IrisSplit,
    observer: &mut dyn EpochObserver,
    device:   InferDevice,
) -> LabResult<(TrainedModel, TrainingLog)> {

    // ── Build model ───────────────────────────────────────────────────────────
    TrainBackend::seed(cfg.seed);
    let mut model: Classifier<TrainBackend> = cfg.model.init(&device)?;
    tracing::info!(
        "Model ready: {} parameters\n{}",
        model.num_params(),
        cfg.model.summary()
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new().init();

    let encoder     = cfg.model.encoder();
    let num_classes = cfg.model.num_classes;

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = IrisBatcher::<TrainBackend>::new(device.clone(), encoder, num_classes);
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(split.train_dataset());

    // ── Validation data loader (InnerBackend - no autodiff overhead) ──────────
    let val_batcher = IrisBatcher::<InferBackend>::new(device.clone(), encoder, num_classes);
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(split.test_dataset());

    let begin   = Instant::now();
    let mut log = TrainingLog::new();

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let batch_len = batch.targets.dims()[0];
            let (loss, logits) = model.forward_loss(batch.inputs, batch.targets.clone());

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            if !loss_val.is_finite() {
                tracing::error!("Loss diverged at epoch {}: {}", epoch, loss_val);
                return Err(LabError::Numerical { epoch, loss: loss_val });
            }
            loss_sum += loss_val * batch_len as f64;
            correct  += count_correct(logits, batch.targets);
            seen     += batch_len;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        // parameters are read, never updated
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_correct  = 0usize;
        let mut val_seen     = 0usize;

        for batch in val_loader.iter() {
            let batch_len = batch.targets.dims()[0];
            let (loss, logits) = model_valid.forward_loss(batch.inputs, batch.targets.clone());
            val_loss_sum += loss.into_scalar().elem::<f64>() * batch_len as f64;
            val_correct  += count_correct(logits, batch.targets);
            val_seen     += batch_len;
        }

        let entry = TrainingLogEntry {
            epoch,
            loss:           mean(loss_sum, seen),
            accuracy:       ratio(correct, seen),
            val_loss:       mean(val_loss_sum, val_seen),
            val_accuracy:   ratio(val_correct, val_seen),
            secs_per_epoch: begin.elapsed().as_secs_f64() / epoch as f64,
        };

        tracing::info!(
            "Epoch {:>3}/{} | loss={:.4} | acc={:.1}% | val_loss={:.4} | val_acc={:.1}% | ~{:.4} s/epoch",
            epoch, cfg.epochs, entry.loss, entry.accuracy * 100.0,
            entry.val_loss, entry.val_accuracy * 100.0, entry.secs_per_epoch,
        );

        if entry.is_improvement(log.best_val_loss().unwrap_or(f64::INFINITY)) {
            tracing::debug!("Epoch {}: best val_loss so far ({:.4})", epoch, entry.val_loss);
        }

        if let Err(e) = observer.on_epoch_end(epoch, &entry) {
            tracing::warn!("Progress observer failed at epoch {}: {:#}", epoch, e);
        }
        log.push(entry);
    }

    let secs_per_epoch = begin.elapsed().as_secs_f64() / cfg.epochs as f64;
    tracing::info!("Model training complete: {:.4} seconds per epoch", secs_per_epoch);

    Ok((TrainedModel::new(cfg.model.clone(), model.valid()), log))
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { f64::NAN }
}

fn ratio(hits: usize, count: usize) -> f64 {
    if count > 0 { hits as f64 / count as f64 } else { 0.0 }
}
