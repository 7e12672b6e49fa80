// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Drives a TrainableModel through the corpus one macro-batch
// window at a time.
//
//   for epoch in first..=last:
//       epoch 1 (or the resumed epoch) → set_current_batch(start)
//       any later epoch                → reset()
//       while has_next_macro_batch():
//           drain the window into model.fit()
//           next_macro_batch()
//           log metrics, back up if the interval has passed
//   final backup
//
// Backups are time-triggered and happen strictly between
// windows, never while a batch is being built.
//
// The loop itself is backend-free; run_training() is the only
// place that picks a device, the network and the optimiser.
//
// Reference: Burn Book §5 (Training)
//            Tieleman & Hinton (2012) RMSProp

use std::time::{Duration, Instant};

use anyhow::Result;
use burn::{backend::wgpu::WgpuDevice, grad_clipping::GradientClippingConfig, optim::RmsPropConfig};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batch_iterator::BatchIterator, prefetch::drain_window_prefetched};
use crate::domain::traits::TrainableModel;
use crate::infra::{
    checkpoint::{CheckpointManager, TrainingState},
    metrics::{MacroBatchMetrics, MetricsLogger},
};
use crate::ml::{
    model::{Seq2SeqConfig, Seq2SeqNet},
    seq2seq::BurnSeq2Seq,
};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

// ─── Plan and summary ─────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingPlan {
    /// First epoch to run (epochs are numbered from 1)
    pub first_epoch:         usize,
    /// Last epoch to run, inclusive
    pub last_epoch:          usize,
    /// Batch cursor the first epoch starts from
    pub start_batch:         usize,
    pub checkpoint_interval: Duration,
    /// 0 drains windows on the calling thread
    pub prefetch_depth:      usize,
}

impl TrainingPlan {
    pub fn fresh(cfg: &TrainConfig) -> Self {
        Self {
            first_epoch:         1,
            last_epoch:          cfg.epochs,
            start_batch:         cfg.start_batch,
            checkpoint_interval: Duration::from_secs(cfg.checkpoint_interval_secs),
            prefetch_depth:      cfg.prefetch_depth,
        }
    }

    /// Continue from a saved cursor. A completed run moves on to
    /// the next epoch from batch 0.
    pub fn resuming(cfg: &TrainConfig, state: TrainingState) -> Self {
        let (first_epoch, start_batch) = if state.completed {
            (state.epoch + 1, 0)
        } else {
            (state.epoch, state.batch)
        };
        Self { first_epoch, start_batch, ..Self::fresh(cfg) }
    }

    pub fn is_empty(&self) -> bool {
        self.first_epoch > self.last_epoch
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSummary {
    pub epochs:         usize,
    pub batches:        usize,
    pub backups:        usize,
    pub last_mean_loss: Option<f64>,
}

// ─── Wgpu entry point ─────────────────────────────────────────────────────────
pub fn run_training(
    cfg:          &TrainConfig,
    mut iter:     BatchIterator,
    plan:         &TrainingPlan,
    ckpt_manager: &CheckpointManager,
    resume:       bool,
) -> Result<TrainingSummary> {
    let device = WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);

    let dict_size = iter.config().dict_size;
    let net = Seq2SeqConfig::new(dict_size)
        .with_embedding_dim(cfg.embedding_dim)
        .with_hidden_size(cfg.hidden_size)
        .init::<MyBackend>(&device);
    tracing::info!(
        "Model ready: dict_size={}, embedding_dim={}, hidden_size={}",
        dict_size,
        cfg.embedding_dim,
        cfg.hidden_size,
    );

    let optim = RmsPropConfig::new()
        .with_alpha(0.95)
        .with_epsilon(1e-8)
        .with_grad_clipping(Some(GradientClippingConfig::Norm(cfg.grad_clip_norm)))
        .init::<MyBackend, Seq2SeqNet<MyBackend>>();

    let mut model = BurnSeq2Seq::new(net, optim, cfg.learning_rate, device);
    if resume {
        ckpt_manager.load_model(&mut model)?;
    }

    let metrics = MetricsLogger::new(ckpt_manager.dir())?;
    train_macro_batches(&mut model, &mut iter, plan, ckpt_manager, Some(&metrics))
}

// ─── Backend-free loop ────────────────────────────────────────────────────────
pub fn train_macro_batches<M: TrainableModel>(
    model:        &mut M,
    iter:         &mut BatchIterator,
    plan:         &TrainingPlan,
    ckpt_manager: &CheckpointManager,
    metrics:      Option<&MetricsLogger>,
) -> Result<TrainingSummary> {
    let started = Instant::now();
    let mut last_backup = Instant::now();
    let mut summary = TrainingSummary::default();

    for epoch in plan.first_epoch..=plan.last_epoch {
        if epoch == plan.first_epoch {
            iter.set_current_batch(plan.start_batch)?;
        } else {
            iter.reset();
        }
        tracing::info!(
            "Epoch {}/{} from batch {}/{}",
            epoch,
            plan.last_epoch,
            iter.current_batch(),
            iter.total_batches(),
        );

        while iter.has_next_macro_batch() {
            let macro_batch = iter.current_macro_batch();
            let losses = drain_window(model, iter, plan.prefetch_depth)?;
            iter.next_macro_batch();

            if !losses.is_empty() {
                let row = MacroBatchMetrics::from_losses(
                    epoch,
                    macro_batch,
                    iter.current_batch(),
                    &losses,
                    started.elapsed().as_secs_f64(),
                );
                tracing::info!(
                    "Epoch {} macro-batch {} | batch {}/{} | mean_loss={:.4}",
                    epoch,
                    macro_batch,
                    row.batch,
                    iter.total_batches(),
                    row.mean_loss,
                );
                if let Some(logger) = metrics {
                    logger.log(&row)?;
                }
                summary.batches += losses.len();
                summary.last_mean_loss = Some(row.mean_loss);
            }

            if last_backup.elapsed() >= plan.checkpoint_interval {
                let state = TrainingState { epoch, batch: iter.current_batch(), completed: false };
                ckpt_manager.save_backup(model, state)?;
                summary.backups += 1;
                last_backup = Instant::now();
            }
        }
        summary.epochs += 1;
    }

    let state = TrainingState {
        epoch:     plan.last_epoch,
        batch:     iter.current_batch(),
        completed: true,
    };
    ckpt_manager.save_backup(model, state)?;
    summary.backups += 1;

    tracing::info!(
        "Training complete: {} epochs, {} batches in {:.1}s",
        summary.epochs,
        summary.batches,
        started.elapsed().as_secs_f64(),
    );
    Ok(summary)
}

/// Fit every batch of the active window; returns the batch losses.
fn drain_window<M: TrainableModel>(
    model: &mut M,
    iter:  &mut BatchIterator,
    depth: usize,
) -> Result<Vec<f64>> {
    let mut losses = Vec::new();
    if depth > 0 {
        drain_window_prefetched(iter, depth, |batch| {
            losses.push(model.fit(&batch)?);
            Ok(())
        })?;
    } else {
        while iter.has_next() {
            let batch = iter.next_batch()?;
            losses.push(model.fit(&batch)?);
        }
    }
    Ok(losses)
}
