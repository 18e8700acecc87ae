// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Reconstruction training with SGD + momentum, in two phases:
//
//   Pretrain : fresh weights, lr decayed ×lr_decay every
//              lr_step epochs, checkpoint only when the epoch's
//              mean loss beats the best so far in this phase
//   Finetune : weights loaded from the pre-training checkpoint,
//              fixed lr by default, checkpoint after every epoch
//
// Each phase owns a fresh TrainingState; nothing carries over
// between phases except what the checkpoint holds.
//
// Key Burn insights:
//   - Training runs on an AutodiffBackend so dropout is live
//   - The DataLoader is built with shuffle(seed) once; every
//     .iter() call reshuffles from that same RNG, so epochs see
//     different orders but the whole run is reproducible
//   - B::seed(seed) fixes the dropout masks
//
// Reference: Burn Book §5, Sutskever et al. (2013) momentum

use std::fmt;

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    optim::{momentum::MomentumConfig, GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use crate::application::train_use_case::{PhaseConfig, TrainConfig};
use crate::data::{batcher::FeatureBatcher, dataset::FeatureDataset};
use crate::domain::error::{AutoEncoderError, CheckpointFailure};
use crate::infra::{
    checkpoint::{CheckpointManager, FINETUNED, PRETRAINED},
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::AutoEncoder;

// ─── Phases ───────────────────────────────────────────────────────────────────

/// When a phase writes its checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckpointPolicy {
    /// Only when the epoch's mean loss is strictly below the best so far
    OnImprovement,
    /// After every epoch, regardless of loss
    EveryEpoch,
}

impl CheckpointPolicy {
    pub fn should_save(self, epoch_loss: f64, best_loss: f64) -> bool {
        match self {
            CheckpointPolicy::OnImprovement => epoch_loss < best_loss,
            CheckpointPolicy::EveryEpoch    => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pretrain,
    Finetune,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Pretrain => "pretrain",
            Phase::Finetune => "finetune",
        }
    }

    pub fn checkpoint_name(self) -> &'static str {
        match self {
            Phase::Pretrain => PRETRAINED,
            Phase::Finetune => FINETUNED,
        }
    }

    pub fn policy(self) -> CheckpointPolicy {
        match self {
            Phase::Pretrain => CheckpointPolicy::OnImprovement,
            Phase::Finetune => CheckpointPolicy::EveryEpoch,
        }
    }
}

// ─── Training State ───────────────────────────────────────────────────────────

/// Per-phase mutable state. Created at phase start, dropped at phase end.
#[derive(Debug, Clone)]
pub struct TrainingState {
    pub epoch:     usize,
    pub loss_sum:  f64,
    pub batches:   usize,
    pub best_loss: f64,
    pub lr:        f64,
}

impl TrainingState {
    pub fn new(lr: f64) -> Self {
        Self { epoch: 0, loss_sum: 0.0, batches: 0, best_loss: f64::INFINITY, lr }
    }

    pub fn start_epoch(&mut self, epoch: usize, lr: f64) {
        self.epoch    = epoch;
        self.loss_sum = 0.0;
        self.batches  = 0;
        self.lr       = lr;
    }

    pub fn record_batch(&mut self, loss: f64) {
        self.loss_sum += loss;
        self.batches  += 1;
    }

    /// Mean loss over the batches seen so far in this epoch.
    pub fn mean_loss(&self) -> f64 {
        if self.batches == 0 {
            f64::NAN
        } else {
            self.loss_sum / self.batches as f64
        }
    }
}

/// Summary of a finished phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase:       Phase,
    pub epochs_run:  usize,
    pub best_loss:   f64,
    pub final_loss:  f64,
    /// Number of checkpoint writes during the phase
    pub checkpoints: usize,
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} finished: {} epochs | best_loss={:.6} | final_loss={:.6} | {} checkpoint(s)",
            self.phase.name(), self.epochs_run, self.best_loss, self.final_loss, self.checkpoints
        )
    }
}

// ─── Entry Points ─────────────────────────────────────────────────────────────

/// Phase 1: initialise fresh parameters from `cfg.seed` and train.
pub fn pretrain<B: AutodiffBackend>(
    cfg:     &TrainConfig,
    dataset: FeatureDataset,
    ckpt:    &CheckpointManager,
    device:  &B::Device,
) -> Result<PhaseReport> {
    B::seed(cfg.seed);
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let model: AutoEncoder<B> = cfg.model_config(dataset.input_width()).init(&mut rng, device)?;
    tracing::info!(
        "Pre-training from fresh weights: input_width={}, widths={:?}",
        dataset.input_width(), cfg.widths
    );
    run_phase(Phase::Pretrain, &cfg.pretrain, cfg, model, dataset, ckpt, device)
}

/// Phase 2: build the configured topology, load the pre-training checkpoint
/// into it and keep training.
pub fn finetune<B: AutodiffBackend>(
    cfg:     &TrainConfig,
    dataset: FeatureDataset,
    ckpt:    &CheckpointManager,
    device:  &B::Device,
) -> Result<PhaseReport> {
    B::seed(cfg.seed);
    let model_cfg = cfg.model_config(dataset.input_width());

    // Reject before allocating anything if the checkpoint is absent.
    if !ckpt.exists(PRETRAINED) {
        return Err(AutoEncoderError::checkpoint(
            ckpt.dir().join(format!("{PRETRAINED}.json")),
            CheckpointFailure::Missing,
        )
        .into());
    }

    let mut rng   = StdRng::seed_from_u64(cfg.seed);
    let mut model: AutoEncoder<B> = model_cfg.init(&mut rng, device)?;
    let meta = ckpt.load_into(PRETRAINED, &mut model, device)?;
    tracing::info!(
        "Fine-tuning from '{}' (epoch {}, loss {:.6})",
        PRETRAINED, meta.epoch, meta.loss
    );
    run_phase(Phase::Finetune, &cfg.finetune, cfg, model, dataset, ckpt, device)
}

// ─── Phase Loop ───────────────────────────────────────────────────────────────

fn run_phase<B: AutodiffBackend>(
    phase:     Phase,
    phase_cfg: &PhaseConfig,
    cfg:       &TrainConfig,
    mut model: AutoEncoder<B>,
    dataset:   FeatureDataset,
    ckpt:      &CheckpointManager,
    device:    &B::Device,
) -> Result<PhaseReport> {
    anyhow::ensure!(cfg.batch_size > 0, "batch_size must be positive");
    let sample_count = dataset.sample_count();

    // ── SGD optimiser ─────────────────────────────────────────────────────────
    // v = μ*v + g
    // θ = θ - lr * v
    let momentum = (phase_cfg.momentum > 0.0).then(|| {
        MomentumConfig::new()
            .with_momentum(phase_cfg.momentum)
            .with_dampening(0.0)
            .with_nesterov(false)
    });
    let mut optim = SgdConfig::new().with_momentum(momentum).init::<B, AutoEncoder<B>>();

    // ── Shuffled data loader ──────────────────────────────────────────────────
    let batcher = FeatureBatcher::<B>::new(device.clone());
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(dataset);

    let metrics     = MetricsLogger::new(ckpt.dir(), phase.name())?;
    let mut state   = TrainingState::new(phase_cfg.lr);
    let mut checkpoints = 0usize;

    tracing::info!(
        "{}: {} epochs over {} samples, batch_size={}, lr={}, policy={:?}",
        phase.name(), phase_cfg.epochs, sample_count, cfg.batch_size, phase_cfg.lr, phase.policy()
    );

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=phase_cfg.epochs {
        state.start_epoch(epoch, phase_cfg.lr_at(epoch));

        for (i, batch) in loader.iter().enumerate() {
            let (loss, _) = model.forward_loss(batch.features);
            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

            if !loss_val.is_finite() {
                tracing::warn!("{}: loss diverged in epoch {} batch {}", phase.name(), epoch, i + 1);
                return Err(AutoEncoderError::Numeric { epoch, batch: i + 1, loss: loss_val }.into());
            }
            state.record_batch(loss_val);

            if phase_cfg.log_interval > 0 && (i + 1) % phase_cfg.log_interval == 0 {
                tracing::info!(
                    "{} epoch {} batch {}: running loss={:.6}",
                    phase.name(), epoch, i + 1, state.mean_loss()
                );
            }

            // Backward pass + SGD update
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(state.lr, model, grads);
        }

        let epoch_loss   = state.mean_loss();
        let checkpointed = phase.policy().should_save(epoch_loss, state.best_loss);
        if epoch_loss < state.best_loss {
            state.best_loss = epoch_loss;
        }

        // A failed write propagates: the phase never continues past it.
        if checkpointed {
            ckpt.save(phase.checkpoint_name(), &model, epoch, epoch_loss)?;
            checkpoints += 1;
            tracing::info!("Checkpoint '{}' saved for epoch {}", phase.checkpoint_name(), epoch);
        }

        metrics.log(&EpochMetrics::new(epoch, epoch_loss, state.lr, checkpointed))?;
        println!(
            "{} epoch {:>3}/{} | loss={:.6} | lr={:.6}{}",
            phase.name(), epoch, phase_cfg.epochs, epoch_loss, state.lr,
            if checkpointed { " | saved" } else { "" },
        );
    }

    let report = PhaseReport {
        phase,
        epochs_run:  state.epoch,
        best_loss:   state.best_loss,
        final_loss:  state.mean_loss(),
        checkpoints,
    };
    tracing::info!("{} complete, metrics in '{}'", phase.name(), metrics.csv_path().display());
    Ok(report)
}
