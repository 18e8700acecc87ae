// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the two training phases:
//
//   Step 1: Load feature vectors       (Layer 4 - data)
//   Step 2: Subsample (optional)       (Layer 4 - data)
//   Step 3: Build the dataset          (Layer 4 - data)
//   Step 4: Save config                (Layer 6 - infra)
//   Step 5: Run the phase              (Layer 5 - ml)
//
// Pre-training starts from fresh weights and checkpoints on
// improvement; fine-tuning starts from the pre-training
// checkpoint and checkpoints every epoch.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use std::path::Path;

use anyhow::{ensure, Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{dataset::FeatureDataset, loader::SourceConfig, sampler::subsample};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    backend::{default_device, TrainBackend},
    model::AutoEncoderConfig,
    trainer::{self, PhaseReport},
};

// ─── Phase Configuration ─────────────────────────────────────────────────────
/// Optimiser and schedule settings for one training phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub epochs:       usize,
    pub lr:           f64,
    /// SGD momentum; 0 disables it
    pub momentum:     f64,
    /// Multiplier applied to lr after every `lr_step` epochs
    pub lr_decay:     f64,
    /// 0 keeps lr fixed for the whole phase
    pub lr_step:      usize,
    /// Log the running batch loss every N batches (0 = never)
    pub log_interval: usize,
}

impl PhaseConfig {
    pub fn pretrain_default() -> Self {
        Self {
            epochs:       300,
            lr:           0.01,
            momentum:     0.9,
            lr_decay:     0.1,
            lr_step:      100,
            log_interval: 100,
        }
    }

    pub fn finetune_default() -> Self {
        Self {
            epochs:       100,
            lr:           0.01,
            momentum:     0.9,
            lr_decay:     1.0,
            lr_step:      0,
            log_interval: 100,
        }
    }

    /// Learning rate for a 1-based epoch under the step schedule.
    pub fn lr_at(&self, epoch: usize) -> f64 {
        if self.lr_step == 0 {
            return self.lr;
        }
        let decays = (epoch.saturating_sub(1) / self.lr_step) as i32;
        self.lr * self.lr_decay.powi(decays)
    }

    pub fn validate(&self, phase: &str) -> Result<()> {
        ensure!(self.lr > 0.0 && self.lr.is_finite(), "{phase}: lr must be a positive number");
        ensure!((0.0..1.0).contains(&self.momentum), "{phase}: momentum must lie in [0, 1)");
        ensure!(self.lr_decay > 0.0, "{phase}: lr_decay must be positive");
        Ok(())
    }
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a run. Serialisable so it can be written next to the
// checkpoints and reloaded with --config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub source:          SourceConfig,
    /// Upper bound on samples drawn (uniformly, seeded) from the source
    pub max_samples:     Option<usize>,
    pub checkpoint_dir:  String,
    pub widths:          Vec<usize>,
    pub dropout:         f64,
    pub batch_size:      usize,
    pub seed:            u64,
    pub pretrain:        PhaseConfig,
    pub finetune:        PhaseConfig,
    pub kmeans_restarts: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            source:          SourceConfig::default(),
            max_samples:     None,
            checkpoint_dir:  "checkpoints".to_string(),
            widths:          vec![500, 500, 2000, 10],
            dropout:         0.2,
            batch_size:      256,
            seed:            42,
            pretrain:        PhaseConfig::pretrain_default(),
            finetune:        PhaseConfig::finetune_default(),
            kmeans_restarts: 10,
        }
    }
}

impl TrainConfig {
    /// Read a JSON config; missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config '{}'", path.display()))
    }

    pub fn model_config(&self, input_width: usize) -> AutoEncoderConfig {
        AutoEncoderConfig::new(input_width, self.widths.clone(), self.dropout)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be positive");
        ensure!(self.max_samples != Some(0), "max_samples must be positive when set");
        self.pretrain.validate("pretrain")?;
        self.finetune.validate("finetune")?;
        Ok(())
    }

    /// Load the configured source, subsample it and wrap it as a dataset.
    pub fn load_dataset(&self) -> Result<FeatureDataset> {
        let source  = self.source.build(self.seed);
        let samples = source
            .load()
            .with_context(|| format!("Failed to load '{}' samples", source.name()))?;
        let loaded  = samples.len();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let samples = subsample(samples, self.max_samples, &mut rng);
        tracing::info!("Loaded {} '{}' samples, using {}", loaded, source.name(), samples.len());

        Ok(FeatureDataset::new(samples)?)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Phase 1: fresh weights, checkpoint on improvement.
    pub fn pretrain(&self) -> Result<PhaseReport> {
        let (dataset, ckpt) = self.prepare()?;
        let report = trainer::pretrain::<TrainBackend>(&self.config, dataset, &ckpt, &default_device())?;
        tracing::info!("{}", report);
        Ok(report)
    }

    /// Phase 2: continue from the pre-training checkpoint.
    pub fn finetune(&self) -> Result<PhaseReport> {
        let (dataset, ckpt) = self.prepare()?;
        let report = trainer::finetune::<TrainBackend>(&self.config, dataset, &ckpt, &default_device())?;
        tracing::info!("{}", report);
        Ok(report)
    }

    fn prepare(&self) -> Result<(FeatureDataset, CheckpointManager)> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1-3: Load, subsample, wrap ──────────────────────────────────
        let dataset = cfg.load_dataset()?;
        // Topology errors surface here, before any checkpoint file is touched
        cfg.model_config(dataset.input_width()).validate()?;

        // ── Step 4: Save config next to the checkpoints ──────────────────────
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt.save_config(cfg)?;

        Ok((dataset, ckpt))
    }
}
