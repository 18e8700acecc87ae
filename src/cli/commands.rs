// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and their shared flags:
//
//   pretrain  — phase 1 from fresh weights
//   finetune  — phase 2 from the pre-training checkpoint
//   evaluate  — clustering comparison table
//   run       — all three in sequence
//
// Every flag is optional and overrides the base config, which
// is either TrainConfig::default() or the JSON file given with
// --config. The defaults shown in --help are those of the
// built-in config.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::TrainConfig;
use crate::data::loader::{MnistSplit, SourceConfig};

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pre-train the autoencoder from fresh weights
    Pretrain(TrainArgs),

    /// Fine-tune from the pre-training checkpoint
    Finetune(TrainArgs),

    /// Compare k-means on raw features and on both embeddings
    ///
    /// K-means is slow on all of MNIST; bound it with --max-samples
    Evaluate(TrainArgs),

    /// Pre-train, fine-tune, then evaluate
    Run(TrainArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Burn's vision MNIST, flattened to 784 values
    Mnist,
    /// Seeded synthetic Gaussian clusters
    Blobs,
}

/// Arguments shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// JSON TrainConfig to start from instead of the built-in defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    // ── Data ──────────────────────────────────────────────────────────────────
    /// Where samples come from [default: mnist]
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// MNIST split: train, test or all [default: train]
    #[arg(long)]
    pub mnist_split: Option<MnistSplit>,

    /// Number of synthetic samples [default: 1000]
    #[arg(long)]
    pub blob_samples: Option<usize>,

    /// Number of synthetic clusters [default: 10]
    #[arg(long)]
    pub blob_classes: Option<usize>,

    /// Width of each synthetic vector [default: 32]
    #[arg(long)]
    pub blob_width: Option<usize>,

    /// Standard deviation around each synthetic centre [default: 1.0]
    #[arg(long)]
    pub blob_spread: Option<f32>,

    /// Use at most this many samples, drawn with the run's seed.
    /// Keeps evaluate fast on MNIST, e.g. --max-samples 10000
    #[arg(long)]
    pub max_samples: Option<usize>,

    /// Directory for checkpoints, metrics and results [default: checkpoints]
    #[arg(long)]
    pub checkpoint_dir: Option<String>,

    // ── Model ─────────────────────────────────────────────────────────────────
    /// Encoder widths, comma separated; the last one is the embedding size
    /// [default: 500,500,2000,10]
    #[arg(long, value_delimiter = ',')]
    pub widths: Option<Vec<usize>>,

    /// Dropout probability in [0, 1) [default: 0.2]
    #[arg(long)]
    pub dropout: Option<f64>,

    // ── Training ──────────────────────────────────────────────────────────────
    /// Samples per batch [default: 256]
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Seed for initialisation, shuffling, dropout, subsampling and k-means
    /// [default: 42]
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pre-training epochs [default: 300]
    #[arg(long)]
    pub pretrain_epochs: Option<usize>,

    /// Pre-training learning rate [default: 0.01]
    #[arg(long)]
    pub pretrain_lr: Option<f64>,

    /// Fine-tuning epochs [default: 100]
    #[arg(long)]
    pub finetune_epochs: Option<usize>,

    /// Fine-tuning learning rate [default: 0.01]
    #[arg(long)]
    pub finetune_lr: Option<f64>,

    /// Pre-training lr multiplier applied every --lr-step epochs [default: 0.1]
    #[arg(long)]
    pub lr_decay: Option<f64>,

    /// Pre-training epochs between lr decays, 0 to disable [default: 100]
    #[arg(long)]
    pub lr_step: Option<usize>,

    /// SGD momentum for both phases [default: 0.9]
    #[arg(long)]
    pub momentum: Option<f64>,

    /// Log the running loss every N batches [default: 100]
    #[arg(long)]
    pub log_interval: Option<usize>,

    // ── Evaluation ────────────────────────────────────────────────────────────
    /// K-means restarts; the lowest-inertia run wins [default: 10]
    #[arg(long)]
    pub kmeans_restarts: Option<usize>,
}

impl TrainArgs {
    /// Resolve the base config and apply every flag that was given.
    pub fn into_config(self) -> Result<TrainConfig> {
        let mut cfg = match &self.config {
            Some(path) => TrainConfig::from_file(path)?,
            None       => TrainConfig::default(),
        };
        self.apply(&mut cfg);
        Ok(cfg)
    }

    fn apply(self, cfg: &mut TrainConfig) {
        match self.source {
            Some(SourceKind::Mnist) => {
                cfg.source = SourceConfig::Mnist { split: self.mnist_split.unwrap_or(MnistSplit::Train) };
            }
            Some(SourceKind::Blobs) => {
                cfg.source = SourceConfig::Blobs {
                    samples: self.blob_samples.unwrap_or(1000),
                    classes: self.blob_classes.unwrap_or(10),
                    width:   self.blob_width.unwrap_or(32),
                    spread:  self.blob_spread.unwrap_or(1.0),
                };
            }
            None => {
                if let (Some(split), SourceConfig::Mnist { .. }) = (self.mnist_split, &cfg.source) {
                    cfg.source = SourceConfig::Mnist { split };
                }
            }
        }

        if self.max_samples.is_some() {
            cfg.max_samples = self.max_samples;
        }
        if let Some(v) = self.checkpoint_dir  { cfg.checkpoint_dir  = v; }
        if let Some(v) = self.widths          { cfg.widths          = v; }
        if let Some(v) = self.dropout         { cfg.dropout         = v; }
        if let Some(v) = self.batch_size      { cfg.batch_size      = v; }
        if let Some(v) = self.seed            { cfg.seed            = v; }
        if let Some(v) = self.pretrain_epochs { cfg.pretrain.epochs = v; }
        if let Some(v) = self.pretrain_lr     { cfg.pretrain.lr     = v; }
        if let Some(v) = self.finetune_epochs { cfg.finetune.epochs = v; }
        if let Some(v) = self.finetune_lr     { cfg.finetune.lr     = v; }
        if let Some(v) = self.lr_decay        { cfg.pretrain.lr_decay = v; }
        if let Some(v) = self.lr_step         { cfg.pretrain.lr_step  = v; }
        if let Some(v) = self.momentum {
            cfg.pretrain.momentum = v;
            cfg.finetune.momentum = v;
        }
        if let Some(v) = self.log_interval {
            cfg.pretrain.log_interval = v;
            cfg.finetune.log_interval = v;
        }
        if let Some(v) = self.kmeans_restarts { cfg.kmeans_restarts = v; }
    }
}
