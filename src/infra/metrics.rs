// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one row per training epoch to a CSV file.
//
// Each phase gets its own file, truncated when the phase starts:
//   checkpoints/pretrain_metrics.csv
//   checkpoints/finetune_metrics.csv
//
// Example CSV output:
//   epoch,loss,lr,checkpointed
//   1,0.912345,0.010000,true
//   2,0.884310,0.010000,true
//   3,0.890002,0.010000,false
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// One row of metrics for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean reconstruction loss over the epoch's batches
    pub loss: f64,

    /// Learning rate the epoch was trained with
    pub lr: f64,

    /// Whether a checkpoint was written after this epoch
    pub checkpointed: bool,
}

impl EpochMetrics {
    pub fn new(epoch: usize, loss: f64, lr: f64, checkpointed: bool) -> Self {
        Self { epoch, loss, lr, checkpointed }
    }
}

/// Logs epoch metrics of one training phase to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create `<dir>/<phase>_metrics.csv`, replacing an older file, and
    /// write the header row.
    pub fn new(dir: impl AsRef<Path>, phase: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join(format!("{phase}_metrics.csv"));
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "epoch,loss,lr,checkpointed")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{},{:.6},{:.6},{}", m.epoch, m.loss, m.lr, m.checkpointed)?;
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
