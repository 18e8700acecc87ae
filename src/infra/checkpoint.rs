// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores autoencoder snapshots.
//
// What gets saved per checkpoint name:
//   1. <name>.mpk.gz  full-precision named MessagePack record
//                     of every learned parameter
//   2. <name>.json    CheckpointMeta: topology (input width,
//                     width schedule, dropout), epoch and loss
//
// Saving removes the old metadata, writes the weights, then
// writes the new metadata, so a .json file marks a complete
// snapshot. Loading checks the metadata topology before any
// weight is read, and the loaded weights' shapes before the
// receiving model is replaced.
//
// File layout:
//   checkpoints/
//     train_config.json     ← resolved TrainConfig of the run
//     pretrained.mpk.gz     ← best pre-training epoch
//     pretrained.json
//     finetuned.mpk.gz      ← latest fine-tuning epoch
//     finetuned.json
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::domain::error::{AutoEncoderError, CheckpointFailure, ModelResult};
use crate::ml::model::{AutoEncoder, AutoEncoderConfig};

/// Snapshot written at the end of pre-training epochs that improve the loss.
pub const PRETRAINED: &str = "pretrained";

/// Snapshot written at the end of every fine-tuning epoch.
pub const FINETUNED: &str = "finetuned";

type ModelRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Metadata stored beside the weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub model: AutoEncoderConfig,
    /// 1-based epoch the snapshot was taken after
    pub epoch: usize,
    /// Mean reconstruction loss of that epoch
    pub loss:  f64,
}

/// Saves and loads checkpoints inside one directory. The manager assumes it
/// is the only writer of that directory for the duration of a run.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist. A failure here
    /// resurfaces on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Weights path without extension; the recorder appends `.mpk.gz`.
    fn weights_stem(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// True when a complete snapshot with this name is on disk.
    pub fn exists(&self, name: &str) -> bool {
        self.meta_path(name).is_file()
    }

    /// Persist `model` under `name`, replacing any earlier snapshot.
    pub fn save<B: Backend>(
        &self,
        name:  &str,
        model: &AutoEncoder<B>,
        epoch: usize,
        loss:  f64,
    ) -> ModelResult<()> {
        let meta_path = self.meta_path(name);
        match fs::remove_file(&meta_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AutoEncoderError::checkpoint(
                    &meta_path,
                    CheckpointFailure::WriteFailed(e.to_string()),
                ));
            }
        }

        let stem = self.weights_stem(name);
        ModelRecorder::new()
            .record(model.clone().into_record(), stem.clone())
            .map_err(|e| {
                AutoEncoderError::checkpoint(&stem, CheckpointFailure::WriteFailed(format!("{e:?}")))
            })?;

        let meta = CheckpointMeta { model: model.config(), epoch, loss };
        let json = serde_json::to_string_pretty(&meta).map_err(|e| {
            AutoEncoderError::checkpoint(&meta_path, CheckpointFailure::WriteFailed(e.to_string()))
        })?;
        fs::write(&meta_path, json).map_err(|e| {
            AutoEncoderError::checkpoint(&meta_path, CheckpointFailure::WriteFailed(e.to_string()))
        })?;

        tracing::debug!("Saved checkpoint '{}' (epoch {}, loss {:.6})", name, epoch, loss);
        Ok(())
    }

    /// Read only the metadata of a snapshot.
    pub fn load_meta(&self, name: &str) -> ModelResult<CheckpointMeta> {
        let path = self.meta_path(name);
        if !path.is_file() {
            return Err(AutoEncoderError::checkpoint(&path, CheckpointFailure::Missing));
        }
        let json = fs::read_to_string(&path).map_err(|e| {
            AutoEncoderError::checkpoint(&path, CheckpointFailure::Unreadable(e.to_string()))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            AutoEncoderError::checkpoint(&path, CheckpointFailure::Unreadable(e.to_string()))
        })
    }

    /// Load the snapshot `name` into `model`.
    ///
    /// The stored topology is compared with the model's before any weight is
    /// read, and the shapes of the loaded weights before `model` is replaced.
    /// On every error path `model` is left exactly as it was.
    pub fn load_into<B: Backend>(
        &self,
        name:   &str,
        model:  &mut AutoEncoder<B>,
        device: &B::Device,
    ) -> ModelResult<CheckpointMeta> {
        let meta = self.load_meta(name)?;
        if let Some(reason) = meta.model.topology_mismatch(&model.config()) {
            return Err(AutoEncoderError::checkpoint(
                self.meta_path(name),
                CheckpointFailure::TopologyMismatch(reason),
            ));
        }

        let stem = self.weights_stem(name);
        let record = ModelRecorder::new()
            .load(stem.clone(), device)
            .map_err(|e| {
                AutoEncoderError::checkpoint(&stem, CheckpointFailure::Unreadable(format!("{e:?}")))
            })?;

        // Weights written without matching metadata
        let loaded = model.clone().load_record(record);
        if let Some(reason) = model.shape_mismatch(&loaded) {
            return Err(AutoEncoderError::checkpoint(
                &stem,
                CheckpointFailure::TopologyMismatch(format!("weights file: {reason}")),
            ));
        }

        *model = loaded;
        tracing::info!("Loaded checkpoint '{}' from epoch {} (loss {:.6})", name, meta.epoch, meta.loss);
        Ok(meta)
    }

    /// Rebuild the stored topology and load the snapshot into it.
    pub fn load_model<B: Backend>(
        &self,
        name:   &str,
        device: &B::Device,
    ) -> ModelResult<(AutoEncoder<B>, CheckpointMeta)> {
        let meta = self.load_meta(name)?;
        // Every parameter is overwritten by the record; the seed is irrelevant.
        let mut model = meta.model.init::<B, _>(&mut StdRng::seed_from_u64(0), device)?;
        let meta = self.load_into(name, &mut model, device)?;
        Ok((model, meta))
    }

    /// Save the resolved training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}
