// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Three families of failure the core can raise:
//
//   Configuration : an invalid width schedule, input width or
//                   dropout rate. Raised before any parameter
//                   is allocated.
//   Checkpoint    : a missing snapshot, a snapshot whose stored
//                   topology disagrees with the receiving model,
//                   or a record that cannot be read or written.
//   Numeric       : a loss that stopped being a finite number.
//
// None of these are retried. The application layer wraps them
// with anyhow context and the run terminates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for the model, training and clustering layers.
pub type ModelResult<T> = std::result::Result<T, AutoEncoderError>;

#[derive(Debug, Error)]
pub enum AutoEncoderError {
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("checkpoint '{}': {failure}", path.display())]
    Checkpoint {
        path:    PathBuf,
        failure: CheckpointFailure,
    },

    #[error("non-finite loss ({loss}) in epoch {epoch}, batch {batch}")]
    Numeric {
        epoch: usize,
        batch: usize,
        loss:  f64,
    },
}

/// What went wrong with a checkpoint.
#[derive(Debug, Error, PartialEq)]
pub enum CheckpointFailure {
    #[error("not found (has the pre-training phase been run?)")]
    Missing,

    #[error("topology mismatch: {0}")]
    TopologyMismatch(String),

    #[error("unreadable: {0}")]
    Unreadable(String),

    #[error("write failed: {0}")]
    WriteFailed(String),
}

impl AutoEncoderError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration { reason: reason.into() }
    }

    pub fn checkpoint(path: impl Into<PathBuf>, failure: CheckpointFailure) -> Self {
        Self::Checkpoint { path: path.into(), failure }
    }

    #[cfg(test)]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    #[cfg(test)]
    pub fn is_checkpoint(&self) -> bool {
        matches!(self, Self::Checkpoint { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_message_names_path() {
        let err = AutoEncoderError::checkpoint(
            "ckpt/pretrained.json",
            CheckpointFailure::TopologyMismatch("input_width 784 != 100".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("ckpt/pretrained.json"));
        assert!(msg.contains("input_width 784 != 100"));
        assert!(err.is_checkpoint());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_numeric_message() {
        let err = AutoEncoderError::Numeric { epoch: 3, batch: 7, loss: f64::NAN };
        assert!(matches!(err, AutoEncoderError::Numeric { batch: 7, .. }));
        assert!(err.to_string().contains("epoch 3"));
    }
}
