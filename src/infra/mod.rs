// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by training and evaluation:
//
//   checkpoint.rs — Saving and loading model weights
//                   Full-precision named MessagePack records
//                   plus a JSON metadata file holding the
//                   topology, checked before any load. Also
//                   saves/loads TrainConfig as JSON.
//
//   metrics.rs    — Training metrics logging
//                   One CSV per phase with epoch, loss,
//                   learning rate and checkpoint flag.
//
//   report.rs     — The evaluation result table, printed
//                   and written to results.json.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Clustering result table
pub mod report;
