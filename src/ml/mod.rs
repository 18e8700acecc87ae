// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model and training code lives here.
//
//   backend.rs  — NdArray (or Wgpu with the `wgpu` feature),
//                 wrapped in Autodiff for training
//
//   layers.rs   — LayerStack: one Linear per consecutive pair
//                 of widths, each independently initialised
//
//   model.rs    — Encoder, mirrored Decoder and AutoEncoder
//                 • input projection → stack → embedding
//                 • reversed stack → output projection
//                 • ReLU + dropout between hidden layers
//                 • MSE reconstruction loss
//
//   trainer.rs  — Pre-training and fine-tuning loops with
//                 SGD + momentum, step lr decay and the
//                 per-phase checkpoint policy
//
//   embedder.rs — Loads a checkpoint and embeds a dataset
//                 with dropout disabled
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Hinton & Salakhutdinov (2006) Reducing the
//            Dimensionality of Data with Neural Networks

/// Backend aliases and default device
pub mod backend;

/// Width-driven chain of affine transforms
pub mod layers;

/// Encoder / Decoder / AutoEncoder architecture
pub mod model;

/// Two-phase training loop with checkpointing
pub mod trainer;

/// Evaluation-mode embedding of a whole dataset
pub mod embedder;
