// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from a raw source all the way
// to tensor batches.
//
// The pipeline flows in this order:
//
//   MnistSource / GaussianBlobSource
//       │
//       ▼
//   Normalizer        → (x / scale - mean) / std
//       │
//       ▼
//   subsample         → seeded uniform subset (optional)
//       │
//       ▼
//   FeatureDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   FeatureBatcher    → stacks samples into [batch, width]
//       │
//       ▼
//   DataLoader        → feeds batches to training / embedding
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// MNIST source and the serialisable source description
pub mod loader;

/// Per-value standardisation
pub mod preprocessor;

/// Seeded Gaussian clusters
pub mod synthetic;

/// Implements Burn's Dataset trait for feature vectors
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded subsampling
pub mod sampler;
