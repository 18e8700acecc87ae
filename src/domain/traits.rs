// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The pipeline talks to its collaborators only through these
// traits:
//
//   FeatureSource   : yields labelled, normalised vectors
//                     (MnistSource, GaussianBlobSource)
//   Partitioner     : matrix + cluster count → label per row
//                     (KMeans)
//   AgreementScorer : (truth, predicted) → score in [0, 1]
//                     (NormalizedMutualInfo, ClusteringAccuracy)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::{matrix::FeatureMatrix, sample::FeatureSample};

// ─── FeatureSource ────────────────────────────────────────────────────────────
/// Any component that can produce a finite set of labelled vectors
/// of uniform width.
pub trait FeatureSource {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Load every sample. Vectors must all have the same length.
    fn load(&self) -> Result<Vec<FeatureSample>>;
}

// ─── Partitioner ──────────────────────────────────────────────────────────────
/// Unsupervised clustering: assigns an integer cluster to every row.
/// Implementations must be deterministic for a fixed seed.
pub trait Partitioner {
    fn partition(&self, matrix: &FeatureMatrix, cluster_count: usize) -> Result<Vec<usize>>;
}

// ─── AgreementScorer ──────────────────────────────────────────────────────────
/// A normalised agreement metric between two labelings.
/// The score lies in [0, 1] and does not change when the clusters
/// of either labeling are renamed.
pub trait AgreementScorer {
    /// Column header for the result table.
    fn name(&self) -> &str;

    fn score(&self, truth: &[usize], predicted: &[usize]) -> Result<f64>;
}
