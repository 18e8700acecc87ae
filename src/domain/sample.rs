// ============================================================
// Layer 3 — FeatureSample
// ============================================================
// One record from the dataset collaborator: a flattened,
// already-normalised feature vector and its ground-truth class.
// The label never reaches the autoencoder; it is only used to
// score the clustering afterwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSample {
    /// Flattened features, length = input_width
    pub features: Vec<f32>,

    /// Ground-truth class
    pub label: usize,
}

impl FeatureSample {
    pub fn new(features: Vec<f32>, label: usize) -> Self {
        Self { features, label }
    }

    pub fn width(&self) -> usize {
        self.features.len()
    }
}
