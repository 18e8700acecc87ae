// ============================================================
// Layer 4 — Synthetic Gaussian Blobs
// ============================================================
// Each class gets a centre drawn uniformly from [-5, 5]^width.
// Samples are assigned to classes round-robin and scattered
// around their centre with isotropic Gaussian noise of
// standard deviation `spread`. Same seed, same data.

use anyhow::{ensure, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::domain::{sample::FeatureSample, traits::FeatureSource};

pub struct GaussianBlobSource {
    samples: usize,
    classes: usize,
    width:   usize,
    spread:  f32,
    seed:    u64,
}

impl GaussianBlobSource {
    pub fn new(samples: usize, classes: usize, width: usize, spread: f32, seed: u64) -> Self {
        Self { samples, classes, width, spread, seed }
    }
}

impl FeatureSource for GaussianBlobSource {
    fn name(&self) -> &str {
        "blobs"
    }

    fn load(&self) -> Result<Vec<FeatureSample>> {
        ensure!(self.classes > 0, "blob source needs at least one class");
        ensure!(self.width > 0, "blob source needs a positive width");
        ensure!(self.spread.is_finite() && self.spread >= 0.0, "spread must be >= 0, got {}", self.spread);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let centres: Vec<Vec<f32>> = (0..self.classes)
            .map(|_| (0..self.width).map(|_| rng.gen_range(-5.0f32..5.0)).collect())
            .collect();

        let noise = Normal::new(0.0f32, self.spread)?;
        let samples = (0..self.samples)
            .map(|i| {
                let label = i % self.classes;
                let features = centres[label]
                    .iter()
                    .map(|&c| c + noise.sample(&mut rng))
                    .collect();
                FeatureSample::new(features, label)
            })
            .collect();

        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_data() {
        let a = GaussianBlobSource::new(30, 3, 5, 0.2, 11).load().unwrap();
        let b = GaussianBlobSource::new(30, 3, 5, 0.2, 11).load().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_labels_round_robin() {
        let s = GaussianBlobSource::new(7, 3, 2, 0.1, 1).load().unwrap();
        let labels: Vec<usize> = s.iter().map(|x| x.label).collect();
        assert_eq!(labels, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_zero_classes_rejected() {
        assert!(GaussianBlobSource::new(10, 0, 2, 0.1, 1).load().is_err());
    }
}
