// ============================================================
// Layer 4 — Feature Normaliser
// ============================================================
// Maps raw pixel intensities to standardised features:
//
//   x' = (x / scale - mean) / std
//
// MNIST pixels arrive as 0..=255. The MNIST preset divides by
// 255 and standardises with the dataset-wide mean and standard
// deviation (0.1307, 0.3081).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    pub scale: f32,
    pub mean:  f32,
    pub std:   f32,
}

impl Normalizer {
    /// Per-pixel standardisation used for MNIST.
    pub const MNIST: Normalizer = Normalizer { scale: 255.0, mean: 0.1307, std: 0.3081 };

    pub fn apply(&self, x: f32) -> f32 {
        (x / self.scale - self.mean) / self.std
    }

    /// Normalise a feature vector in place.
    pub fn normalize(&self, values: &mut [f32]) {
        for v in values.iter_mut() {
            *v = self.apply(*v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_applies_to_every_value() {
        let n = Normalizer::MNIST;
        let mut v = vec![0.0, 127.0, 255.0];
        n.normalize(&mut v);
        assert_eq!(v, vec![n.apply(0.0), n.apply(127.0), n.apply(255.0)]);
    }

    #[test]
    fn test_mnist_preset() {
        let n = Normalizer::MNIST;
        assert!((n.apply(0.0) - (-0.1307 / 0.3081)).abs() < 1e-6);
        assert!((n.apply(255.0) - ((1.0 - 0.1307) / 0.3081)).abs() < 1e-5);
    }
}
