// ============================================================
// Layer 4 — Seeded Subsampler
// ============================================================
// Draws a uniform random subset of at most `max` samples so a
// run can work on, say, 10k of MNIST's 60k images. The RNG is
// passed in, so the subset is reproducible for a fixed seed.
//
// Uses a Fisher-Yates shuffle via rand::seq::SliceRandom, then
// truncates. When no limit applies the order is left untouched.

use rand::{seq::SliceRandom, Rng};

/// Keep at most `max` randomly chosen samples.
pub fn subsample<T, R: Rng + ?Sized>(mut samples: Vec<T>, max: Option<usize>, rng: &mut R) -> Vec<T> {
    let total = samples.len();
    let limit = match max {
        Some(m) if m < total => m,
        _ => return samples,
    };

    samples.shuffle(rng);
    samples.truncate(limit);

    tracing::debug!("Subsampled {} of {} samples", limit, total);
    samples
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_limit_applied() {
        let mut rng = StdRng::seed_from_u64(0);
        let items: Vec<usize> = (0..100).collect();
        let kept = subsample(items, Some(20), &mut rng);
        assert_eq!(kept.len(), 20);
    }

    #[test]
    fn test_no_limit_keeps_order() {
        let mut rng = StdRng::seed_from_u64(0);
        let items: Vec<usize> = (0..10).collect();
        assert_eq!(subsample(items.clone(), None, &mut rng), items);
        assert_eq!(subsample(items.clone(), Some(50), &mut rng), items);
    }

    #[test]
    fn test_reproducible_for_seed() {
        let items: Vec<usize> = (0..500).collect();
        let a = subsample(items.clone(), Some(30), &mut StdRng::seed_from_u64(9));
        let b = subsample(items, Some(30), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_dataset() {
        let mut rng = StdRng::seed_from_u64(0);
        let kept = subsample(Vec::<usize>::new(), Some(5), &mut rng);
        assert!(kept.is_empty());
    }
}
