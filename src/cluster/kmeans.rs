// ============================================================
// Layer 5 — K-Means Partitioner
// ============================================================
// Lloyd's algorithm with k-means++ seeding.
//
//   1. Seed centroids with k-means++: the first uniformly, each
//      next one with probability proportional to the squared
//      distance to its nearest already-chosen centroid.
//   2. Assign every row to its nearest centroid.
//   3. Move each centroid to the mean of its rows. A centroid
//      that lost all of its rows jumps to the row that is
//      currently worst served by its own centroid.
//   4. Stop when the summed squared centroid shift falls below
//      tolerance * mean per-feature variance, or after max_iter.
//
// The whole procedure is restarted `restarts` times from one
// seeded StdRng and the lowest-inertia result wins, so the
// output is a pure function of (matrix, k, seed).
//
// Reference: Arthur & Vassilvitskii (2007) k-means++

use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::{
    error::AutoEncoderError,
    matrix::FeatureMatrix,
    traits::Partitioner,
};

#[derive(Debug, Clone)]
pub struct KMeans {
    seed:      u64,
    restarts:  usize,
    max_iter:  usize,
    tolerance: f64,
}

/// Outcome of one restart.
#[derive(Debug, Clone)]
struct Fit {
    labels:  Vec<usize>,
    inertia: f64,
    iters:   usize,
}

impl KMeans {
    pub fn new(seed: u64) -> Self {
        Self { seed, restarts: 10, max_iter: 300, tolerance: 1e-4 }
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    fn fit_once(&self, m: &FeatureMatrix, k: usize, tol: f64, rng: &mut StdRng) -> Fit {
        let n = m.rows();
        let d = m.cols();
        let mut centroids = seed_plus_plus(m, k, rng);
        let mut labels    = vec![0usize; n];
        let mut dists     = vec![0f64; n];
        let mut iters     = 0;

        for _ in 0..self.max_iter {
            iters += 1;
            assign(m, &centroids, &mut labels, &mut dists);

            // ── Update step ──────────────────────────────────────────────────
            let mut sums   = vec![0f64; k * d];
            let mut counts = vec![0usize; k];
            for i in 0..n {
                let c = labels[i];
                counts[c] += 1;
                for (s, &x) in sums[c * d..(c + 1) * d].iter_mut().zip(m.row(i)) {
                    *s += x as f64;
                }
            }

            let mut updated = vec![0f64; k * d];
            for c in 0..k {
                if counts[c] == 0 {
                    // Relocate to the worst-served row; zero its distance so a
                    // second empty cluster picks a different one.
                    let far = farthest(&dists);
                    for (u, &x) in updated[c * d..(c + 1) * d].iter_mut().zip(m.row(far)) {
                        *u = x as f64;
                    }
                    dists[far] = 0.0;
                    tracing::debug!("k-means: cluster {} emptied, re-seeded from row {}", c, far);
                    continue;
                }
                let inv = 1.0 / counts[c] as f64;
                for (u, s) in updated[c * d..(c + 1) * d].iter_mut().zip(&sums[c * d..(c + 1) * d]) {
                    *u = s * inv;
                }
            }

            let shift: f64 = centroids
                .iter()
                .zip(&updated)
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            centroids = updated;
            if shift <= tol {
                break;
            }
        }

        assign(m, &centroids, &mut labels, &mut dists);
        Fit { labels, inertia: dists.iter().sum(), iters }
    }
}

impl Partitioner for KMeans {
    fn partition(&self, matrix: &FeatureMatrix, cluster_count: usize) -> Result<Vec<usize>> {
        if cluster_count == 0 || cluster_count > matrix.rows() {
            return Err(AutoEncoderError::configuration(format!(
                "cannot form {} clusters from {} rows",
                cluster_count,
                matrix.rows()
            ))
            .into());
        }
        if !matrix.is_finite() {
            return Err(AutoEncoderError::configuration("matrix contains non-finite values").into());
        }

        let tol     = self.tolerance * mean_variance(matrix);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<Fit> = None;

        for run in 0..self.restarts {
            let fit = self.fit_once(matrix, cluster_count, tol, &mut rng);
            tracing::debug!(
                "k-means restart {}: inertia={:.4} after {} iterations",
                run + 1, fit.inertia, fit.iters
            );
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        // restarts >= 1, so `best` is always set here
        Ok(best.map(|f| f.labels).unwrap_or_default())
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn sq_dist(row: &[f32], centroid: &[f64]) -> f64 {
    row.iter()
        .zip(centroid)
        .map(|(&x, &c)| {
            let diff = x as f64 - c;
            diff * diff
        })
        .sum()
}

/// Nearest centroid for every row; fills `labels` and squared distances.
fn assign(m: &FeatureMatrix, centroids: &[f64], labels: &mut [usize], dists: &mut [f64]) {
    let d = m.cols();
    for i in 0..m.rows() {
        let row = m.row(i);
        let mut best   = 0;
        let mut best_d = f64::INFINITY;
        for (c, centroid) in centroids.chunks_exact(d).enumerate() {
            let dist = sq_dist(row, centroid);
            if dist < best_d {
                best_d = dist;
                best   = c;
            }
        }
        labels[i] = best;
        dists[i]  = best_d;
    }
}

fn farthest(dists: &[f64]) -> usize {
    dists
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |acc, (i, &d)| if d > acc.1 { (i, d) } else { acc })
        .0
}

fn seed_plus_plus(m: &FeatureMatrix, k: usize, rng: &mut StdRng) -> Vec<f64> {
    let n = m.rows();
    let mut centroids = Vec::with_capacity(k * m.cols());
    let first = rng.gen_range(0..n);
    centroids.extend(m.row(first).iter().map(|&x| x as f64));

    let mut nearest: Vec<f64> = (0..n)
        .map(|i| sq_dist(m.row(i), &centroids))
        .collect();

    for _ in 1..k {
        let total: f64 = nearest.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut pick   = n - 1;
            for (i, &w) in nearest.iter().enumerate() {
                if target < w {
                    pick = i;
                    break;
                }
                target -= w;
            }
            pick
        } else {
            // every row coincides with a chosen centroid
            rng.gen_range(0..n)
        };

        let start = centroids.len();
        centroids.extend(m.row(next).iter().map(|&x| x as f64));
        let newest = &centroids[start..];
        for (i, best) in nearest.iter_mut().enumerate() {
            *best = best.min(sq_dist(m.row(i), newest));
        }
    }
    centroids
}

/// Mean over features of each feature's variance.
fn mean_variance(m: &FeatureMatrix) -> f64 {
    let (n, d) = (m.rows() as f64, m.cols());
    if d == 0 {
        return 0.0;
    }
    let mut mean = vec![0f64; d];
    let mut sq   = vec![0f64; d];
    for i in 0..m.rows() {
        for (j, &x) in m.row(i).iter().enumerate() {
            mean[j] += x as f64;
            sq[j]   += (x as f64) * (x as f64);
        }
    }
    mean.iter()
        .zip(&sq)
        .map(|(s, q)| (q / n - (s / n) * (s / n)).max(0.0))
        .sum::<f64>()
        / d as f64
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand_distr::{Distribution, Normal};

    /// `per` points around each of `centres`, shuffled round-robin.
    fn blobs(centres: &[[f32; 2]], per: usize, seed: u64) -> (FeatureMatrix, Vec<usize>) {
        let mut rng   = StdRng::seed_from_u64(seed);
        let noise     = Normal::new(0.0f32, 0.3).unwrap();
        let mut rows  = Vec::new();
        let mut truth = Vec::new();
        for _ in 0..per {
            for (c, centre) in centres.iter().enumerate() {
                rows.push(vec![centre[0] + noise.sample(&mut rng), centre[1] + noise.sample(&mut rng)]);
                truth.push(c);
            }
        }
        (FeatureMatrix::from_rows(&rows).unwrap(), truth)
    }

    /// True when the two labelings induce the same partition.
    fn same_partition(a: &[usize], b: &[usize]) -> bool {
        let mut map = std::collections::HashMap::new();
        a.iter().zip(b).all(|(x, y)| *map.entry(*x).or_insert(*y) == *y)
            && map.values().collect::<std::collections::HashSet<_>>().len() == map.len()
    }

    #[test]
    fn test_recovers_separated_blobs() {
        let (m, truth) = blobs(&[[0.0, 0.0], [10.0, 10.0], [-10.0, 10.0]], 30, 1);
        let labels = KMeans::new(42).partition(&m, 3).unwrap();
        assert_eq!(labels.len(), truth.len());
        assert!(same_partition(&truth, &labels));
    }

    #[test]
    fn test_same_seed_same_labels() {
        let (m, _) = blobs(&[[0.0, 0.0], [3.0, 0.0], [0.0, 3.0], [3.0, 3.0]], 20, 5);
        let a = KMeans::new(9).with_restarts(3).partition(&m, 4).unwrap();
        let b = KMeans::new(9).with_restarts(3).partition(&m, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_k_equal_to_rows_uses_every_label() {
        let m = FeatureMatrix::from_rows(&[vec![0.0], vec![5.0], vec![9.0]]).unwrap();
        let mut labels = KMeans::new(0).partition(&m, 3).unwrap();
        labels.sort_unstable();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_rows_still_fill_every_cluster() {
        let m = FeatureMatrix::from_rows(&vec![vec![1.0, 1.0]; 6]).unwrap();
        let labels = KMeans::new(3).with_restarts(1).partition(&m, 2).unwrap();
        assert_eq!(labels.len(), 6);
        assert!(labels.iter().all(|&l| l < 2));
    }

    #[test]
    fn test_rejects_bad_cluster_count() {
        let m = FeatureMatrix::from_rows(&[vec![0.0], vec![1.0]]).unwrap();
        assert!(KMeans::new(0).partition(&m, 0).is_err());
        assert!(KMeans::new(0).partition(&m, 3).is_err());
    }

    #[test]
    fn test_rejects_non_finite_rows() {
        let m = FeatureMatrix::from_rows(&[vec![0.0], vec![f32::NAN]]).unwrap();
        assert!(KMeans::new(0).partition(&m, 1).is_err());
    }
}
