// ============================================================
// Layer 5 — Agreement Scorers
// ============================================================
// Two label-permutation-invariant metrics, both in [0, 1]:
//
//   NormalizedMutualInfo : I(U; V) / ((H(U) + H(V)) / 2)
//   ClusteringAccuracy   : max over one-to-one cluster→class
//                          mappings of the fraction of rows
//                          mapped to their true class
//
// Both start from the same contingency table
//   table[t][p] = #rows with true class t and predicted cluster p
// built over the distinct labels present, so arbitrary (sparse)
// integer labels are fine.
//
// Reference: Strehl & Ghosh (2002) Cluster Ensembles
//            Kuhn (1955) The Hungarian Method

use std::collections::BTreeMap;

use anyhow::{ensure, Result};

use crate::domain::traits::AgreementScorer;

struct Contingency {
    table: Vec<Vec<u64>>,
    rows:  Vec<u64>,
    cols:  Vec<u64>,
    total: u64,
}

fn dense_ids(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut ids = BTreeMap::new();
    let dense = labels
        .iter()
        .map(|l| {
            let next = ids.len();
            *ids.entry(*l).or_insert(next)
        })
        .collect();
    (dense, ids.len())
}

impl Contingency {
    fn build(truth: &[usize], predicted: &[usize]) -> Result<Self> {
        ensure!(!truth.is_empty(), "cannot score empty labelings");
        ensure!(
            truth.len() == predicted.len(),
            "labelings differ in length: {} true vs {} predicted",
            truth.len(),
            predicted.len()
        );

        let (t, kt) = dense_ids(truth);
        let (p, kp) = dense_ids(predicted);
        let mut table = vec![vec![0u64; kp]; kt];
        for (&a, &b) in t.iter().zip(&p) {
            table[a][b] += 1;
        }
        let rows = table.iter().map(|r| r.iter().sum()).collect();
        let cols = (0..kp).map(|j| table.iter().map(|r| r[j]).sum()).collect();
        Ok(Self { table, rows, cols, total: truth.len() as u64 })
    }
}

fn entropy(counts: &[u64], total: f64) -> f64 {
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.ln()
        })
        .sum()
}

// ─── NMI ──────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedMutualInfo;

impl AgreementScorer for NormalizedMutualInfo {
    fn name(&self) -> &str {
        "NMI"
    }

    fn score(&self, truth: &[usize], predicted: &[usize]) -> Result<f64> {
        let c = Contingency::build(truth, predicted)?;
        let n = c.total as f64;

        let h_true = entropy(&c.rows, n);
        let h_pred = entropy(&c.cols, n);
        if h_true == 0.0 && h_pred == 0.0 {
            // one cluster on both sides: identical partitions
            return Ok(1.0);
        }

        let mut mi = 0.0;
        for (i, row) in c.table.iter().enumerate() {
            for (j, &nij) in row.iter().enumerate() {
                if nij == 0 {
                    continue;
                }
                let nij = nij as f64;
                mi += nij / n * (n * nij / (c.rows[i] as f64 * c.cols[j] as f64)).ln();
            }
        }

        let nmi = mi / ((h_true + h_pred) / 2.0);
        Ok(nmi.clamp(0.0, 1.0))
    }
}

// ─── Clustering accuracy ──────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusteringAccuracy;

impl AgreementScorer for ClusteringAccuracy {
    fn name(&self) -> &str {
        "ACC"
    }

    fn score(&self, truth: &[usize], predicted: &[usize]) -> Result<f64> {
        let c = Contingency::build(truth, predicted)?;
        let size = c.rows.len().max(c.cols.len());

        // Square profit matrix [predicted][true], padded with zeros, turned
        // into a cost matrix for the minimising solver.
        let max = c.table.iter().flatten().copied().max().unwrap_or(0) as i64;
        let mut cost = vec![vec![max; size]; size];
        for (t, row) in c.table.iter().enumerate() {
            for (p, &count) in row.iter().enumerate() {
                cost[p][t] = max - count as i64;
            }
        }

        let assignment = hungarian(&cost);
        let matched: u64 = assignment
            .iter()
            .enumerate()
            .filter(|&(p, &t)| p < c.cols.len() && t < c.rows.len())
            .map(|(p, &t)| c.table[t][p])
            .sum();

        Ok(matched as f64 / c.total as f64)
    }
}

/// Minimum-cost perfect assignment on a square matrix (potentials variant,
/// O(n³)). Returns the column assigned to every row.
fn hungarian(cost: &[Vec<i64>]) -> Vec<usize> {
    let n   = cost.len();
    let inf = i64::MAX / 4;
    let mut u   = vec![0i64; n + 1];
    let mut v   = vec![0i64; n + 1];
    let mut p   = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0   = 0;
        let mut minv = vec![inf; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1    = 0;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j]  = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1    = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j]    -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0usize; n];
    for j in 1..=n {
        if p[j] != 0 {
            row_to_col[p[j] - 1] = j - 1;
        }
    }
    row_to_col
}
