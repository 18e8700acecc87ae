// ============================================================
// Layer 6 — Result Table
// ============================================================
// One row per evaluated configuration, metric values on a
// 0-100 scale rounded to one decimal place:
//
//   Approach                          NMI     ACC
//   K-means on raw features          49.8    53.1
//   K-means on pre-trained embedding 72.4    80.9
//   ...
//
// Rendered as text for the terminal and serialised to
// results.json next to the checkpoints.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub approach: String,
    /// One value per metric column, already scaled and rounded
    pub values:   Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub metrics: Vec<String>,
    pub rows:    Vec<ResultRow>,
}

/// [0, 1] score → 0-100 with one decimal.
pub fn to_percent(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}

impl ResultTable {
    pub fn new(metrics: Vec<String>) -> Self {
        Self { metrics, rows: Vec::new() }
    }

    /// Append a row from raw [0, 1] scores.
    pub fn push(&mut self, approach: impl Into<String>, scores: &[f64]) {
        self.rows.push(ResultRow {
            approach: approach.into(),
            values:   scores.iter().map(|&s| to_percent(s)).collect(),
        });
    }

    pub fn render(&self) -> String {
        let name_width = self
            .rows
            .iter()
            .map(|r| r.approach.len())
            .chain(std::iter::once("Approach".len()))
            .max()
            .unwrap_or(8);
        let col_width = self.metrics.iter().map(|m| m.len()).max().unwrap_or(0).max(6);

        let mut out = format!("{:<name_width$}", "Approach");
        for m in &self.metrics {
            out.push_str(&format!("  {:>col_width$}", m));
        }
        out.push('\n');
        out.push_str(&"-".repeat(name_width + self.metrics.len() * (col_width + 2)));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format!("{:<name_width$}", row.approach));
            for v in &row.values {
                out.push_str(&format!("  {:>col_width$.1}", v));
            }
            out.push('\n');
        }
        out
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write results to '{}'", path.display()))
    }
}
