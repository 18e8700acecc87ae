// ============================================================
// Layer 3 — FeatureMatrix
// ============================================================
// Dense row-major [rows, cols] matrix of f32. This is what the
// partitioner consumes: either the raw feature vectors or the
// embeddings produced by the encoder.

use crate::domain::error::{AutoEncoderError, ModelResult};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> ModelResult<Self> {
        if data.len() != rows * cols {
            return Err(AutoEncoderError::configuration(format!(
                "matrix buffer has {} values, expected {} x {} = {}",
                data.len(), rows, cols, rows * cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Stack equal-length rows.
    #[cfg(test)]
    pub fn from_rows(rows: &[Vec<f32>]) -> ModelResult<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(i) = rows.iter().position(|r| r.len() != cols) {
            return Err(AutoEncoderError::configuration(format!(
                "row {} has width {}, expected {}", i, rows[i].len(), cols
            )));
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Ok(Self { rows: rows.len(), cols, data })
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn cols(&self) -> usize { self.cols }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}
