// ============================================================
// Layer 4 — Feature Dataset
// ============================================================
// Fixed-width labelled samples in their original order,
// exposed to Burn's DataLoader through the Dataset trait and
// to the clustering code as a FeatureMatrix.

use std::{collections::BTreeSet, sync::Arc};

use burn::data::dataset::Dataset;

use crate::domain::{
    error::{AutoEncoderError, ModelResult},
    matrix::FeatureMatrix,
    sample::FeatureSample,
};

/// In-memory dataset of fixed-width feature vectors.
///
/// Samples sit behind an `Arc` so the same data can feed the training
/// loader, the embedding pass and the raw-feature baseline without copies.
#[derive(Debug, Clone)]
pub struct FeatureDataset {
    samples:     Arc<Vec<FeatureSample>>,
    input_width: usize,
}

impl FeatureDataset {
    pub fn new(samples: Vec<FeatureSample>) -> ModelResult<Self> {
        let input_width = match samples.first() {
            Some(s) => s.width(),
            None => return Err(AutoEncoderError::configuration("dataset is empty")),
        };
        if input_width == 0 {
            return Err(AutoEncoderError::configuration("samples have zero features"));
        }
        if let Some(i) = samples.iter().position(|s| s.width() != input_width) {
            return Err(AutoEncoderError::configuration(format!(
                "sample {} has {} features, expected {}",
                i, samples[i].width(), input_width
            )));
        }
        Ok(Self { samples: Arc::new(samples), input_width })
    }

    pub fn input_width(&self) -> usize { self.input_width }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    /// Ground-truth labels in dataset order.
    pub fn labels(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.label).collect()
    }

    /// Number of distinct ground-truth classes; this is the cluster
    /// count every evaluated configuration is scored with.
    pub fn distinct_labels(&self) -> usize {
        self.samples.iter().map(|s| s.label).collect::<BTreeSet<_>>().len()
    }

    /// Raw features as an [N, input_width] matrix.
    pub fn to_matrix(&self) -> ModelResult<FeatureMatrix> {
        let data = self.samples.iter().flat_map(|s| s.features.iter().copied()).collect();
        FeatureMatrix::new(self.samples.len(), self.input_width, data)
    }
}

impl Dataset<FeatureSample> for FeatureDataset {
    fn get(&self, index: usize) -> Option<FeatureSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(v: &[f32], label: usize) -> FeatureSample {
        FeatureSample::new(v.to_vec(), label)
    }

    #[test]
    fn test_labels_and_width() {
        let ds = FeatureDataset::new(vec![
            sample(&[0.0, 1.0, 2.0], 3),
            sample(&[1.0, 1.0, 1.0], 3),
            sample(&[2.0, 0.0, 0.5], 7),
        ]).unwrap();
        assert_eq!(ds.input_width(), 3);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.labels(), vec![3, 3, 7]);
        assert_eq!(ds.distinct_labels(), 2);
        assert_eq!(ds.get(2).unwrap().label, 7);
        assert!(ds.get(3).is_none());
    }

    #[test]
    fn test_matrix_keeps_order() {
        let ds = FeatureDataset::new(vec![sample(&[1.0, 2.0], 0), sample(&[3.0, 4.0], 1)]).unwrap();
        let m = ds.to_matrix().unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 2));
        assert_eq!(m.row(0), &[1.0, 2.0]);
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_rejects_ragged_and_empty() {
        assert!(FeatureDataset::new(vec![]).unwrap_err().is_configuration());
        let err = FeatureDataset::new(vec![sample(&[1.0, 2.0], 0), sample(&[3.0], 1)]).unwrap_err();
        assert!(err.is_configuration());
    }
}
