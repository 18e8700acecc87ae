// ============================================================
// Layer 4 — Feature Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks a Vec<FeatureSample>
// into one [batch_size, input_width] float tensor.
//
// All samples share input_width (checked when the dataset is
// built), so the flat buffer reshapes without padding:
//   [s1_f1 .. s1_fW, s2_f1 .. sN_fW] → [N, W]
//
// Labels are left behind: reconstruction training is
// unsupervised and the evaluation pass reads labels straight
// from the dataset in order.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::sample::FeatureSample;

/// A batch of flattened feature vectors.
#[derive(Debug, Clone)]
pub struct FeatureBatch<B: Backend> {
    /// shape: [batch_size, input_width]
    pub features: Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct FeatureBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> FeatureBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<FeatureSample, FeatureBatch<B>> for FeatureBatcher<B> {
    fn batch(&self, items: Vec<FeatureSample>) -> FeatureBatch<B> {
        let batch_size = items.len();
        let width      = items.first().map(|s| s.width()).unwrap_or(0);

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let features = Tensor::<B, 2>::from_data(
            TensorData::new(flat, [batch_size, width]),
            &self.device,
        );

        FeatureBatch { features }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shape_and_values() {
        let device  = Default::default();
        let batcher = FeatureBatcher::<NdArray>::new(device);
        let batch   = batcher.batch(vec![
            FeatureSample::new(vec![1.0, 2.0, 3.0], 0),
            FeatureSample::new(vec![4.0, 5.0, 6.0], 1),
        ]);
        assert_eq!(batch.features.dims(), [2, 3]);
        let values = batch.features.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
