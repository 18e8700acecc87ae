// ============================================================
// Layer 5 — Embedder
// ============================================================
// Loads a checkpoint onto the inner (non-autodiff) backend and
// runs the encoder over a dataset in its original order.
//
// On a non-autodiff backend Dropout is the identity, so this is
// the evaluation-mode pass: the same checkpoint and the same
// dataset always give the same matrix.

use anyhow::{anyhow, ensure, Result};
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::data::{batcher::FeatureBatcher, dataset::FeatureDataset};
use crate::domain::{error::ModelResult, matrix::FeatureMatrix};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::AutoEncoder;

pub struct Embedder<B: Backend> {
    model:      AutoEncoder<B>,
    device:     B::Device,
    batch_size: usize,
}

impl<B: Backend> Embedder<B> {
    pub fn new(model: AutoEncoder<B>, device: B::Device, batch_size: usize) -> Self {
        Self { model, device, batch_size: batch_size.max(1) }
    }

    /// Rebuild the topology stored with checkpoint `name` and load its weights.
    pub fn from_checkpoint(
        ckpt:       &CheckpointManager,
        name:       &str,
        device:     B::Device,
        batch_size: usize,
    ) -> ModelResult<Self> {
        let (model, meta) = ckpt.load_model::<B>(name, &device)?;
        tracing::info!(
            "Embedder ready from '{}' (epoch {}, embedding width {})",
            name, meta.epoch, model.encoder().embedding_width()
        );
        Ok(Self::new(model, device, batch_size))
    }

    pub fn embedding_width(&self) -> usize {
        self.model.encoder().embedding_width()
    }

    /// Embed every sample, row i of the result belonging to sample i.
    pub fn embed_dataset(&self, dataset: &FeatureDataset) -> Result<FeatureMatrix> {
        let expected = self.model.encoder().input_width();
        ensure!(
            dataset.input_width() == expected,
            "dataset has {} features but the model expects {}",
            dataset.input_width(),
            expected
        );

        // No shuffle: batch order is dataset order
        let loader = DataLoaderBuilder::new(FeatureBatcher::<B>::new(self.device.clone()))
            .batch_size(self.batch_size)
            .build(dataset.clone());

        let width    = self.embedding_width();
        let mut data = Vec::with_capacity(dataset.sample_count() * width);
        for batch in loader.iter() {
            let z = self.model.embed(batch.features);
            let values = z
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("Cannot read embedding tensor: {e:?}"))?;
            data.extend(values);
        }

        let matrix = FeatureMatrix::new(dataset.sample_count(), width, data)?;
        tracing::debug!("Embedded {} samples into {} dimensions", matrix.rows(), matrix.cols());
        Ok(matrix)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use rand::{rngs::StdRng, SeedableRng};
    use crate::domain::sample::FeatureSample;
    use crate::infra::checkpoint::PRETRAINED;
    use crate::ml::model::AutoEncoderConfig;

    type B = NdArray;

    fn dataset(n: usize) -> FeatureDataset {
        FeatureDataset::new(
            (0..n)
                .map(|i| FeatureSample::new((0..5).map(|j| ((i * 5 + j) as f32 * 0.37).cos()).collect(), i % 3))
                .collect(),
        )
        .unwrap()
    }

    fn model() -> AutoEncoder<B> {
        AutoEncoderConfig::new(5, vec![4, 3], 0.5)
            .init::<B, _>(&mut StdRng::seed_from_u64(11), &Default::default())
            .unwrap()
    }

    #[test]
    fn test_rows_follow_dataset_order() {
        let ds       = dataset(7);
        let embedder = Embedder::new(model(), Default::default(), 3);
        let m        = embedder.embed_dataset(&ds).unwrap();
        assert_eq!((m.rows(), m.cols()), (7, 3));

        // Row 4 embedded on its own matches row 4 of the batched pass
        let single = FeatureDataset::new(vec![FeatureSample::new(
            (0..5).map(|j| ((4 * 5 + j) as f32 * 0.37).cos()).collect(),
            0,
        )])
        .unwrap();
        let alone = embedder.embed_dataset(&single).unwrap();
        for (a, b) in alone.row(0).iter().zip(m.row(4)) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_repeated_pass_is_identical() {
        let ds       = dataset(10);
        let embedder = Embedder::new(model(), Default::default(), 4);
        assert_eq!(embedder.embed_dataset(&ds).unwrap(), embedder.embed_dataset(&ds).unwrap());
    }

    #[test]
    fn test_from_checkpoint_and_width_check() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        ckpt.save(PRETRAINED, &model(), 1, 0.3).unwrap();

        let embedder = Embedder::<B>::from_checkpoint(&ckpt, PRETRAINED, Default::default(), 8).unwrap();
        assert_eq!(embedder.embedding_width(), 3);

        let wrong = FeatureDataset::new(vec![FeatureSample::new(vec![0.0; 4], 0)]).unwrap();
        assert!(embedder.embed_dataset(&wrong).is_err());
    }
}
