// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Scores k-means on three representations of the same data:
//
//   1. raw feature vectors
//   2. embeddings from the pre-trained checkpoint
//   3. embeddings from the fine-tuned checkpoint
//
// Every row uses the same cluster count (number of distinct
// ground-truth labels), the same seeded partitioner and the
// same scorers, so the numbers are directly comparable.
// A missing checkpoint is a hard error, not a skipped row.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::train_use_case::TrainConfig;
use crate::cluster::{
    kmeans::KMeans,
    scores::{ClusteringAccuracy, NormalizedMutualInfo},
};
use crate::data::dataset::FeatureDataset;
use crate::domain::{
    matrix::FeatureMatrix,
    traits::{AgreementScorer, Partitioner},
};
use crate::infra::{
    checkpoint::{CheckpointManager, FINETUNED, PRETRAINED},
    report::ResultTable,
};
use crate::ml::{
    backend::{default_device, InnerBackend},
    embedder::Embedder,
};

/// What the partitioner is run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Raw,
    Checkpoint(&'static str),
}

impl Representation {
    pub fn label(self) -> String {
        match self {
            Representation::Raw => "K-means on raw features".to_string(),
            Representation::Checkpoint(PRETRAINED) => "K-means on pre-trained embedding".to_string(),
            Representation::Checkpoint(FINETUNED)  => "K-means on fine-tuned embedding".to_string(),
            Representation::Checkpoint(other) => format!("K-means on '{other}' embedding"),
        }
    }
}

/// Above this many rows without --max-samples the run is warned as slow.
pub const LARGE_SAMPLE_COUNT: usize = 20_000;

pub const REPRESENTATIONS: [Representation; 3] = [
    Representation::Raw,
    Representation::Checkpoint(PRETRAINED),
    Representation::Checkpoint(FINETUNED),
];

pub struct EvaluateUseCase {
    config:      TrainConfig,
    partitioner: Box<dyn Partitioner>,
    scorers:     Vec<Box<dyn AgreementScorer>>,
}

impl EvaluateUseCase {
    /// Seeded k-means with NMI and clustering accuracy.
    pub fn new(config: TrainConfig) -> Self {
        let partitioner = KMeans::new(config.seed).with_restarts(config.kmeans_restarts);
        Self::with_collaborators(
            config,
            Box::new(partitioner),
            vec![Box::new(NormalizedMutualInfo), Box::new(ClusteringAccuracy)],
        )
    }

    pub fn with_collaborators(
        config:      TrainConfig,
        partitioner: Box<dyn Partitioner>,
        scorers:     Vec<Box<dyn AgreementScorer>>,
    ) -> Self {
        Self { config, partitioner, scorers }
    }

    /// Load the configured dataset and score every representation.
    pub fn execute(&self) -> Result<ResultTable> {
        self.config.validate()?;
        let dataset = self.config.load_dataset()?;
        if let Some(warning) = self.size_warning(dataset.sample_count()) {
            tracing::warn!("{warning}");
        }
        let table   = self.evaluate(&dataset, &REPRESENTATIONS)?;

        println!("\n{}", table.render());
        let path = PathBuf::from(&self.config.checkpoint_dir).join("results.json");
        table.save_json(&path)?;
        tracing::info!("Results written to '{}'", path.display());
        Ok(table)
    }

    pub fn evaluate(&self, dataset: &FeatureDataset, representations: &[Representation]) -> Result<ResultTable> {
        let truth         = dataset.labels();
        let cluster_count = dataset.distinct_labels();
        tracing::info!(
            "Evaluating {} samples with {} clusters", dataset.sample_count(), cluster_count
        );

        let ckpt      = CheckpointManager::new(&self.config.checkpoint_dir);
        let mut table = ResultTable::new(self.scorers.iter().map(|s| s.name().to_string()).collect());

        for &repr in representations {
            let matrix = self
                .matrix_for(repr, dataset, &ckpt)
                .with_context(|| format!("Cannot build matrix for '{}'", repr.label()))?;
            let predicted = self.partitioner.partition(&matrix, cluster_count)?;

            let scores = self
                .scorers
                .iter()
                .map(|s| s.score(&truth, &predicted))
                .collect::<Result<Vec<f64>>>()?;
            tracing::info!("{}: {:?}", repr.label(), scores);
            table.push(repr.label(), &scores);
        }
        Ok(table)
    }

    fn size_warning(&self, sample_count: usize) -> Option<String> {
        (self.config.max_samples.is_none() && sample_count > LARGE_SAMPLE_COUNT).then(|| {
            format!(
                "k-means over {} samples with {} restarts will be slow; pass --max-samples to subsample",
                sample_count, self.config.kmeans_restarts
            )
        })
    }

    fn matrix_for(
        &self,
        repr:    Representation,
        dataset: &FeatureDataset,
        ckpt:    &CheckpointManager,
    ) -> Result<FeatureMatrix> {
        match repr {
            Representation::Raw => Ok(dataset.to_matrix()?),
            Representation::Checkpoint(name) => {
                let embedder = Embedder::<InnerBackend>::from_checkpoint(
                    ckpt, name, default_device(), self.config.batch_size,
                )?;
                embedder.embed_dataset(dataset)
            }
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use crate::data::loader::SourceConfig;
    use crate::domain::error::AutoEncoderError;
    use crate::ml::model::AutoEncoderConfig;

    fn config(dir: &std::path::Path) -> TrainConfig {
        TrainConfig {
            source:          SourceConfig::Blobs { samples: 60, classes: 3, width: 6, spread: 0.2 },
            checkpoint_dir:  dir.to_string_lossy().into_owned(),
            widths:          vec![5, 3],
            batch_size:      16,
            kmeans_restarts: 4,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_raw_row_on_separated_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let ds  = cfg.load_dataset().unwrap();
        let table = EvaluateUseCase::new(cfg).evaluate(&ds, &[Representation::Raw]).unwrap();
        assert_eq!(table.metrics, vec!["NMI".to_string(), "ACC".to_string()]);
        assert_eq!(table.rows.len(), 1);
        assert!(table.rows[0].values.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn test_three_rows_and_results_file() {
        let dir  = tempfile::tempdir().unwrap();
        let cfg  = config(dir.path());
        let ckpt = CheckpointManager::new(dir.path());
        let model = AutoEncoderConfig::new(6, vec![5, 3], 0.2)
            .init::<InnerBackend, _>(&mut StdRng::seed_from_u64(1), &default_device())
            .unwrap();
        ckpt.save(PRETRAINED, &model, 1, 0.5).unwrap();
        ckpt.save(FINETUNED, &model, 1, 0.4).unwrap();

        let table = EvaluateUseCase::new(cfg).execute().unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1].approach, "K-means on pre-trained embedding");
        // identical weights give identical rows
        assert_eq!(table.rows[1].values, table.rows[2].values);
        assert!(dir.path().join("results.json").is_file());
    }

    #[test]
    fn test_large_unsampled_input_is_warned() {
        let dir = tempfile::tempdir().unwrap();
        let use_case = EvaluateUseCase::new(config(dir.path()));
        assert!(use_case.size_warning(60).is_none());
        let warning = use_case.size_warning(60_000).unwrap();
        assert!(warning.contains("--max-samples"));

        let bounded = EvaluateUseCase::new(TrainConfig { max_samples: Some(60_000), ..config(dir.path()) });
        assert!(bounded.size_warning(60_000).is_none());
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let ds  = cfg.load_dataset().unwrap();
        let err = EvaluateUseCase::new(cfg)
            .evaluate(&ds, &[Representation::Checkpoint(FINETUNED)])
            .unwrap_err();
        assert!(err.chain().any(|e| e.downcast_ref::<AutoEncoderError>().is_some_and(|e| e.is_checkpoint())));
    }
}
