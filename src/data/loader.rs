// ============================================================
// Layer 4 — Feature Sources
// ============================================================
// Produces labelled feature vectors from one of two sources:
//
//   MnistSource        : Burn's vision MNIST (downloaded and
//                        cached on first use), each 28x28 image
//                        flattened to 784 values and normalised.
//   GaussianBlobSource : seeded synthetic clusters, see
//                        synthetic.rs. No download needed.
//
// SourceConfig is the serialisable description stored in
// TrainConfig; build() turns it into a FeatureSource.
//
// Reference: Burn Book §4 (Datasets)

use std::str::FromStr;

use anyhow::Result;
use burn::data::dataset::{vision::MnistDataset, Dataset};
use serde::{Deserialize, Serialize};

use crate::data::{preprocessor::Normalizer, synthetic::GaussianBlobSource};
use crate::domain::{sample::FeatureSample, traits::FeatureSource};

/// Which part of MNIST to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MnistSplit {
    Train,
    Test,
    /// train followed by test (70k images)
    All,
}

impl FromStr for MnistSplit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Self::Train),
            "test"  => Ok(Self::Test),
            "all"   => Ok(Self::All),
            other   => Err(format!("unknown MNIST split '{other}' (train, test, all)")),
        }
    }
}

/// Serialisable description of where samples come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Mnist {
        split: MnistSplit,
    },
    Blobs {
        samples: usize,
        classes: usize,
        width:   usize,
        spread:  f32,
    },
}

impl SourceConfig {
    pub fn build(&self, seed: u64) -> Box<dyn FeatureSource> {
        match *self {
            SourceConfig::Mnist { split } => Box::new(MnistSource::new(split)),
            SourceConfig::Blobs { samples, classes, width, spread } => {
                Box::new(GaussianBlobSource::new(samples, classes, width, spread, seed))
            }
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Mnist { split: MnistSplit::Train }
    }
}

/// MNIST digits as 784-wide normalised vectors.
pub struct MnistSource {
    split:      MnistSplit,
    normalizer: Normalizer,
}

impl MnistSource {
    pub fn new(split: MnistSplit) -> Self {
        Self { split, normalizer: Normalizer::MNIST }
    }
}

impl FeatureSource for MnistSource {
    fn name(&self) -> &str {
        "mnist"
    }

    fn load(&self) -> Result<Vec<FeatureSample>> {
        let parts = match self.split {
            MnistSplit::Train => vec![MnistDataset::train()],
            MnistSplit::Test  => vec![MnistDataset::test()],
            MnistSplit::All   => vec![MnistDataset::train(), MnistDataset::test()],
        };

        let mut samples = Vec::new();
        for part in parts {
            samples.reserve(part.len());
            for item in part.iter() {
                let mut features: Vec<f32> = item
                    .image
                    .iter()
                    .flat_map(|row| row.iter().copied())
                    .collect();
                self.normalizer.normalize(&mut features);
                samples.push(FeatureSample::new(features, item.label as usize));
            }
        }

        tracing::info!("Loaded {} MNIST images ({:?} split)", samples.len(), self.split);
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_parsing() {
        assert_eq!("train".parse::<MnistSplit>().unwrap(), MnistSplit::Train);
        assert_eq!("ALL".parse::<MnistSplit>().unwrap(), MnistSplit::All);
        assert!("val".parse::<MnistSplit>().is_err());
    }

    #[test]
    fn test_source_config_json() {
        let cfg = SourceConfig::Blobs { samples: 90, classes: 3, width: 8, spread: 0.5 };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"kind\":\"blobs\""));
        let back: SourceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_build_blobs() {
        let cfg = SourceConfig::Blobs { samples: 12, classes: 3, width: 4, spread: 0.1 };
        let source = cfg.build(7);
        assert_eq!(source.name(), "blobs");
        let samples = source.load().unwrap();
        assert_eq!(samples.len(), 12);
        assert!(samples.iter().all(|s| s.width() == 4));
    }
}
