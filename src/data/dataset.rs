use std::sync::Arc;

use anyhow::{ensure, Result};
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::digit::FEATURE_COUNT;

/// One flattened, normalised image and its label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitItem {
    pub features: Vec<f32>,
    pub label:    u8,
}

/// A prepared split: a row-major feature matrix with `FEATURE_COUNT`
/// columns and one label per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigitSplit {
    features: Vec<f32>,
    labels:   Vec<u8>,
}

impl DigitSplit {
    /// Build a split from its parts. The feature matrix must hold
    /// exactly one `FEATURE_COUNT`-wide row per label.
    pub fn new(features: Vec<f32>, labels: Vec<u8>) -> Result<Self> {
        ensure!(
            features.len() == labels.len() * FEATURE_COUNT,
            "feature matrix has {} values, expected {FEATURE_COUNT} per label for {} labels",
            features.len(),
            labels.len(),
        );
        Ok(Self { features, labels })
    }

    pub fn rows(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(FEATURE_COUNT)?;
        self.features.get(start..start + FEATURE_COUNT)
    }

    pub fn label(&self, index: usize) -> Option<u8> {
        self.labels.get(index).copied()
    }
}

/// The three disjoint splits every experiment trains and evaluates on.
/// Splits are shared, so each run's data loaders do not copy them.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub train:      Arc<DigitSplit>,
    pub validation: Arc<DigitSplit>,
    pub test:       Arc<DigitSplit>,
}

impl PreparedData {
    pub fn new(train: DigitSplit, validation: DigitSplit, test: DigitSplit) -> Self {
        Self {
            train:      Arc::new(train),
            validation: Arc::new(validation),
            test:       Arc::new(test),
        }
    }
}

/// Burn dataset view over a shared split.
pub struct DigitDataset {
    split: Arc<DigitSplit>,
}

impl DigitDataset {
    pub fn new(split: Arc<DigitSplit>) -> Self { Self { split } }
}

impl Dataset<DigitItem> for DigitDataset {
    fn get(&self, index: usize) -> Option<DigitItem> {
        let features = self.split.row(index)?.to_vec();
        let label    = self.split.label(index)?;
        Some(DigitItem { features, label })
    }

    fn len(&self) -> usize {
        self.split.rows()
    }
}
