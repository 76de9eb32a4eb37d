// ============================================================
// Layer 4 — Digit Preprocessor
// ============================================================
// Turns the raw corpus into three model-ready splits.
//
// Steps (applied in order):
//   1. Split the nominal training set: the last
//      `validation_size` images become the validation set
//   2. Normalise each pixel intensity to [0, 1] (value / 255)
//   3. Flatten each 28×28 grid row-major into 784 features
//
// The test set only goes through steps 2 and 3.
//
// Reference: Rust Book §13 (Iterators)

use anyhow::{ensure, Result};

use crate::data::dataset::{DigitSplit, PreparedData};
use crate::data::splitter::split_train_val;
use crate::domain::digit::{RawCorpus, RawDigit, FEATURE_COUNT};

/// Number of training images held out for validation by default.
pub const DEFAULT_VALIDATION_SIZE: usize = 6_000;

const MAX_INTENSITY: f32 = 255.0;

pub struct Preprocessor {
    validation_size: usize,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDATION_SIZE)
    }
}

impl Preprocessor {
    pub fn new(validation_size: usize) -> Self {
        Self { validation_size }
    }

    /// Consume the raw corpus and return (train, validation, test) splits.
    pub fn prepare(&self, corpus: RawCorpus) -> Result<PreparedData> {
        ensure!(!corpus.is_empty(), "the digit corpus is empty");
        tracing::info!("Preparing {} labelled images", corpus.len());

        let RawCorpus { train, test } = corpus;

        let (train, validation) = split_train_val(train, self.validation_size)?;

        let prepared = PreparedData::new(
            self.to_split(&train)?,
            self.to_split(&validation)?,
            self.to_split(&test)?,
        );

        tracing::info!(
            "Prepared splits: {} train, {} validation, {} test",
            prepared.train.rows(),
            prepared.validation.rows(),
            prepared.test.rows(),
        );
        Ok(prepared)
    }

    /// Normalise and flatten one image.
    pub fn flatten(&self, digit: &RawDigit) -> Vec<f32> {
        digit
            .pixels
            .iter()
            .flat_map(|row| row.iter())
            .map(|&px| f32::from(px) / MAX_INTENSITY)
            .collect()
    }

    fn to_split(&self, digits: &[RawDigit]) -> Result<DigitSplit> {
        let mut features = Vec::with_capacity(digits.len() * FEATURE_COUNT);
        let mut labels   = Vec::with_capacity(digits.len());

        for digit in digits {
            features.extend(self.flatten(digit));
            labels.push(digit.label);
        }

        DigitSplit::new(features, labels)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::digit::IMAGE_SIDE;

    /// Corpus whose images encode their position in pixel (0, 0)
    /// so the split boundary can be checked.
    fn indexed_corpus(train: usize, test: usize) -> RawCorpus {
        let digit = |i: usize| {
            let mut d = RawDigit::filled(0, (i % 10) as u8);
            d.pixels[0][0] = (i % 256) as u8;
            d.pixels[IMAGE_SIDE - 1][IMAGE_SIDE - 1] = 255;
            d
        };
        RawCorpus::new(
            (0..train).map(digit).collect(),
            (0..test).map(digit).collect(),
        )
    }

    #[test]
    fn test_flatten_is_row_major_and_normalised() {
        let mut digit = RawDigit::filled(0, 4);
        digit.pixels[0][1] = 255;
        digit.pixels[1][0] = 51;

        let features = Preprocessor::default().flatten(&digit);

        assert_eq!(features.len(), FEATURE_COUNT);
        assert_eq!(features[1], 1.0);
        assert!((features[IMAGE_SIDE] - 0.2).abs() < 1e-6);
        assert_eq!(features[0], 0.0);
    }

    #[test]
    fn test_validation_is_last_rows_of_training_set() {
        let prepared = Preprocessor::new(6).prepare(indexed_corpus(20, 5)).unwrap();

        assert_eq!(prepared.train.rows(), 14);
        assert_eq!(prepared.validation.rows(), 6);
        assert_eq!(prepared.test.rows(), 5);

        // First feature holds index / 255
        let first_val = prepared.validation.row(0).unwrap()[0];
        assert!((first_val - 14.0 / 255.0).abs() < 1e-6);
        let last_train = prepared.train.row(13).unwrap()[0];
        assert!((last_train - 13.0 / 255.0).abs() < 1e-6);
        assert_eq!(prepared.validation.label(0), Some(4));
    }

    #[test]
    fn test_all_features_within_unit_interval() {
        let prepared = Preprocessor::new(2).prepare(indexed_corpus(10, 3)).unwrap();
        for split in [&prepared.train, &prepared.validation, &prepared.test] {
            for i in 0..split.rows() {
                let row = split.row(i).unwrap();
                assert_eq!(row.len(), FEATURE_COUNT);
                assert!(row.iter().all(|&v| (0.0..=1.0).contains(&v)));
            }
            assert!(split.row(split.rows()).is_none());
        }
    }

    #[test]
    fn test_empty_corpus_fails() {
        let err = Preprocessor::new(0).prepare(RawCorpus::default()).unwrap_err();
        assert!(err.to_string().contains("empty"), "{err}");
    }

    #[test]
    fn test_validation_larger_than_training_set_fails() {
        assert!(Preprocessor::new(11).prepare(indexed_corpus(10, 1)).is_err());
    }

    #[test]
    #[ignore = "allocates the full 70,000-image corpus"]
    fn test_full_size_corpus_split() {
        let prepared = Preprocessor::default()
            .prepare(indexed_corpus(60_000, 10_000))
            .unwrap();

        assert_eq!(prepared.train.rows() + prepared.validation.rows(), 60_000);
        assert_eq!(prepared.train.rows(), 54_000);
        assert_eq!(prepared.validation.rows(), 6_000);
        assert_eq!(prepared.test.rows(), 10_000);
        // Row 54_000 of the nominal training set opens the validation split
        assert_eq!(prepared.validation.label(0), Some(0));
    }
}
