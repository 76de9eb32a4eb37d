// ============================================================
// Layer 3 — Digit Domain Types
// ============================================================
// A handwritten digit is a square grid of unsigned byte
// intensities (0 = background, 255 = full ink) plus its label.
//
// The grid side and the derived feature length are fixed for
// MNIST and shared by the data and ML layers.

use serde::{Deserialize, Serialize};

/// Side length of one square digit image, in pixels.
pub const IMAGE_SIDE: usize = 28;

/// Length of a flattened image: one feature per pixel.
pub const FEATURE_COUNT: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Number of digit classes (0 through 9).
pub const CLASS_COUNT: usize = 10;

/// One labelled image exactly as the dataset provider returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDigit {
    /// Row-major pixel grid, `pixels[row][col]`
    pub pixels: [[u8; IMAGE_SIDE]; IMAGE_SIDE],

    /// Ground-truth digit in `0..=9`
    pub label: u8,
}

impl RawDigit {
    pub fn new(pixels: [[u8; IMAGE_SIDE]; IMAGE_SIDE], label: u8) -> Self {
        Self { pixels, label }
    }

    /// An image with every pixel set to `value`. Handy for synthetic corpora.
    pub fn filled(value: u8, label: u8) -> Self {
        Self::new([[value; IMAGE_SIDE]; IMAGE_SIDE], label)
    }
}

/// The full pre-split corpus: a nominal training set and a held-out test set.
#[derive(Debug, Clone, Default)]
pub struct RawCorpus {
    pub train: Vec<RawDigit>,
    pub test:  Vec<RawDigit>,
}

impl RawCorpus {
    pub fn new(train: Vec<RawDigit>, test: Vec<RawDigit>) -> Self {
        Self { train, test }
    }

    /// Total number of labelled images across both sets
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count_matches_grid() {
        assert_eq!(FEATURE_COUNT, 784);
    }

    #[test]
    fn test_corpus_len_counts_both_sets() {
        let corpus = RawCorpus::new(
            vec![RawDigit::filled(0, 1); 3],
            vec![RawDigit::filled(0, 2); 2],
        );
        assert_eq!(corpus.len(), 5);
        assert!(!corpus.is_empty());
        assert!(RawCorpus::default().is_empty());
    }
}
