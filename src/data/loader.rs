// ============================================================
// Layer 4 — MNIST Loader
// ============================================================
// Fetches MNIST through Burn's vision dataset module.
//
// On first use Burn downloads the four IDX archives and caches
// them under the user's cache directory; later runs read the
// cache. Burn exposes pixels as f32 values in 0..=255, which we
// narrow back to the u8 grid the domain layer works with.
//
// Reference: burn-dataset `vision::MnistDataset`

use anyhow::Result;
use burn::data::dataset::{
    vision::{MnistDataset, MnistItem},
    Dataset,
};

use crate::domain::digit::{RawCorpus, RawDigit, IMAGE_SIDE};
use crate::domain::traits::DigitSource;

/// Supplies the standard 60,000 / 10,000 MNIST split.
#[derive(Debug, Default, Clone, Copy)]
pub struct MnistLoader;

impl MnistLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DigitSource for MnistLoader {
    fn load(&self) -> Result<RawCorpus> {
        tracing::info!("Loading MNIST (downloaded and cached on first use)");

        let train: Vec<RawDigit> = MnistDataset::train().iter().map(to_raw_digit).collect();
        let test:  Vec<RawDigit> = MnistDataset::test().iter().map(to_raw_digit).collect();

        tracing::info!("Loaded {} training and {} test images", train.len(), test.len());
        Ok(RawCorpus::new(train, test))
    }
}

/// Convert Burn's f32 pixel grid into the domain's u8 grid.
fn to_raw_digit(item: MnistItem) -> RawDigit {
    let mut pixels = [[0u8; IMAGE_SIDE]; IMAGE_SIDE];
    for (row, src) in pixels.iter_mut().zip(item.image.iter()) {
        for (px, &value) in row.iter_mut().zip(src.iter()) {
            *px = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    RawDigit::new(pixels, item.label)
}
