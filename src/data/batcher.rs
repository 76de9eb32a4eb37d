// ============================================================
// Layer 4 — Digit Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks a Vec<DigitItem> into
//   images  [batch_size, 784]   float
//   targets [batch_size]        int
//
// Every item already has exactly 784 features, so batching is
// a flatten followed by a reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::DigitItem;
use crate::domain::digit::FEATURE_COUNT;

#[derive(Debug, Clone)]
pub struct DigitBatch<B: Backend> {
    /// Normalised pixels — shape: [batch_size, 784]
    pub images: Tensor<B, 2>,

    /// Ground truth digits — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors land on the right CPU/GPU.
#[derive(Clone, Debug)]
pub struct DigitBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> DigitBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<DigitItem, DigitBatch<B>> for DigitBatcher<B> {
    fn batch(&self, items: Vec<DigitItem>) -> DigitBatch<B> {
        let batch_size = items.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|item| item.features.iter().copied())
            .collect();

        let labels: Vec<i64> = items
            .iter()
            .map(|item| i64::from(item.label))
            .collect();

        let images = Tensor::<B, 2>::from_data(
            TensorData::new(pixels, [batch_size, FEATURE_COUNT]),
            &self.device,
        );

        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]),
            &self.device,
        );

        DigitBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_labels() {
        let device  = Default::default();
        let batcher = DigitBatcher::<NdArray>::new(device);

        let items = vec![
            DigitItem { features: vec![0.5; FEATURE_COUNT], label: 7 },
            DigitItem { features: vec![0.0; FEATURE_COUNT], label: 2 },
            DigitItem { features: vec![1.0; FEATURE_COUNT], label: 0 },
        ];
        let batch = batcher.batch(items);

        assert_eq!(batch.images.dims(), [3, FEATURE_COUNT]);
        assert_eq!(batch.targets.dims(), [3]);

        let labels: Vec<i64> = batch.targets.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(labels, vec![7, 2, 0]);
    }
}
