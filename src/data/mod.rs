// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw MNIST download to tensor batches.
//
//   MnistLoader       → RawCorpus (u8 grids + labels)
//       │
//       ▼
//   Preprocessor      → normalise to [0, 1], flatten to 784
//       │               features, split train / validation
//       ▼
//   DigitDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   DigitBatcher      → stacks items into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads MNIST through Burn's vision datasets
pub mod loader;

/// Normalises, flattens, and splits the raw corpus
pub mod preprocessor;

/// Burn Dataset over a prepared split
pub mod dataset;

/// Burn Batcher producing image/label tensors
pub mod batcher;

/// Fixed-boundary train/validation split
pub mod splitter;
