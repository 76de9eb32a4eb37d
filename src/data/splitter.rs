// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Splits the nominal training set into a training subset and a
// validation subset at a fixed index boundary.
//
// No shuffling: the validation subset is always the LAST
// `validation_len` samples, in their original order. For MNIST
// with the default size this means:
//
//   index:  0 ............ 53_999 | 54_000 ........ 59_999
//           └──── training ──────┘ └──── validation ────┘
//
// Reference: Rust Book §8 (Vectors)

use anyhow::{ensure, Result};

/// Split `samples` into (head, tail) where tail holds the last
/// `validation_len` samples.
///
/// Errors if `validation_len` exceeds the number of samples.
pub fn split_train_val<T>(mut samples: Vec<T>, validation_len: usize) -> Result<(Vec<T>, Vec<T>)> {
    let total = samples.len();
    ensure!(
        validation_len <= total,
        "validation split of {validation_len} samples exceeds the {total} available"
    );

    // split_off(n) removes elements [n..] and returns them
    let val = samples.split_off(total - validation_len);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        samples.len(),
        val.len(),
    );

    Ok((samples, val))
}
