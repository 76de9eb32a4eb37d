// ============================================================
// Layer 6 — Training Metrics
// ============================================================
// Per-epoch metrics collected while fitting a model, and the
// history that holds them for one run.
//
// Metrics recorded per epoch:
//   - epoch:          the epoch number (1, 2, 3, ...)
//   - train_loss:     mean loss over training batches, L2 included
//   - train_accuracy: fraction of training images classified correctly
//   - val_loss:       mean cross-entropy on the validation split
//   - val_accuracy:   fraction of validation images classified correctly
//
// How to read the metrics:
//   - If val_loss rises while train_loss falls → overfitting (variance)
//   - If both accuracies plateau low            → underfitting (bias)

use serde::{Deserialize, Serialize};

/// One row of metrics for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:          usize,
    pub train_loss:     f64,
    pub train_accuracy: f64,
    pub val_loss:       f64,
    pub val_accuracy:   f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:          usize,
        train_loss:     f64,
        train_accuracy: f64,
        val_loss:       f64,
        val_accuracy:   f64,
    ) -> Self {
        Self { epoch, train_loss, train_accuracy, val_loss, val_accuracy }
    }

    /// Difference between training and validation accuracy
    pub fn generalization_gap(&self) -> f64 {
        self.train_accuracy - self.val_accuracy
    }

    /// Progress line in the familiar Keras layout
    pub fn progress_line(&self, total_epochs: usize) -> String {
        format!(
            "Epoch {}/{} - loss: {:.4} - accuracy: {:.4} - val_loss: {:.4} - val_accuracy: {:.4}",
            self.epoch,
            total_epochs,
            self.train_loss,
            self.train_accuracy,
            self.val_loss,
            self.val_accuracy,
        )
    }
}

/// Every epoch's metrics for one fit, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitHistory {
    epochs: Vec<EpochMetrics>,
}

impl FitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metrics: EpochMetrics) {
        self.epochs.push(metrics);
    }

    pub fn epochs(&self) -> &[EpochMetrics] {
        &self.epochs
    }

    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    /// Validation accuracy after the last epoch, if any epoch ran
    pub fn final_val_accuracy(&self) -> Option<f64> {
        self.last().map(|m| m.val_accuracy)
    }
}
