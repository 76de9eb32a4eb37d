// ============================================================
// Layer 3 — Tracked Run Types
// ============================================================
// A run is one named entry in the tracking store. It carries
// the configuration choices of a training run (params) and the
// scalar results it produced (metrics).
//
// Lifecycle:
//   start_run  → status Running
//   log_*      → params / metrics accumulate
//   end_run    → status Finished or Failed, no further writes
//
// Status codes follow MLflow's RunStatus enum so the file
// store can write them verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metric key for accuracy on the held-out test split.
pub const TEST_ACCURACY: &str = "test_accuracy";

/// Metric key for validation accuracy after the last epoch.
pub const FINAL_VAL_ACCURACY: &str = "final_val_accuracy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

impl RunStatus {
    /// MLflow's integer encoding (RUNNING=1, FINISHED=3, FAILED=4)
    pub fn code(self) -> u8 {
        match self {
            RunStatus::Running  => 1,
            RunStatus::Finished => 3,
            RunStatus::Failed   => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

/// The configuration choices recorded for every run.
///
/// Values are rendered the way the tracking UI shows them:
/// booleans as `True` / `False`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParams {
    /// `none` or `L2+Dropout`
    pub regularization: String,

    /// Whether a batch normalization layer follows the hidden layer
    pub batch_norm: bool,

    /// Optimizer label as it should appear in the store
    pub optimizer: String,
}

impl RunParams {
    pub fn new(
        regularization: impl Into<String>,
        batch_norm:     bool,
        optimizer:      impl Into<String>,
    ) -> Self {
        Self {
            regularization: regularization.into(),
            batch_norm,
            optimizer:      optimizer.into(),
        }
    }

    /// Key/value pairs in a stable order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let batch_norm = if self.batch_norm { "True" } else { "False" };
        vec![
            ("regularization", self.regularization.clone()),
            ("batch_norm",     batch_norm.to_string()),
            ("optimizer",      self.optimizer.clone()),
        ]
    }
}

/// Snapshot of one run as held by a tracking store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id:    String,
    pub run_name:  String,
    pub params:    BTreeMap<String, String>,
    pub metrics:   BTreeMap<String, f64>,
    /// Text artifacts by file name
    pub artifacts: BTreeMap<String, String>,
    pub status:    RunStatus,
}

impl RunRecord {
    pub fn new(run_id: impl Into<String>, run_name: impl Into<String>) -> Self {
        Self {
            run_id:    run_id.into(),
            run_name:  run_name.into(),
            params:    BTreeMap::new(),
            metrics:   BTreeMap::new(),
            artifacts: BTreeMap::new(),
            status:    RunStatus::Running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_match_mlflow() {
        assert_eq!(RunStatus::Running.code(), 1);
        assert_eq!(RunStatus::Finished.code(), 3);
        assert_eq!(RunStatus::Failed.code(), 4);
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
    }

    #[test]
    fn test_params_render_booleans_like_python() {
        let params = RunParams::new("L2+Dropout", true, "adam");
        let pairs  = params.pairs();
        assert_eq!(pairs[0], ("regularization", "L2+Dropout".to_string()));
        assert_eq!(pairs[1], ("batch_norm", "True".to_string()));
        assert_eq!(pairs[2], ("optimizer", "adam".to_string()));

        let off = RunParams::new("none", false, "adam");
        assert_eq!(off.pairs()[1].1, "False");
    }

    #[test]
    fn test_new_record_is_running_and_empty() {
        let record = RunRecord::new("abc", "Regularized_Model");
        assert_eq!(record.status, RunStatus::Running);
        assert!(record.params.is_empty());
        assert!(record.metrics.is_empty());
    }
}
