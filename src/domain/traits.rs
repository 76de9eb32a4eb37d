// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only talks to these traits, so the
// MNIST download and the MLflow file store can be replaced by
// in-memory versions in tests.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::digit::RawCorpus;
use crate::domain::run::RunStatus;

// ─── DigitSource ──────────────────────────────────────────────────────────────
/// Any component that can supply the fixed, pre-split digit corpus.
///
/// Implementations:
///   - MnistLoader → Burn's cached MNIST download
pub trait DigitSource {
    /// Load the nominal training set and the test set.
    fn load(&self) -> Result<RawCorpus>;
}

// ─── RunTracker ───────────────────────────────────────────────────────────────
/// An experiment-tracking store that records named runs.
///
/// Implementations:
///   - MlflowFileStore → MLflow's on-disk `mlruns/` layout
///   - InMemoryTracker → test double
pub trait RunTracker {
    /// Open a new run and return its id.
    fn start_run(&mut self, run_name: &str) -> Result<String>;

    /// Record one configuration choice for an open run.
    fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()>;

    /// Record one scalar result for an open run.
    fn log_metric(&mut self, run_id: &str, key: &str, value: f64) -> Result<()>;

    /// Store a small text artifact (e.g. a JSON config) with an open run.
    fn log_text(&mut self, run_id: &str, file_name: &str, text: &str) -> Result<()>;

    /// Close a run. The run must not be written to afterwards.
    fn end_run(&mut self, run_id: &str, status: RunStatus) -> Result<()>;
}
