// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the application layer:
//
//   tracking.rs — Run-tracking store
//                 Writes runs in MLflow's file-store layout
//                 (mlruns/<experiment>/<run>/...) so `mlflow ui`
//                 can browse them. Also an in-memory tracker
//                 for tests.
//
//   metrics.rs  — Per-epoch training metrics and the fit
//                 history of one run
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            MLflow FileStore layout

/// MLflow-compatible run tracking
pub mod tracking;

/// Epoch metrics and fit history
pub mod metrics;
