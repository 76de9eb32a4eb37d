// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-specific modelling code lives here.
//
//   model.rs     — ClassifierConfig (the model factory) and the
//                  Classifier module: 784 → Dense 512 (ReLU)
//                  → [BatchNorm] → [Dropout 0.2] → Dense 10
//
//   optimizer.rs — The optimizer choices compared by the
//                  experiments, with their hyperparameters
//
//   trainer.rs   — Fit loop with per-epoch validation, and test
//                  evaluation
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Feed-forward digit classifier and its configuration
pub mod model;

/// Optimizer selection
pub mod optimizer;

/// Training and evaluation loops
pub mod trainer;
