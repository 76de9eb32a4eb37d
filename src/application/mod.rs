// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to run the experiment series.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination and the French progress
//     messages that narrate it
//
// Reference: Clean Architecture pattern

// The four experiments and the runs each one performs
pub mod plan;

// The experiment driver
pub mod experiment_use_case;
