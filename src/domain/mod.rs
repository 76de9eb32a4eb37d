// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the system
// works with: raw digit images and tracked experiment runs.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Raw labelled images as delivered by a dataset provider
pub mod digit;

// Run records kept by a tracking store
pub mod run;

// Core abstractions (traits) that other layers implement
pub mod traits;
