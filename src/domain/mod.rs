// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that describe the problem:
// what a sample is, what a width schedule is, what can go
// wrong, and the seams the pipeline talks to.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, enums and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Typed error taxonomy shared by the model and training layers
pub mod error;

// Validated list of layer widths
pub mod schedule;

// One labelled feature vector
pub mod sample;

// Dense row-major matrix handed to the partitioner
pub mod matrix;

// Dataset, partitioner and scorer seams
pub mod traits;
