// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits: what a sequence, a phenotype
// mapping and a prediction ARE.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, enums, pure functions and traits

/// GC content, reverse complement, sanitisation, composition
pub mod sequence;

/// A raw sequence loaded from disk
pub mod record;

/// Phenotype id ↔ label mapping
pub mod phenotype;

/// Structured inference result
pub mod prediction;

/// Core abstractions that other layers implement
pub mod traits;
