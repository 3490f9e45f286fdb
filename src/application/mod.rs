// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// user-facing goal each.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Corpus → vocabulary → initialised checkpoint bundle
pub mod scaffold_use_case;

// Checkpoint bundle → phenotype predictions
pub mod predict_use_case;

// Sequence composition statistics
pub mod stats_use_case;
