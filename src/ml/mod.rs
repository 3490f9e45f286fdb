// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All neural-network code lives here, generic over the burn
// Backend so the same model runs on NdArray (CPU, tests) and
// Wgpu (GPU).
//
//   attention.rs  — structure-aware and motif-aware causal
//                   attention, selected per block
//
//   heads.rs      — multi-task head: mean-pool, one linear
//                   projection per task
//
//   model.rs      — BiologicalGpt: token + position + helical
//                   embeddings, block stack, next-token logits,
//                   task outputs and losses
//
//   inferencer.rs — Predictor: the read-only inference context
//                   turning raw sequences into predictions
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need

/// Structure-aware and motif-aware attention
pub mod attention;

/// Per-task output projections
pub mod heads;

/// The biologically augmented transformer
pub mod model;

/// Inference context — loads a bundle and predicts phenotypes
pub mod inferencer;
