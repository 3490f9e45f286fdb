// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Persistence for everything a trained model needs besides the
// code:
//
//   checkpoint.rs      — The checkpoint bundle
//                        config.json + tokenizer.json +
//                        phenotypes.json + model.mpk (burn
//                        CompactRecorder), with shape and
//                        cross-artifact checks on load.
//
//   tokenizer_store.rs — K-mer vocabulary persistence
//                        Builds a vocabulary from a corpus if
//                        none exists, or loads the saved one so
//                        inference uses the same ids.
//
// Reference: Burn Book §5 (Records and Checkpointing)

/// Checkpoint bundle saving and loading
pub mod checkpoint;

/// K-mer vocabulary saving and loading
pub mod tokenizer_store;
