#![recursion_limit = "256"]
//! Phenotype prediction from raw DNA sequences.
//!
//! A k-mer tokenizer feeds a transformer whose blocks alternate
//! between structure-aware attention (a learned bias per position
//! pair) and motif-aware attention (a convolutional content prior),
//! topped by a next-token head and per-task prediction heads.
//!
//! Layers, outermost first:
//! - [`application`] — use cases: scaffold a bundle, predict, stats
//! - [`domain`]      — burn-free types and sequence utilities
//! - [`data`]        — loading, cleaning, tokenizing, batching
//! - [`ml`]          — burn modules and the `Predictor`
//! - [`infra`]       — checkpoint and vocabulary persistence
//! - [`error`]       — the core error taxonomy

pub mod application;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;
pub mod ml;

pub use error::{GenomeError, Result};
