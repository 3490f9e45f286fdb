// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams other layers program against:
//   - SequenceSource      ← SequenceLoader (FASTA / plain text)
//   - SequenceEncoder     ← KmerTokenizer
//   - PhenotypePredictor  ← Predictor, PredictUseCase

use anyhow::Result;

use crate::domain::{prediction::Prediction, record::SequenceRecord};

// ─── SequenceSource ───────────────────────────────────────────────────────────
/// Anything that can produce raw sequence records.
pub trait SequenceSource {
    fn load_all(&self) -> Result<Vec<SequenceRecord>>;
}

// ─── SequenceEncoder ──────────────────────────────────────────────────────────
/// Turns nucleotide strings into token ids drawn from a fixed vocabulary.
pub trait SequenceEncoder {
    /// Never empty; every id is `< vocab_size()`.
    fn encode(&self, sequence: &str) -> Vec<u32>;

    fn vocab_size(&self) -> usize;

    /// Id used to right-pad sequences to a fixed length.
    fn pad_id(&self) -> u32;
}

// ─── PhenotypePredictor ───────────────────────────────────────────────────────
/// Anything that can score a raw sequence.
pub trait PhenotypePredictor {
    fn predict(&self, sequence: &str) -> Result<Prediction>;
}
