// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a raw sequence file and a model-ready
// tensor batch:
//
//   FASTA / text files
//       │
//       ▼
//   SequenceLoader    → reads files, yields SequenceRecords
//       │
//       ▼
//   Preprocessor      → strips separators, maps to ATCGN
//       │
//       ▼
//   KmerTokenizer     → overlapping k-mers → token ids
//       │
//       ▼
//   SequenceBatcher   → fixed-length [batch, max_len] Int tensor
//
// Each module is responsible for exactly one step.

/// Loads FASTA and plain-text sequence files
pub mod loader;

/// Cleans raw sequence text
pub mod preprocessor;

/// K-mer vocabulary construction, encode and decode
pub mod tokenizer;

/// Fixed-length token batches for the model
pub mod batcher;
