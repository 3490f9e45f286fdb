// ============================================================
// Layer 4 — Sequence Preprocessor
// ============================================================
// Cleans raw sequence text before tokenisation.
//
// Raw sequences arrive with:
//   - Line wrapping from FASTA files or copy-pasting
//   - Underscore separators in sample files (ATCG_GGCA_...)
//   - Lowercase soft-masked regions
//   - IUPAC ambiguity codes (R, Y, K, ...) and stray symbols
//
// Cleaning steps (applied in order):
//   1. Drop whitespace and '_' separators
//   2. Uppercase
//   3. Map anything outside ATCGN to N
//
// Step 3 keeps the sequence length intact, so a corrupted base
// still occupies its position in the k-mer windows.

use crate::domain::sequence::sanitize;

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a raw sequence string into the ATCGN alphabet.
    pub fn clean(&self, raw: &str) -> String {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect();
        sanitize(&compact)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
