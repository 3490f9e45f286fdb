// ============================================================
// Layer 3 — Sequence Record Domain Type
// ============================================================
// One nucleotide sequence loaded from disk: a FASTA entry, or
// the whole content of a plain-text sequence file.
// Plain data, no behaviour beyond construction.

use serde::{Deserialize, Serialize};

/// A raw sequence as read from its source, before cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceRecord {
    /// FASTA identifier, or the file stem for plain-text files
    pub id: String,

    /// Free text after the identifier on a FASTA header line
    pub description: Option<String>,

    /// The sequence exactly as stored (case and separators preserved)
    pub sequence: String,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            id:          id.into(),
            description: None,
            sequence:    sequence.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
