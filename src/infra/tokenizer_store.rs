// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Persists a k-mer vocabulary as tokenizer.json so inference
// encodes with exactly the vocabulary the model was built with.
//
// File layout (ids are array positions):
//   {
//     "config": { "k": 3, "stride": null,
//                 "include_reverse_complement": false,
//                 "max_kmers": 1000 },
//     "vocab":  ["<PAD>", "<UNK>", "<START>", "<END>", "<MASK>",
//                "ATG", "TGC", ...]
//   }

use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::data::tokenizer::{KmerTokenizer, VocabConfig};
use crate::error::{GenomeError, Result};

pub const TOKENIZER_FILE: &str = "tokenizer.json";

#[derive(Serialize, Deserialize)]
struct TokenizerFile {
    config: VocabConfig,
    vocab:  Vec<String>,
}

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    pub fn load(&self) -> Result<KmerTokenizer> {
        let path = self.path();
        if !path.exists() {
            return Err(GenomeError::MissingArtifact(format!(
                "tokenizer vocabulary '{}' not found",
                path.display()
            )));
        }

        let file: TokenizerFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
        KmerTokenizer::from_vocab(file.config, file.vocab)
            .map_err(|e| GenomeError::Parse(format!("'{}': {e}", path.display())))
    }

    pub fn save(&self, tokenizer: &KmerTokenizer) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let file = TokenizerFile {
            config: tokenizer.config().clone(),
            vocab:  tokenizer.vocab().to_vec(),
        };
        fs::write(self.path(), serde_json::to_string_pretty(&file)?)?;

        tracing::debug!(
            "Saved {} token vocabulary to '{}'",
            tokenizer.vocab_size(),
            self.path().display()
        );
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load_encodes_identically() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path());
        let original = KmerTokenizer::build(
            "ATGCGTATAGCGCATATTTAGC",
            VocabConfig::new(3).with_reverse_complement(true),
        )
        .unwrap();
        store.save(&original).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.vocab(), original.vocab());
        assert_eq!(loaded.config(), original.config());
        assert_eq!(loaded.encode("GCGCATNNA"), original.encode("GCGCATNNA"));
    }

    #[test]
    fn test_missing_file_is_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = TokenizerStore::new(dir.path().join("nowhere")).load().unwrap_err();
        assert_eq!(err.kind(), "missing_artifact");
    }

    #[test]
    fn test_corrupt_vocabulary_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(TOKENIZER_FILE),
            r#"{"config":{"k":3,"stride":null,"include_reverse_complement":false,"max_kmers":10},
                "vocab":["ATG"]}"#,
        )
        .unwrap();
        let err = TokenizerStore::new(dir.path()).load().unwrap_err();
        assert_eq!(err.kind(), "parse");
    }
}
