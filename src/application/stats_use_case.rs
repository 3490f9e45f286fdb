// ============================================================
// Layer 2 — StatsUseCase
// ============================================================
// Base composition for raw sequences or sequence files. No model
// involved: clean each sequence, then count.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::data::{loader::SequenceLoader, preprocessor::Preprocessor};
use crate::domain::{
    sequence::{composition, Composition},
    traits::SequenceSource,
};

#[derive(Debug, Clone, Serialize)]
pub struct RecordStats {
    pub id: String,
    #[serde(flatten)]
    pub composition: Composition,
}

#[derive(Default)]
pub struct StatsUseCase {
    preprocessor: Preprocessor,
}

impl StatsUseCase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sequence_stats(&self, sequence: &str) -> Composition {
        composition(&self.preprocessor.clean(sequence))
    }

    pub fn path_stats(&self, path: &Path) -> Result<Vec<RecordStats>> {
        Ok(SequenceLoader::new(path)
            .load_all()?
            .into_iter()
            .map(|record| RecordStats {
                composition: self.sequence_stats(&record.sequence),
                id:          record.id,
            })
            .collect())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sequence_stats_cleans_first() {
        let stats = StatsUseCase::new().sequence_stats("gc gc_at\nxN");
        assert_eq!(stats.length, 8);
        assert_eq!((stats.g, stats.c, stats.a, stats.t, stats.n), (2, 2, 1, 1, 2));
        assert!((stats.gc_content - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_path_stats_per_record() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("s.fa"), ">one\nGGGG\n>two\nATAT\n").unwrap();

        let stats = StatsUseCase::new().path_stats(dir.path()).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].id, "one");
        assert_eq!(stats[0].composition.gc_percent, 100.0);
        assert_eq!(stats[1].composition.at_percent, 100.0);
    }
}
