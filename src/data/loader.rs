// ============================================================
// Layer 4 — Sequence Loader
// ============================================================
// Loads raw sequences from a single file or from every sequence
// file in a directory.
//
// Two formats are recognised by content, not by extension:
//   - FASTA: first non-blank character is '>'. Parsed with
//     rust-bio, one SequenceRecord per entry.
//   - Plain text: anything else. The whole file becomes one
//     record whose id is the file stem.
//
// Directory walks only pick up files with a sequence-like
// extension (fa, fasta, fna, txt, seq) and sort them by name so
// the corpus order is reproducible.

use anyhow::{Context, Result};
use bio::io::fasta;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::record::SequenceRecord;
use crate::domain::traits::SequenceSource;

const SEQUENCE_EXTENSIONS: [&str; 5] = ["fa", "fasta", "fna", "txt", "seq"];

pub struct SequenceLoader {
    /// A sequence file or a directory of them
    path: PathBuf,
}

impl SequenceLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn files(&self) -> Result<Vec<PathBuf>> {
        if self.path.is_file() {
            return Ok(vec![self.path.clone()]);
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.path)
            .with_context(|| format!("Cannot read directory '{}'", self.path.display()))?
        {
            let path = entry?.path();
            let is_sequence_file = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| SEQUENCE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && is_sequence_file {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl SequenceSource for SequenceLoader {
    fn load_all(&self) -> Result<Vec<SequenceRecord>> {
        if !self.path.exists() {
            tracing::warn!(
                "Sequence path '{}' does not exist — returning no records",
                self.path.display()
            );
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for file in self.files()? {
            let loaded = load_file(&file)?;
            tracing::debug!("Loaded {} record(s) from '{}'", loaded.len(), file.display());
            records.extend(loaded);
        }
        Ok(records)
    }
}

/// Read one file, dispatching on whether it looks like FASTA.
pub fn load_file(path: &Path) -> Result<Vec<SequenceRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read sequence file '{}'", path.display()))?;

    if content.trim_start().starts_with('>') {
        parse_fasta(&content)
            .with_context(|| format!("Malformed FASTA in '{}'", path.display()))
    } else {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sequence")
            .to_string();
        Ok(vec![SequenceRecord::new(id, content.trim())])
    }
}

/// Parse FASTA text into records.
pub fn parse_fasta(content: &str) -> Result<Vec<SequenceRecord>> {
    let reader = fasta::Reader::new(content.as_bytes());
    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut parsed = SequenceRecord::new(
            record.id(),
            String::from_utf8_lossy(record.seq()).into_owned(),
        );
        if let Some(desc) = record.desc() {
            parsed = parsed.with_description(desc);
        }
        records.push(parsed);
    }
    Ok(records)
}
