// ============================================================
// Layer 4 — K-mer Tokenizer
// ============================================================
// Turns nucleotide strings into integer tokens drawn from a
// bounded vocabulary of fixed-length substrings (k-mers).
//
// Vocabulary layout:
//   0 <PAD>  1 <UNK>  2 <START>  3 <END>  4 <MASK>
//   5.. the most frequent k-mers of the reference corpus,
//       descending frequency, ties broken by first occurrence,
//       capped at `max_kmers` entries.
//
// Two passes share one windowing primitive but use different
// strides:
//   - build:  stride = max(k / 2, 1)  (coarse sample of the corpus)
//   - encode: stride = 1              (every overlapping k-mer)
// The asymmetry is kept for compatibility with vocabularies
// built by earlier releases. Flagged for review in DESIGN.md.
//
// Example (k = 3):
//   "ACGTA" → windows ACG, CGT, GTA → [id(ACG), id(CGT), id(GTA)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::sequence::{reverse_complement, sanitize};
use crate::domain::traits::SequenceEncoder;
use crate::error::{GenomeError, Result};

pub const PAD_TOKEN:   &str = "<PAD>";
pub const UNK_TOKEN:   &str = "<UNK>";
pub const START_TOKEN: &str = "<START>";
pub const END_TOKEN:   &str = "<END>";
pub const MASK_TOKEN:  &str = "<MASK>";

/// Fixed special tokens, in id order.
pub const SPECIAL_TOKENS: [&str; 5] = [PAD_TOKEN, UNK_TOKEN, START_TOKEN, END_TOKEN, MASK_TOKEN];

pub const PAD_ID:   u32 = 0;
pub const UNK_ID:   u32 = 1;
pub const START_ID: u32 = 2;
pub const END_ID:   u32 = 3;
pub const MASK_ID:  u32 = 4;

/// Printed by `decode` for ids outside the vocabulary.
pub const UNKNOWN_MARKER: &str = "<UNK>";

pub const DEFAULT_K:         usize = 3;
pub const DEFAULT_MAX_KMERS: usize = 1000;

// ─── VocabConfig ──────────────────────────────────────────────────────────────
/// How a vocabulary is built. Persisted next to the vocabulary so
/// a reloaded tokenizer encodes exactly as the original did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabConfig {
    /// k-mer length, must be ≥ 1
    pub k: usize,

    /// Window stride for the vocabulary pass; `None` means max(k / 2, 1)
    pub stride: Option<usize>,

    /// Count the reverse complement of every window as a candidate too
    pub include_reverse_complement: bool,

    /// Upper bound on non-special entries
    pub max_kmers: usize,
}

impl VocabConfig {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            stride: None,
            include_reverse_complement: false,
            max_kmers: DEFAULT_MAX_KMERS,
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn with_reverse_complement(mut self, include: bool) -> Self {
        self.include_reverse_complement = include;
        self
    }

    pub fn with_max_kmers(mut self, max_kmers: usize) -> Self {
        self.max_kmers = max_kmers;
        self
    }

    /// Stride actually used by the vocabulary pass. For k = 1 the
    /// historical k / 2 would be 0, which cannot advance a window.
    pub fn build_stride(&self) -> usize {
        self.stride.unwrap_or((self.k / 2).max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(GenomeError::InvalidInput("k-mer length must be at least 1".into()));
        }
        if self.stride == Some(0) {
            return Err(GenomeError::InvalidInput("vocabulary stride must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for VocabConfig {
    fn default() -> Self {
        Self::new(DEFAULT_K)
    }
}

// ─── KmerTokenizer ────────────────────────────────────────────────────────────
/// Immutable once built; safe to share across threads.
#[derive(Debug, Clone)]
pub struct KmerTokenizer {
    config:      VocabConfig,
    id_to_token: Vec<String>,
    token_to_id: HashMap<String, u32>,
}

impl KmerTokenizer {
    /// Build a vocabulary from a reference corpus.
    ///
    /// Degenerate corpora (empty, shorter than k) are not an error;
    /// they just produce a vocabulary of the five special tokens.
    pub fn build(corpus: &str, config: VocabConfig) -> Result<Self> {
        Self::build_from_sequences([corpus], config)
    }

    /// Like [`build`](Self::build), but windows never span two
    /// sequences. Counts and first-seen order are shared across them.
    pub fn build_from_sequences<I, S>(sequences: I, config: VocabConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        config.validate()?;
        let stride = config.build_stride();

        // kmer → (count, first-seen order)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut order = 0usize;
        let mut observe = |kmer: String| {
            let entry = counts.entry(kmer).or_insert((0, order));
            entry.0 += 1;
            order += 1;
        };
        for sequence in sequences {
            let text = sanitize(sequence.as_ref());
            for kmer in kmer_windows(&text, config.k, stride) {
                if config.include_reverse_complement {
                    let rc = reverse_complement(kmer);
                    observe(kmer.to_string());
                    observe(rc);
                } else {
                    observe(kmer.to_string());
                }
            }
        }

        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

        let mut tokenizer = Self::with_specials(config);
        for (kmer, _) in ranked.into_iter().take(tokenizer.config.max_kmers) {
            tokenizer.push_token(kmer);
        }

        tracing::info!(
            "Built k-mer vocabulary: k={}, stride={}, {} tokens",
            tokenizer.config.k,
            stride,
            tokenizer.vocab_size(),
        );
        Ok(tokenizer)
    }

    /// Rebuild a tokenizer from a persisted vocabulary (id order).
    pub fn from_vocab(config: VocabConfig, vocab: Vec<String>) -> Result<Self> {
        config.validate()?;
        if vocab.len() < SPECIAL_TOKENS.len()
            || vocab.iter().zip(SPECIAL_TOKENS).any(|(t, s)| t != s)
        {
            return Err(GenomeError::InvalidInput(
                "vocabulary must start with <PAD>, <UNK>, <START>, <END>, <MASK>".into(),
            ));
        }

        let mut tokenizer = Self::with_specials(config);
        for token in vocab.into_iter().skip(SPECIAL_TOKENS.len()) {
            if token.len() != tokenizer.config.k {
                return Err(GenomeError::InvalidInput(format!(
                    "vocabulary entry '{token}' is not a {}-mer", tokenizer.config.k
                )));
            }
            if tokenizer.token_to_id.contains_key(&token) {
                return Err(GenomeError::InvalidInput(format!(
                    "vocabulary entry '{token}' appears twice"
                )));
            }
            tokenizer.push_token(token);
        }
        Ok(tokenizer)
    }

    fn with_specials(config: VocabConfig) -> Self {
        let mut tokenizer = Self {
            config,
            id_to_token: Vec::new(),
            token_to_id: HashMap::new(),
        };
        for special in SPECIAL_TOKENS {
            tokenizer.push_token(special.to_string());
        }
        tokenizer
    }

    fn push_token(&mut self, token: String) {
        if self.token_to_id.contains_key(&token) {
            return;
        }
        let id = self.id_to_token.len() as u32;
        self.token_to_id.insert(token.clone(), id);
        self.id_to_token.push(token);
    }

    /// Encode every overlapping k-mer (stride 1). Unknown k-mers map to
    /// `<UNK>`; a sequence shorter than k encodes to `[<PAD>]`.
    pub fn encode(&self, sequence: &str) -> Vec<u32> {
        let text = sanitize(sequence);
        let ids: Vec<u32> = kmer_windows(&text, self.config.k, 1)
            .map(|kmer| self.token_to_id.get(kmer).copied().unwrap_or(UNK_ID))
            .collect();
        if ids.is_empty() { vec![PAD_ID] } else { ids }
    }

    /// Concatenate the token strings for `ids`.
    ///
    /// Lossy and meant for debugging: adjacent k-mers overlap, so the
    /// output is NOT the original sequence.
    pub fn decode(&self, ids: &[u32]) -> String {
        ids.iter()
            .map(|&id| self.token(id).unwrap_or(UNKNOWN_MARKER))
            .collect()
    }

    pub fn token_id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    pub fn token(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(id as usize).map(String::as_str)
    }

    pub fn vocab(&self) -> &[String] {
        &self.id_to_token
    }

    pub fn vocab_size(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn k(&self) -> usize {
        self.config.k
    }

    pub fn config(&self) -> &VocabConfig {
        &self.config
    }
}

impl SequenceEncoder for KmerTokenizer {
    fn encode(&self, sequence: &str) -> Vec<u32> {
        KmerTokenizer::encode(self, sequence)
    }

    fn vocab_size(&self) -> usize {
        KmerTokenizer::vocab_size(self)
    }

    fn pad_id(&self) -> u32 {
        PAD_ID
    }
}

/// Every length-`k` window of an ASCII string, starting at 0 and
/// advancing by `stride`. Empty when the text is shorter than k.
fn kmer_windows(text: &str, k: usize, stride: usize) -> impl Iterator<Item = &str> {
    text.len()
        .checked_sub(k)
        .into_iter()
        .flat_map(move |last| (0..=last).step_by(stride))
        .map(move |start| &text[start..start + k])
}
