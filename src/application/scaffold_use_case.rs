// ============================================================
// Layer 2 — ScaffoldUseCase
// ============================================================
// Produces a complete, loadable checkpoint bundle from a
// sequence corpus:
//
//   Step 1: Load sequence files        (Layer 4 - data)
//   Step 2: Clean every sequence       (Layer 4 - data)
//   Step 3: Build k-mer vocabulary     (Layer 4 - data)
//   Step 4: Map phenotype labels       (Layer 3 - domain)
//   Step 5: Derive model config        (Layer 5 - ml)
//   Step 6: Initialise parameters      (Layer 5 - ml)
//   Step 7: Write the bundle           (Layer 6 - infra)
//
// Parameters are freshly initialised, not trained; the bundle is
// the format a trained model is served from.

use anyhow::{bail, Context, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::{
    loader::SequenceLoader,
    preprocessor::Preprocessor,
    tokenizer::{KmerTokenizer, VocabConfig, DEFAULT_K, DEFAULT_MAX_KMERS},
};
use crate::domain::{phenotype::PhenotypeMap, traits::SequenceSource};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{BiologicalGptConfig, GC_CONTENT_TASK, PHENOTYPE_TASK, SEQUENCE_LENGTH_TASK};

// ─── Scaffold Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    pub corpus_path:                String,
    pub checkpoint_dir:             String,
    /// Labels in class-id order
    pub phenotypes:                 Vec<String>,
    pub k:                          usize,
    pub include_reverse_complement: bool,
    pub max_kmers:                  usize,
    pub dim:                        usize,
    pub depth:                      usize,
    pub heads:                      usize,
    pub max_len:                    usize,
    pub dropout:                    f64,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            corpus_path:                "data/sequences".to_string(),
            checkpoint_dir:             "checkpoints".to_string(),
            phenotypes:                 vec!["HEALTHY".to_string(), "SICKLECELLAEMIA".to_string()],
            k:                          DEFAULT_K,
            include_reverse_complement: false,
            max_kmers:                  DEFAULT_MAX_KMERS,
            dim:                        256,
            depth:                      6,
            heads:                      8,
            max_len:                    1024,
            dropout:                    0.1,
        }
    }
}

/// What was written, for the CLI to report.
#[derive(Debug, Clone, Serialize)]
pub struct ScaffoldSummary {
    pub checkpoint_dir: String,
    pub records:        usize,
    pub corpus_bases:   usize,
    pub vocab_size:     usize,
    pub tasks:          BTreeMap<String, usize>,
}

pub struct ScaffoldUseCase {
    config: ScaffoldConfig,
}

impl ScaffoldUseCase {
    pub fn new(config: ScaffoldConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: Backend>(&self, device: &B::Device) -> Result<ScaffoldSummary> {
        let cfg = &self.config;

        // ── Step 1 + 2: Load and clean the corpus ────────────────────────────
        tracing::info!("Loading sequences from '{}'", cfg.corpus_path);
        let records = SequenceLoader::new(&cfg.corpus_path).load_all()?;
        if records.is_empty() {
            bail!("No sequences found in '{}'", cfg.corpus_path);
        }
        let preprocessor = Preprocessor::new();
        let sequences: Vec<String> = records.iter().map(|r| preprocessor.clean(&r.sequence)).collect();
        let corpus_bases: usize = sequences.iter().map(String::len).sum();
        tracing::info!("Loaded {} records, {} bases", records.len(), corpus_bases);

        // ── Step 3: Vocabulary ───────────────────────────────────────────────
        let vocab_config = VocabConfig::new(cfg.k)
            .with_reverse_complement(cfg.include_reverse_complement)
            .with_max_kmers(cfg.max_kmers);
        let tokenizer = KmerTokenizer::build_from_sequences(&sequences, vocab_config)
            .context("Cannot build k-mer vocabulary")?;

        // ── Step 4: Phenotype labels ─────────────────────────────────────────
        let phenotypes = PhenotypeMap::from_names(cfg.phenotypes.iter().cloned())
            .context("Invalid phenotype list")?;

        // ── Step 5 + 6: Model ────────────────────────────────────────────────
        let model_config = self.model_config(tokenizer.vocab_size(), phenotypes.len());
        let model = model_config
            .init::<B>(device)
            .context("Invalid model configuration")?;

        // ── Step 7: Bundle ───────────────────────────────────────────────────
        CheckpointManager::new(&cfg.checkpoint_dir)
            .save_bundle(&model, &tokenizer, &phenotypes, &model_config)
            .with_context(|| format!("Cannot write checkpoint to '{}'", cfg.checkpoint_dir))?;

        Ok(ScaffoldSummary {
            checkpoint_dir: cfg.checkpoint_dir.clone(),
            records:        records.len(),
            corpus_bases,
            vocab_size:     tokenizer.vocab_size(),
            tasks:          model_config.tasks,
        })
    }

    /// Phenotype head only when there are at least two labels to
    /// choose between; the regression heads are always present.
    fn model_config(&self, vocab_size: usize, phenotype_count: usize) -> BiologicalGptConfig {
        let cfg = &self.config;
        let mut tasks = BTreeMap::new();
        if phenotype_count > 1 {
            tasks.insert(PHENOTYPE_TASK.to_string(), phenotype_count);
        }
        tasks.insert(GC_CONTENT_TASK.to_string(), 1);
        tasks.insert(SEQUENCE_LENGTH_TASK.to_string(), 1);

        BiologicalGptConfig::new(vocab_size)
            .with_dim(cfg.dim)
            .with_depth(cfg.depth)
            .with_heads(cfg.heads)
            .with_max_len(cfg.max_len)
            .with_dropout(cfg.dropout)
            .with_tasks(tasks)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::fs;

    use crate::ml::inferencer::Predictor;

    type TestBackend = NdArray;

    fn small_config(corpus: &std::path::Path, checkpoint: &std::path::Path) -> ScaffoldConfig {
        ScaffoldConfig {
            corpus_path:    corpus.display().to_string(),
            checkpoint_dir: checkpoint.display().to_string(),
            dim:            16,
            depth:          2,
            heads:          2,
            max_len:        16,
            ..ScaffoldConfig::default()
        }
    }

    #[test]
    fn test_scaffold_writes_a_loadable_bundle() {
        let corpus = tempfile::tempdir().unwrap();
        fs::write(
            corpus.path().join("samples.fa"),
            ">s1\nATGCGTATAGCGCATATTTAGC\n>s2\nGGCTTACGATCGATCGGGCCAT\n",
        )
        .unwrap();
        let checkpoint = tempfile::tempdir().unwrap();

        let summary = ScaffoldUseCase::new(small_config(corpus.path(), checkpoint.path()))
            .execute::<TestBackend>(&Default::default())
            .unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.corpus_bases, 44);
        assert_eq!(summary.tasks[PHENOTYPE_TASK], 2);
        assert_eq!(summary.tasks[GC_CONTENT_TASK], 1);
        assert_eq!(summary.tasks[SEQUENCE_LENGTH_TASK], 1);

        let predictor = Predictor::<TestBackend>::load(checkpoint.path(), Default::default()).unwrap();
        assert_eq!(predictor.tokenizer().vocab_size(), summary.vocab_size);
        let prediction = predictor.predict("ATGCGTATAGCG").unwrap();
        assert!(["HEALTHY", "SICKLECELLAEMIA"].contains(&prediction.predicted_phenotype.as_str()));
    }

    #[test]
    fn test_vocabulary_has_no_kmers_across_record_boundaries() {
        let corpus = tempfile::tempdir().unwrap();
        fs::write(corpus.path().join("runs.fa"), ">a\nAAAAAA\n>c\nCCCCCC\n").unwrap();
        let checkpoint = tempfile::tempdir().unwrap();

        let summary = ScaffoldUseCase::new(small_config(corpus.path(), checkpoint.path()))
            .execute::<TestBackend>(&Default::default())
            .unwrap();
        assert_eq!(summary.corpus_bases, 12);

        let predictor = Predictor::<TestBackend>::load(checkpoint.path(), Default::default()).unwrap();
        let tokenizer = predictor.tokenizer();
        assert!(tokenizer.token_id("AAA").is_some());
        assert!(tokenizer.token_id("CCC").is_some());
        assert_eq!(tokenizer.token_id("AAC"), None);
        assert_eq!(tokenizer.token_id("ACC"), None);
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let corpus     = tempfile::tempdir().unwrap();
        let checkpoint = tempfile::tempdir().unwrap();
        let result = ScaffoldUseCase::new(small_config(corpus.path(), checkpoint.path()))
            .execute::<TestBackend>(&Default::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_single_label_skips_phenotype_head() {
        let use_case = ScaffoldUseCase::new(ScaffoldConfig {
            phenotypes: vec!["HEALTHY".into()],
            ..ScaffoldConfig::default()
        });
        let config = use_case.model_config(40, 1);
        assert!(!config.tasks.contains_key(PHENOTYPE_TASK));
        assert_eq!(config.tasks.len(), 2);
    }
}
