// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores a complete inference bundle. Everything the
// predictor needs lives in one directory:
//
//   checkpoint/
//     config.json      ← BiologicalGptConfig (architecture + tasks)
//     tokenizer.json   ← k-mer vocabulary, see TokenizerStore
//     phenotypes.json  ← class id → phenotype label
//     model.mpk        ← parameters, burn CompactRecorder
//
// The config is stored separately because the model has to be
// rebuilt with the exact architecture before its record can be
// loaded into it. Loading then cross-checks every artifact:
//   - any file absent                           → MissingArtifact
//   - record shapes disagree with config.json   → ConfigMismatch
//   - tokenizer / phenotypes disagree with it   → ConfigMismatch

use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use std::{fs, path::PathBuf};

use crate::data::tokenizer::KmerTokenizer;
use crate::domain::phenotype::PhenotypeMap;
use crate::error::{GenomeError, Result};
use crate::infra::tokenizer_store::{TokenizerStore, TOKENIZER_FILE};
use crate::ml::attention::{AttentionKind, BlockAttention, BlockAttentionRecord};
use crate::ml::model::{BiologicalGpt, BiologicalGptConfig, BiologicalGptRecord, PHENOTYPE_TASK};

pub const CONFIG_FILE:     &str = "config.json";
pub const PHENOTYPES_FILE: &str = "phenotypes.json";
/// Record file stem; the recorder appends `.mpk`
pub const MODEL_FILE:      &str = "model";

/// Everything loaded from one checkpoint directory.
pub struct CheckpointBundle<B: Backend> {
    pub model:      BiologicalGpt<B>,
    pub tokenizer:  KmerTokenizer,
    pub phenotypes: PhenotypeMap,
    pub config:     BiologicalGptConfig,
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Does not touch the filesystem; saving creates the directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn model_path(&self) -> PathBuf {
        self.dir.join(format!("{MODEL_FILE}.mpk"))
    }

    // ─── Bundle ───────────────────────────────────────────────────────────────

    pub fn save_bundle<B: Backend>(
        &self,
        model:      &BiologicalGpt<B>,
        tokenizer:  &KmerTokenizer,
        phenotypes: &PhenotypeMap,
        config:     &BiologicalGptConfig,
    ) -> Result<()> {
        check_artifacts(config, tokenizer, phenotypes)?;
        self.save_config(config)?;
        TokenizerStore::new(&self.dir).save(tokenizer)?;
        self.save_phenotypes(phenotypes)?;
        self.save_model(model)?;
        tracing::info!("Saved checkpoint bundle to '{}'", self.dir.display());
        Ok(())
    }

    pub fn load_bundle<B: Backend>(&self, device: &B::Device) -> Result<CheckpointBundle<B>> {
        let missing: Vec<String> = [
            self.dir.join(CONFIG_FILE),
            self.dir.join(TOKENIZER_FILE),
            self.dir.join(PHENOTYPES_FILE),
            self.model_path(),
        ]
        .into_iter()
        .filter(|p| !p.exists())
        .map(|p| p.display().to_string())
        .collect();
        if !missing.is_empty() {
            return Err(GenomeError::MissingArtifact(format!(
                "checkpoint is incomplete, missing: {}",
                missing.join(", ")
            )));
        }

        let config     = self.load_config()?;
        let tokenizer  = TokenizerStore::new(&self.dir).load()?;
        let phenotypes = self.load_phenotypes()?;
        check_artifacts(&config, &tokenizer, &phenotypes)?;

        let model = self.load_model(&config, device)?;
        tracing::info!(
            "Loaded checkpoint '{}': vocab={}, dim={}, depth={}, tasks={:?}",
            self.dir.display(),
            config.vocab_size,
            config.dim,
            config.depth,
            config.tasks.keys().collect::<Vec<_>>(),
        );
        Ok(CheckpointBundle { model, tokenizer, phenotypes, config })
    }

    // ─── Model parameters ─────────────────────────────────────────────────────

    pub fn save_model<B: Backend>(&self, model: &BiologicalGpt<B>) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(MODEL_FILE);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .map_err(|e| GenomeError::Parse(format!(
                "cannot write model record '{}': {e:?}", path.display()
            )))?;
        tracing::debug!("Saved model parameters to '{}'", self.model_path().display());
        Ok(())
    }

    /// Rebuild the architecture from `config` and load the saved
    /// parameters into it.
    pub fn load_model<B: Backend>(
        &self,
        config: &BiologicalGptConfig,
        device: &B::Device,
    ) -> Result<BiologicalGpt<B>> {
        if !self.model_path().exists() {
            return Err(GenomeError::MissingArtifact(format!(
                "model parameters '{}' not found",
                self.model_path().display()
            )));
        }

        let record: BiologicalGptRecord<B> = CompactRecorder::new()
            .load(self.dir.join(MODEL_FILE), device)
            .map_err(|e| GenomeError::Parse(format!(
                "cannot read model record '{}': {e:?}", self.model_path().display()
            )))?;
        check_record(&record, config)?;

        let model = config.init::<B>(device)?.load_record(record);
        check_loaded_blocks(&model, config)?;
        Ok(model)
    }

    // ─── Side files ───────────────────────────────────────────────────────────

    pub fn save_config(&self, config: &BiologicalGptConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(CONFIG_FILE), serde_json::to_string_pretty(config)?)?;
        Ok(())
    }

    pub fn load_config(&self) -> Result<BiologicalGptConfig> {
        let path = self.dir.join(CONFIG_FILE);
        if !path.exists() {
            return Err(GenomeError::MissingArtifact(format!(
                "model config '{}' not found", path.display()
            )));
        }
        let config: BiologicalGptConfig = serde_json::from_str(&fs::read_to_string(&path)?)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_phenotypes(&self, phenotypes: &PhenotypeMap) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(PHENOTYPES_FILE), serde_json::to_string_pretty(phenotypes)?)?;
        Ok(())
    }

    pub fn load_phenotypes(&self) -> Result<PhenotypeMap> {
        let path = self.dir.join(PHENOTYPES_FILE);
        if !path.exists() {
            return Err(GenomeError::MissingArtifact(format!(
                "phenotype mapping '{}' not found", path.display()
            )));
        }
        let phenotypes: PhenotypeMap = serde_json::from_str(&fs::read_to_string(&path)?)?;
        phenotypes
            .validate()
            .map_err(|e| GenomeError::Parse(format!("'{}': {e}", path.display())))?;
        Ok(phenotypes)
    }
}

/// Cross-artifact invariants: the tokenizer fills exactly the
/// configured vocabulary, and the phenotype head (if any) has one
/// output per known label, labelled by ids `0..classes`.
pub fn check_artifacts(
    config:     &BiologicalGptConfig,
    tokenizer:  &KmerTokenizer,
    phenotypes: &PhenotypeMap,
) -> Result<()> {
    if tokenizer.vocab_size() != config.vocab_size {
        return Err(GenomeError::ConfigMismatch(format!(
            "tokenizer has {} tokens but the model expects vocab_size {}",
            tokenizer.vocab_size(),
            config.vocab_size
        )));
    }
    if let Some(&classes) = config.tasks.get(PHENOTYPE_TASK) {
        if classes != phenotypes.len() {
            return Err(GenomeError::ConfigMismatch(format!(
                "'{PHENOTYPE_TASK}' head has {classes} outputs but {} phenotypes are mapped",
                phenotypes.len()
            )));
        }
        if !phenotypes.has_dense_ids() {
            return Err(GenomeError::ConfigMismatch(format!(
                "'{PHENOTYPE_TASK}' head outputs classes 0..{classes} but phenotype ids are not 0..{}",
                phenotypes.len()
            )));
        }
    }
    Ok(())
}

fn mismatch(what: &str, found: &[usize], expected: &[usize]) -> GenomeError {
    GenomeError::ConfigMismatch(format!(
        "{what} has shape {found:?}, config declares {expected:?}"
    ))
}

fn check_shape(what: &str, found: [usize; 2], expected: [usize; 2]) -> Result<()> {
    if found == expected { Ok(()) } else { Err(mismatch(what, &found, &expected)) }
}

/// Shape checks that can run on the raw record, before loading.
fn check_record<B: Backend>(record: &BiologicalGptRecord<B>, config: &BiologicalGptConfig) -> Result<()> {
    let (vocab, dim, max_len) = (config.vocab_size, config.dim, config.max_len);

    check_shape("token embedding", record.token_embedding.weight.val().dims(), [vocab, dim])?;
    check_shape("position embedding", record.position_embedding.weight.val().dims(), [max_len, dim])?;
    check_shape("helical embedding", record.helical_embedding.val().dims(), [max_len, dim])?;
    check_shape("lm head", record.lm_head.weight.val().dims(), [dim, vocab])?;

    if record.blocks.len() != config.depth {
        return Err(GenomeError::ConfigMismatch(format!(
            "record holds {} blocks, config declares depth {}",
            record.blocks.len(),
            config.depth
        )));
    }
    // A record variant that differs from the rebuilt block cannot be loaded at all
    for (i, (block, expected)) in record.blocks.iter().zip(config.block_kinds()).enumerate() {
        let found = match &block.attention {
            BlockAttentionRecord::Structure(_) => AttentionKind::Structure,
            BlockAttentionRecord::Motif(_)     => AttentionKind::Motif,
        };
        if found != expected {
            return Err(GenomeError::ConfigMismatch(format!(
                "block {i} holds {found:?} attention, config declares {expected:?}"
            )));
        }
    }

    let found: Vec<usize> = record
        .task_head
        .as_ref()
        .map(|head| head.projections.iter().map(|p| p.weight.val().dims()[1]).collect())
        .unwrap_or_default();
    let expected: Vec<usize> = config.tasks.values().copied().collect();
    if found != expected {
        return Err(mismatch("task head", &found, &expected));
    }
    Ok(())
}

/// Per-block checks on the loaded model: bias tables and motif detectors.
fn check_loaded_blocks<B: Backend>(model: &BiologicalGpt<B>, config: &BiologicalGptConfig) -> Result<()> {
    for (i, block) in model.blocks.iter().enumerate() {
        match &block.attention {
            BlockAttention::Structure(attn) => check_shape(
                &format!("block {i} structure bias"),
                attn.structure_bias.val().dims(),
                [config.max_len, config.max_len],
            )?,
            BlockAttention::Motif(attn) => {
                for (detector, motif) in attn.detectors.iter().zip(&config.motifs) {
                    let found    = detector.weight.val().dims();
                    let expected = [1, config.dim, motif.len()];
                    if found != expected {
                        return Err(mismatch(&format!("block {i} motif detector '{motif}'"), &found, &expected));
                    }
                }
            }
        }
    }
    Ok(())
}
