// ============================================================
// Layer 5 — Predictor (inference context)
// ============================================================
// The read-only serving context: one model, the tokenizer it was
// built with, the phenotype labels and the config, all checked
// against each other once at construction. After that nothing is
// mutated, so a Predictor can be shared across threads and called
// concurrently.
//
// Per sequence:
//   raw text → clean → encode → fit to max_len → infer
//            → softmax(phenotype head) → label + confidence
//            → gc_content / sequence_length heads (or measured)

use burn::{prelude::*, tensor::activation::softmax};
use std::{cmp::Ordering, path::PathBuf};

use crate::data::{
    batcher::SequenceBatcher,
    preprocessor::Preprocessor,
    tokenizer::{KmerTokenizer, PAD_ID},
};
use crate::domain::{
    phenotype::PhenotypeMap,
    prediction::{Prediction, UNKNOWN_PHENOTYPE},
    sequence::gc_content,
    traits::PhenotypePredictor,
};
use crate::error::{GenomeError, Result};
use crate::infra::checkpoint::{check_artifacts, CheckpointManager};
use crate::ml::model::{
    BiologicalGpt, BiologicalGptConfig, ModelOutput,
    GC_CONTENT_TASK, PHENOTYPE_TASK, SEQUENCE_LENGTH_TASK,
};

pub struct Predictor<B: Backend> {
    model:        BiologicalGpt<B>,
    tokenizer:    KmerTokenizer,
    phenotypes:   PhenotypeMap,
    config:       BiologicalGptConfig,
    batcher:      SequenceBatcher<B>,
    preprocessor: Preprocessor,
}

impl<B: Backend> Predictor<B> {
    pub fn new(
        model:      BiologicalGpt<B>,
        tokenizer:  KmerTokenizer,
        phenotypes: PhenotypeMap,
        config:     BiologicalGptConfig,
        device:     B::Device,
    ) -> Result<Self> {
        check_artifacts(&config, &tokenizer, &phenotypes)?;
        if model.vocab_size != config.vocab_size || model.max_len != config.max_len {
            return Err(GenomeError::ConfigMismatch(format!(
                "model was built for vocab_size {} / max_len {}, config declares {} / {}",
                model.vocab_size, model.max_len, config.vocab_size, config.max_len
            )));
        }

        let batcher = SequenceBatcher::new(device, config.max_len, PAD_ID);
        Ok(Self {
            model, tokenizer, phenotypes, config, batcher,
            preprocessor: Preprocessor::new(),
        })
    }

    /// Load every artifact from a checkpoint directory.
    pub fn load(checkpoint_dir: impl Into<PathBuf>, device: B::Device) -> Result<Self> {
        let bundle = CheckpointManager::new(checkpoint_dir).load_bundle::<B>(&device)?;
        Self::new(bundle.model, bundle.tokenizer, bundle.phenotypes, bundle.config, device)
    }

    pub fn predict(&self, sequence: &str) -> Result<Prediction> {
        self.predict_batch(&[sequence])?
            .pop()
            .ok_or_else(|| GenomeError::InvalidInput("no prediction produced".into()))
    }

    /// One batched forward pass; result i belongs to input i.
    pub fn predict_batch(&self, sequences: &[&str]) -> Result<Vec<Prediction>> {
        if sequences.is_empty() {
            return Ok(Vec::new());
        }

        let k = self.tokenizer.k();
        let mut cleaned = Vec::with_capacity(sequences.len());
        for (i, raw) in sequences.iter().enumerate() {
            let clean = self.preprocessor.clean(raw);
            if clean.len() < k {
                return Err(GenomeError::InvalidInput(format!(
                    "sequence {i} has {} bases after cleaning, need at least {k}",
                    clean.len()
                )));
            }
            cleaned.push(clean);
        }

        let batch  = self.batcher.encode_batch(&self.tokenizer, &cleaned);
        let output = self.model.infer(batch.tokens)?;

        let phenotype = self.phenotype_scores(&output)?;
        let gc        = task_column(&output, GC_CONTENT_TASK)?;
        let length    = task_column(&output, SEQUENCE_LENGTH_TASK)?;
        let labels    = self.phenotypes.labels();

        let predictions: Vec<Prediction> = cleaned
            .into_iter()
            .enumerate()
            .map(|(i, sequence)| {
                let (predicted_phenotype, confidence) = phenotype
                    .as_ref()
                    .map(|rows| self.best_label(&rows[i]))
                    .unwrap_or_else(|| (UNKNOWN_PHENOTYPE.to_string(), 0.0));
                let actual_gc_content = gc_content(&sequence);
                let actual_length     = sequence.len();

                Prediction {
                    predicted_gc_content: gc.as_ref().map_or(actual_gc_content, |v| v[i] as f64),
                    predicted_length:     length.as_ref().map_or(actual_length as f64, |v| v[i] as f64),
                    actual_gc_content,
                    actual_length,
                    predicted_phenotype,
                    confidence,
                    all_phenotypes: labels.clone(),
                    sequence,
                }
            })
            .collect();

        for p in &predictions {
            tracing::info!(
                "Predicted '{}' (confidence {:.3}) for {} bp, GC {:.3}",
                p.predicted_phenotype, p.confidence, p.actual_length, p.actual_gc_content
            );
        }
        Ok(predictions)
    }

    /// Softmax probabilities per row, or None without a phenotype head.
    fn phenotype_scores(&self, output: &ModelOutput<B>) -> Result<Option<Vec<Vec<f32>>>> {
        let Some(logits) = output.task_logits.get(PHENOTYPE_TASK) else {
            return Ok(None);
        };
        let [_, classes] = logits.dims();
        let probs = read_floats(softmax(logits.clone(), 1), PHENOTYPE_TASK)?;
        Ok(Some(probs.chunks(classes).map(<[f32]>::to_vec).collect()))
    }

    fn best_label(&self, probs: &[f32]) -> (String, f32) {
        probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(id, p)| {
                let label = self.phenotypes.name(id).unwrap_or(UNKNOWN_PHENOTYPE);
                (label.to_string(), p)
            })
            .unwrap_or_else(|| (UNKNOWN_PHENOTYPE.to_string(), 0.0))
    }

    pub fn config(&self) -> &BiologicalGptConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &KmerTokenizer {
        &self.tokenizer
    }

    pub fn phenotypes(&self) -> &PhenotypeMap {
        &self.phenotypes
    }

    pub fn model(&self) -> &BiologicalGpt<B> {
        &self.model
    }
}

impl<B: Backend> PhenotypePredictor for Predictor<B> {
    fn predict(&self, sequence: &str) -> anyhow::Result<Prediction> {
        Ok(Predictor::predict(self, sequence)?)
    }
}

/// First column of a regression head, one value per row.
fn task_column<B: Backend>(output: &ModelOutput<B>, task: &str) -> Result<Option<Vec<f32>>> {
    output
        .task_logits
        .get(task)
        .map(|values| -> Result<Vec<f32>> {
            let [rows, width] = values.dims();
            let flat = read_floats(values.clone(), task)?;
            Ok((0..rows).map(|r| flat[r * width]).collect())
        })
        .transpose()
}

fn read_floats<B: Backend>(tensor: Tensor<B, 2>, what: &str) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| GenomeError::NumericFailure(format!("{what}: unreadable tensor data ({e:?})")))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::collections::BTreeMap;

    use crate::data::tokenizer::VocabConfig;

    type TestBackend = NdArray;

    const CORPUS: &str = "ATGCGTATAGCGCATATTTAGCCGTAGGCTTACGATCGATCGGGCCAT";

    fn predictor_with_tasks(tasks: &[(&str, usize)]) -> Predictor<TestBackend> {
        let device     = Default::default();
        let tokenizer  = KmerTokenizer::build(CORPUS, VocabConfig::new(3)).unwrap();
        let phenotypes = PhenotypeMap::from_names(["HEALTHY", "SICKLECELLAEMIA", "THALASSEMIA"]).unwrap();
        let tasks: BTreeMap<String, usize> =
            tasks.iter().map(|(name, width)| (name.to_string(), *width)).collect();
        let config = BiologicalGptConfig::new(tokenizer.vocab_size())
            .with_dim(16)
            .with_depth(2)
            .with_heads(2)
            .with_max_len(12)
            .with_tasks(tasks);
        let model = config.init::<TestBackend>(&device).unwrap();
        Predictor::new(model, tokenizer, phenotypes, config, device).unwrap()
    }

    fn full_predictor() -> Predictor<TestBackend> {
        predictor_with_tasks(&[
            (PHENOTYPE_TASK, 3),
            (GC_CONTENT_TASK, 1),
            (SEQUENCE_LENGTH_TASK, 1),
        ])
    }

    #[test]
    fn test_prediction_fields() {
        let predictor  = full_predictor();
        let prediction = predictor.predict("atg cgt_ATAGCGC\n").unwrap();

        assert_eq!(prediction.sequence, "ATGCGTATAGCGC");
        assert_eq!(prediction.actual_length, 13);
        assert!((prediction.actual_gc_content - 7.0 / 13.0).abs() < 1e-9);
        assert!(prediction.all_phenotypes.contains(&prediction.predicted_phenotype));
        assert!((0.0..=1.0).contains(&prediction.confidence));
        assert!(prediction.predicted_gc_content.is_finite());
        assert_eq!(prediction.all_phenotypes, vec!["HEALTHY", "SICKLECELLAEMIA", "THALASSEMIA"]);
    }

    #[test]
    fn test_short_sequence_is_invalid_input() {
        let predictor = full_predictor();
        let err = predictor.predict("A_T").unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_without_task_heads_falls_back_to_measurements() {
        let predictor  = predictor_with_tasks(&[]);
        let prediction = predictor.predict("GGGCCCAT").unwrap();

        assert_eq!(prediction.predicted_phenotype, UNKNOWN_PHENOTYPE);
        assert_eq!(prediction.confidence, 0.0);
        assert_eq!(prediction.predicted_gc_content, prediction.actual_gc_content);
        assert_eq!(prediction.predicted_length, 8.0);
    }

    #[test]
    fn test_batch_results_follow_input_order() {
        let predictor = full_predictor();
        let inputs    = ["ATGCGTATAGCGCATATTTAGCCG", "GGC", "ATATATAT"];
        let results   = predictor.predict_batch(&inputs).unwrap();

        let lengths: Vec<usize> = results.iter().map(|p| p.actual_length).collect();
        assert_eq!(lengths, vec![24, 3, 8]);
        assert!(predictor.predict_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_artifacts_are_rejected() {
        let device     = Default::default();
        let tokenizer  = KmerTokenizer::build(CORPUS, VocabConfig::new(3)).unwrap();
        let phenotypes = PhenotypeMap::from_names(["HEALTHY"]).unwrap();
        let mut tasks  = BTreeMap::new();
        tasks.insert(PHENOTYPE_TASK.to_string(), 2);
        let config = BiologicalGptConfig::new(tokenizer.vocab_size())
            .with_dim(8)
            .with_depth(1)
            .with_heads(2)
            .with_max_len(8)
            .with_tasks(tasks);
        let model = config.init::<TestBackend>(&device).unwrap();

        let result = Predictor::new(model, tokenizer, phenotypes, config, device);
        assert!(matches!(result, Err(GenomeError::ConfigMismatch(_))));
    }

    #[test]
    fn test_load_from_checkpoint() {
        let dir       = tempfile::tempdir().unwrap();
        let predictor = full_predictor();
        CheckpointManager::new(dir.path())
            .save_bundle(
                predictor.model(),
                predictor.tokenizer(),
                predictor.phenotypes(),
                predictor.config(),
            )
            .unwrap();

        let loaded = Predictor::<TestBackend>::load(dir.path(), Default::default()).unwrap();
        let prediction = loaded.predict("ATGCGTATAGCGC").unwrap();
        assert_eq!(prediction.actual_length, 13);
    }
}
