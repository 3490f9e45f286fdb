// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Serves phenotype predictions from a checkpoint bundle:
//
//   Step 1: Load the bundle into a Predictor   (Layer 5 / 6)
//   Step 2: Read sequences from text or files  (Layer 4 - data)
//   Step 3: Predict in fixed-size batches      (Layer 5 - ml)
//
// The Predictor is built once and only read afterwards.

use anyhow::{Context, Result};
use burn::prelude::*;
use serde::Serialize;
use std::path::Path;

use crate::data::loader::SequenceLoader;
use crate::domain::{prediction::Prediction, traits::{PhenotypePredictor, SequenceSource}};
use crate::ml::inferencer::Predictor;

/// Sequences scored per forward pass when predicting a file.
pub const PREDICT_BATCH_SIZE: usize = 16;

/// A prediction tagged with the record it came from.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPrediction {
    pub id: String,
    #[serde(flatten)]
    pub prediction: Prediction,
}

pub struct PredictUseCase<B: Backend> {
    predictor: Predictor<B>,
}

impl<B: Backend> PredictUseCase<B> {
    pub fn new(checkpoint_dir: &str, device: B::Device) -> Result<Self> {
        let predictor = Predictor::load(checkpoint_dir, device).with_context(|| {
            format!(
                "Cannot load checkpoint '{checkpoint_dir}'. Have you run 'init' first?"
            )
        })?;
        Ok(Self { predictor })
    }

    pub fn from_predictor(predictor: Predictor<B>) -> Self {
        Self { predictor }
    }

    pub fn predict(&self, sequence: &str) -> Result<Prediction> {
        Ok(self.predictor.predict(sequence)?)
    }

    /// Predict every record in a sequence file or directory.
    pub fn predict_path(&self, path: &Path) -> Result<Vec<RecordPrediction>> {
        let records = SequenceLoader::new(path).load_all()?;
        tracing::info!("Predicting {} record(s) from '{}'", records.len(), path.display());

        let mut results = Vec::with_capacity(records.len());
        for chunk in records.chunks(PREDICT_BATCH_SIZE) {
            let sequences: Vec<&str> = chunk.iter().map(|r| r.sequence.as_str()).collect();
            let predictions = self
                .predictor
                .predict_batch(&sequences)
                .with_context(|| format!("Prediction failed for batch starting at '{}'", chunk[0].id))?;

            results.extend(chunk.iter().zip(predictions).map(|(record, prediction)| {
                RecordPrediction { id: record.id.clone(), prediction }
            }));
        }
        Ok(results)
    }

    pub fn predictor(&self) -> &Predictor<B> {
        &self.predictor
    }
}

impl<B: Backend> PhenotypePredictor for PredictUseCase<B> {
    fn predict(&self, sequence: &str) -> Result<Prediction> {
        PredictUseCase::predict(self, sequence)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::{collections::BTreeMap, fs};

    use crate::data::tokenizer::{KmerTokenizer, VocabConfig};
    use crate::domain::phenotype::PhenotypeMap;
    use crate::error::GenomeError;
    use crate::ml::model::{BiologicalGptConfig, PHENOTYPE_TASK};

    type TestBackend = NdArray;

    fn use_case() -> PredictUseCase<TestBackend> {
        let device     = Default::default();
        let tokenizer  = KmerTokenizer::build("ATGCGTATAGCGCATATTTAGCCGTAGG", VocabConfig::new(3)).unwrap();
        let phenotypes = PhenotypeMap::from_names(["HEALTHY", "SICKLECELLAEMIA"]).unwrap();
        let mut tasks  = BTreeMap::new();
        tasks.insert(PHENOTYPE_TASK.to_string(), 2);
        let config = BiologicalGptConfig::new(tokenizer.vocab_size())
            .with_dim(8)
            .with_depth(2)
            .with_heads(2)
            .with_max_len(10)
            .with_tasks(tasks);
        let model = config.init::<TestBackend>(&device).unwrap();
        PredictUseCase::from_predictor(
            Predictor::new(model, tokenizer, phenotypes, config, device).unwrap(),
        )
    }

    #[test]
    fn test_predict_path_tags_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = String::new();
        for i in 0..PREDICT_BATCH_SIZE + 2 {
            content.push_str(&format!(">seq{i}\nATGCGTATAGC\n"));
        }
        fs::write(dir.path().join("many.fasta"), content).unwrap();

        let results = use_case().predict_path(dir.path()).unwrap();
        assert_eq!(results.len(), PREDICT_BATCH_SIZE + 2);
        assert_eq!(results[0].id, "seq0");
        assert_eq!(results[PREDICT_BATCH_SIZE + 1].id, format!("seq{}", PREDICT_BATCH_SIZE + 1));
    }

    #[test]
    fn test_core_error_kind_survives_anyhow() {
        let err = use_case().predict("AC").unwrap_err();
        let kind = err.downcast_ref::<GenomeError>().map(GenomeError::kind);
        assert_eq!(kind, Some("invalid_input"));
    }

    #[test]
    fn test_record_prediction_json_is_flat() {
        let results = use_case().predict("ATGCGTATAGC").unwrap();
        let tagged  = RecordPrediction { id: "x".into(), prediction: results };
        let json    = serde_json::to_value(&tagged).unwrap();
        assert_eq!(json["id"], "x");
        assert!(json.get("predicted_phenotype").is_some());
    }
}
