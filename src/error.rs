// ============================================================
// Core Error Taxonomy
// ============================================================
// Every operation in the tokenizer, model, checkpoint and
// predictor layers reports one of these kinds. Nothing here is
// retried: the computations are deterministic, so a failure is
// always a caller-input or artifact problem.
//
// The application and CLI layers wrap these in anyhow::Error
// with extra context; the kind string stays recoverable through
// downcast_ref::<GenomeError>().

use thiserror::Error;

/// Errors surfaced by the sequence-to-prediction core.
#[derive(Error, Debug)]
pub enum GenomeError {
    /// Sequence too short for the k-mer length, k == 0, bad batch shape,
    /// token id outside the vocabulary, or an invalid model configuration.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Artifacts disagree with each other or with the declared configuration.
    #[error("Config mismatch: {0}")]
    ConfigMismatch(String),

    /// A checkpoint file or vocabulary file is absent.
    #[error("Missing artifact: {0}")]
    MissingArtifact(String),

    /// A forward pass produced NaN or infinite values.
    #[error("Numeric failure: {0}")]
    NumericFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted file exists but could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GenomeError {
    /// Stable, machine-readable kind for the serving layer.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_)    => "invalid_input",
            Self::ConfigMismatch(_)  => "config_mismatch",
            Self::MissingArtifact(_) => "missing_artifact",
            Self::NumericFailure(_)  => "numeric_failure",
            Self::Io(_)              => "io",
            Self::Parse(_)           => "parse",
        }
    }
}

impl From<serde_json::Error> for GenomeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenomeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings_are_distinct() {
        let errors = [
            GenomeError::InvalidInput("a".into()),
            GenomeError::ConfigMismatch("b".into()),
            GenomeError::MissingArtifact("c".into()),
            GenomeError::NumericFailure("d".into()),
            GenomeError::Parse("e".into()),
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_display_carries_detail() {
        let e = GenomeError::MissingArtifact("checkpoints/model.mpk".into());
        assert!(e.to_string().contains("checkpoints/model.mpk"));
    }

    #[test]
    fn test_json_errors_become_parse() {
        let e: GenomeError = serde_json::from_str::<usize>("not json").unwrap_err().into();
        assert_eq!(e.kind(), "parse");
    }
}
