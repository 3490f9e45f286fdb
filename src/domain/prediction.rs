// ============================================================
// Layer 3 — Prediction Result
// ============================================================
// The structured answer handed back to whatever serves the
// model. Ephemeral: derived per call, never persisted.

use serde::{Deserialize, Serialize};

/// Label used when the model has no phenotype-classification task.
pub const UNKNOWN_PHENOTYPE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The cleaned sequence that was actually scored
    pub sequence: String,

    pub predicted_phenotype: String,

    /// Softmax probability of the predicted class, in [0, 1]
    pub confidence: f32,

    /// Regression head output, or the measured value when the
    /// model has no `gc_content` task
    pub predicted_gc_content: f64,
    pub actual_gc_content:    f64,

    /// Regression head output, or the measured value when the
    /// model has no `sequence_length` task
    pub predicted_length: f64,
    pub actual_length:    usize,

    /// Every known label, in class-id order
    pub all_phenotypes: Vec<String>,
}
