// ============================================================
// Layer 5 — Biologically Augmented Transformer
// ============================================================
//   tokens [b, t]
//       │
//       ├── token embedding ┐
//       ├── position emb.   ├─ sum → [b, t, dim]
//       └── helical emb.    ┘
//       │
//       ▼
//   BiologicalBlock × depth   (structure / motif attention per block)
//       │
//       ▼
//   final LayerNorm ──┬─▶ lm_head     → next-token logits [b, t, vocab]
//                     └─▶ task head   → per-task outputs  [b, width]

use std::collections::BTreeMap;

use burn::{
    module::Param,
    nn::{
        loss::{CrossEntropyLossConfig, MseLoss, Reduction},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::{activation::gelu, Distribution},
};

use crate::error::{GenomeError, Result as GenomeResult};
use crate::ml::attention::{default_motifs, AttentionKind, BlockAttention};
use crate::ml::heads::{MultiTaskHead, TaskKind, TaskOutputs, TaskSpec};

pub const PHENOTYPE_TASK:       &str = "phenotype_classification";
pub const GC_CONTENT_TASK:      &str = "gc_content";
pub const SEQUENCE_LENGTH_TASK: &str = "sequence_length";

/// Key of the next-token loss in `ModelOutput::losses`
pub const LM_LOSS: &str = "lm_loss";

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct BiologicalGptConfig {
    pub vocab_size: usize,
    #[config(default = 256)]
    pub dim: usize,
    #[config(default = 6)]
    pub depth: usize,
    #[config(default = 8)]
    pub heads: usize,
    #[config(default = 1024)]
    pub max_len: usize,
    /// Task name → output width (1 = regression, >1 = class count)
    #[config(default = "BTreeMap::new()")]
    pub tasks: BTreeMap<String, usize>,
    #[config(default = "default_motifs()")]
    pub motifs: Vec<String>,
    #[config(default = 0.1)]
    pub dropout: f64,
    /// Explicit per-block attention choice; alternates when absent
    pub attention_pattern: Option<Vec<AttentionKind>>,
}

impl BiologicalGptConfig {
    pub fn validate(&self) -> GenomeResult<()> {
        let invalid = |msg: String| Err(GenomeError::InvalidInput(msg));

        if self.vocab_size == 0 {
            return invalid("vocab_size must be positive".into());
        }
        if self.dim == 0 || self.heads == 0 || self.max_len == 0 {
            return invalid(format!(
                "dim ({}), heads ({}) and max_len ({}) must all be positive",
                self.dim, self.heads, self.max_len
            ));
        }
        if self.dim % self.heads != 0 {
            return invalid(format!("dim {} is not divisible by heads {}", self.dim, self.heads));
        }
        if self.motifs.is_empty() || self.motifs.iter().any(|m| m.is_empty()) {
            return invalid("motif list must be non-empty and contain no empty motifs".into());
        }
        if let Some((name, _)) = self.tasks.iter().find(|(_, width)| **width == 0) {
            return invalid(format!("task '{name}' has output width 0"));
        }
        if let Some(pattern) = &self.attention_pattern {
            if pattern.len() != self.depth {
                return invalid(format!(
                    "attention pattern has {} entries but depth is {}",
                    pattern.len(),
                    self.depth
                ));
            }
        }
        Ok(())
    }

    /// Attention kind of every block, in depth order.
    pub fn block_kinds(&self) -> Vec<AttentionKind> {
        self.attention_pattern
            .clone()
            .unwrap_or_else(|| AttentionKind::alternating(self.depth))
    }

    pub fn task_specs(&self) -> Vec<TaskSpec> {
        self.tasks
            .iter()
            .map(|(name, &width)| TaskSpec::new(name.clone(), width))
            .collect()
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> GenomeResult<BiologicalGpt<B>> {
        self.validate()?;

        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.dim).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_len, self.dim).init(device);
        let helical_embedding  = Param::from_tensor(Tensor::random(
            [self.max_len, self.dim],
            Distribution::Normal(0.0, 1.0),
            device,
        ));
        let blocks: Vec<BiologicalBlock<B>> = self
            .block_kinds()
            .into_iter()
            .map(|kind| self.build_block(kind, device))
            .collect();
        let final_norm = LayerNormConfig::new(self.dim).init(device);
        let lm_head    = LinearConfig::new(self.dim, self.vocab_size).init(device);
        let task_head  = (!self.tasks.is_empty())
            .then(|| MultiTaskHead::new(self.dim, self.task_specs(), device));

        Ok(BiologicalGpt {
            token_embedding, position_embedding, helical_embedding,
            blocks, final_norm, lm_head, task_head,
            vocab_size: self.vocab_size,
            max_len:    self.max_len,
        })
    }

    fn build_block<B: Backend>(&self, kind: AttentionKind, device: &B::Device) -> BiologicalBlock<B> {
        let attention = BlockAttention::init(
            kind, self.dim, self.heads, self.max_len, &self.motifs, device,
        );
        let ff_expand  = LinearConfig::new(self.dim, 4 * self.dim).init(device);
        let ff_project = LinearConfig::new(4 * self.dim, self.dim).init(device);
        let norm1   = LayerNormConfig::new(self.dim).init(device);
        let norm2   = LayerNormConfig::new(self.dim).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        BiologicalBlock { attention, ff_expand, ff_project, norm1, norm2, dropout }
    }
}

// ─── BiologicalBlock ──────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BiologicalBlock<B: Backend> {
    pub attention:  BlockAttention<B>,
    pub ff_expand:  Linear<B>,
    pub ff_project: Linear<B>,
    pub norm1:      LayerNorm<B>,
    pub norm2:      LayerNorm<B>,
    pub dropout:    Dropout,
}

impl<B: Backend> BiologicalBlock<B> {
    /// Pre-norm: x + attn(ln1 x), then x + ff(ln2 x).
    pub fn forward(&self, x: Tensor<B, 3>, mask: Option<Tensor<B, 3, Bool>>) -> Tensor<B, 3> {
        let x = x.clone() + self.attention.forward(self.norm1.forward(x), mask);

        let hidden = gelu(self.ff_expand.forward(self.norm2.forward(x.clone())));
        let ff_out = self.ff_project.forward(self.dropout.forward(hidden));
        x + self.dropout.forward(ff_out)
    }
}

// ─── BiologicalGpt ────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BiologicalGpt<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    /// Learned per-position signal added on top of the linear position embedding
    pub helical_embedding:  Param<Tensor<B, 2>>,
    pub blocks:             Vec<BiologicalBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub lm_head:            Linear<B>,
    pub task_head:          Option<MultiTaskHead<B>>,
    pub vocab_size:         usize,
    pub max_len:            usize,
}

pub struct ModelOutput<B: Backend> {
    /// [batch, seq_len, vocab_size]
    pub logits:      Tensor<B, 3>,
    pub task_logits: TaskOutputs<B>,
    /// Scalar losses keyed by `LM_LOSS` or task name; empty without targets
    pub losses:      BTreeMap<String, Tensor<B, 1>>,
}

/// Supervision for one task: class ids for classification,
/// real values for regression.
#[derive(Debug, Clone)]
pub enum TaskTarget<B: Backend> {
    Class(Tensor<B, 1, Int>),
    Value(Tensor<B, 1>),
}

impl<B: Backend> TaskTarget<B> {
    fn len(&self) -> usize {
        match self {
            Self::Class(t) => t.dims()[0],
            Self::Value(t) => t.dims()[0],
        }
    }

    fn into_values(self) -> Tensor<B, 1> {
        match self {
            Self::Class(t) => t.float(),
            Self::Value(t) => t,
        }
    }
}

impl<B: Backend> BiologicalGpt<B> {
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> ModelOutput<B> {
        self.forward_masked(tokens, None)
    }

    /// `mask`: optional `[b, t, t]`, true where attending is allowed.
    pub fn forward_masked(
        &self,
        tokens: Tensor<B, 2, Int>,
        mask:   Option<Tensor<B, 3, Bool>>,
    ) -> ModelOutput<B> {
        let [batch_size, seq_len] = tokens.dims();

        let tok_emb = self.token_embedding.forward(tokens);
        let [_, _, dim] = tok_emb.dims();

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);
        let helical = self
            .helical_embedding
            .val()
            .slice([0..seq_len, 0..dim])
            .unsqueeze::<3>()
            .expand([batch_size, seq_len, dim]);

        let mut x = tok_emb + pos_emb + helical;
        for block in &self.blocks {
            x = block.forward(x, mask.clone());
        }
        let x = self.final_norm.forward(x);

        let task_logits = self
            .task_head
            .as_ref()
            .map(|head| head.forward(x.clone()))
            .unwrap_or_default();
        let logits = self.lm_head.forward(x);

        ModelOutput { logits, task_logits, losses: BTreeMap::new() }
    }

    /// Forward pass plus losses.
    ///
    /// `targets` are next-token ids shaped like `tokens`. Task targets
    /// whose task is not configured on this model are skipped without
    /// error; every other shape or kind disagreement is `InvalidInput`.
    pub fn forward_loss(
        &self,
        tokens:       Tensor<B, 2, Int>,
        targets:      Option<Tensor<B, 2, Int>>,
        task_targets: BTreeMap<String, TaskTarget<B>>,
    ) -> GenomeResult<ModelOutput<B>> {
        self.check_tokens(&tokens)?;
        let [batch_size, seq_len] = tokens.dims();
        if let Some(targets) = &targets {
            if targets.dims() != [batch_size, seq_len] {
                return Err(GenomeError::InvalidInput(format!(
                    "next-token targets have shape {:?}, expected [{batch_size}, {seq_len}]",
                    targets.dims()
                )));
            }
            check_id_range("next-token targets", targets, self.vocab_size)?;
        }

        let mut output = self.forward(tokens);
        let device = output.logits.device();
        let ce = CrossEntropyLossConfig::new().init(&device);

        if let Some(targets) = targets {
            let rows = batch_size * seq_len;
            let loss = ce.forward(
                output.logits.clone().reshape([rows, self.vocab_size]),
                targets.reshape([rows]),
            );
            output.losses.insert(LM_LOSS.to_string(), loss);
        }

        for (task, target) in task_targets {
            let (Some(logits), Some(spec)) = (output.task_logits.get(&task), self.task(&task)) else {
                tracing::debug!("No '{task}' head on this model, skipping its loss");
                continue;
            };
            if target.len() != batch_size {
                return Err(GenomeError::InvalidInput(format!(
                    "task '{task}' has {} targets for a batch of {batch_size}",
                    target.len()
                )));
            }

            let loss = match (spec.kind(), target) {
                (TaskKind::Regression, target) => MseLoss::new().forward(
                    logits.clone().reshape([batch_size]),
                    target.into_values(),
                    Reduction::Mean,
                ),
                (TaskKind::Classification { classes }, TaskTarget::Class(ids)) => {
                    check_id_range(&format!("task '{task}' targets"), &ids, classes)?;
                    ce.forward(logits.clone(), ids)
                }
                (TaskKind::Classification { .. }, TaskTarget::Value(_)) => {
                    return Err(GenomeError::InvalidInput(format!(
                        "classification task '{task}' needs class-id targets"
                    )));
                }
            };
            output.losses.insert(task, loss);
        }

        Ok(output)
    }

    /// Checked forward pass for serving: validates the batch and
    /// rejects non-finite outputs.
    pub fn infer(&self, tokens: Tensor<B, 2, Int>) -> GenomeResult<ModelOutput<B>> {
        self.infer_masked(tokens, None)
    }

    pub fn infer_masked(
        &self,
        tokens: Tensor<B, 2, Int>,
        mask:   Option<Tensor<B, 3, Bool>>,
    ) -> GenomeResult<ModelOutput<B>> {
        self.check_tokens(&tokens)?;
        if let Some(mask) = &mask {
            let [b, t] = tokens.dims();
            if mask.dims() != [b, t, t] {
                return Err(GenomeError::InvalidInput(format!(
                    "attention mask has shape {:?}, expected [{b}, {t}, {t}]",
                    mask.dims()
                )));
            }
        }

        let output = self.forward_masked(tokens, mask);
        ensure_finite("next-token logits", output.logits.clone())?;
        for (task, values) in &output.task_logits {
            ensure_finite(task, values.clone())?;
        }
        Ok(output)
    }

    /// Configured tasks, in output order.
    pub fn tasks(&self) -> &[TaskSpec] {
        self.task_head
            .as_ref()
            .map(|head| head.tasks.0.as_slice())
            .unwrap_or(&[])
    }

    pub fn task(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks().iter().find(|t| t.name == name)
    }

    fn check_tokens(&self, tokens: &Tensor<B, 2, Int>) -> GenomeResult<()> {
        let [batch_size, seq_len] = tokens.dims();
        if batch_size == 0 || seq_len == 0 {
            return Err(GenomeError::InvalidInput(format!(
                "empty token batch [{batch_size}, {seq_len}]"
            )));
        }
        if seq_len > self.max_len {
            return Err(GenomeError::InvalidInput(format!(
                "sequence length {seq_len} exceeds max_len {}",
                self.max_len
            )));
        }
        check_id_range("token ids", tokens, self.vocab_size)
    }
}

/// Ids must lie in `0..bound`; burn's gathers panic otherwise.
fn check_id_range<B: Backend, const D: usize>(
    what:  &str,
    ids:   &Tensor<B, D, Int>,
    bound: usize,
) -> GenomeResult<()> {
    let lowest  = ids.clone().min().into_scalar().elem::<i64>();
    let highest = ids.clone().max().into_scalar().elem::<i64>();
    if lowest < 0 || highest >= bound as i64 {
        return Err(GenomeError::InvalidInput(format!(
            "{what} span [{lowest}, {highest}] but must lie in [0, {bound})"
        )));
    }
    Ok(())
}

fn ensure_finite<B: Backend, const D: usize>(what: &str, tensor: Tensor<B, D>) -> GenomeResult<()> {
    let values: Vec<f32> = tensor
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| GenomeError::NumericFailure(format!("{what}: unreadable tensor data ({e:?})")))?;

    match values.iter().find(|v| !v.is_finite()) {
        Some(bad) => Err(GenomeError::NumericFailure(format!("{what} contains {bad}"))),
        None      => Ok(()),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn small_config() -> BiologicalGptConfig {
        let mut tasks = BTreeMap::new();
        tasks.insert(PHENOTYPE_TASK.to_string(), 3);
        tasks.insert(GC_CONTENT_TASK.to_string(), 1);
        BiologicalGptConfig::new(50)
            .with_dim(32)
            .with_depth(2)
            .with_heads(4)
            .with_max_len(16)
            .with_tasks(tasks)
    }

    fn floats<const D: usize>(t: Tensor<TestBackend, D>) -> Vec<f32> {
        t.into_data().convert::<f32>().to_vec().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = BiologicalGptConfig::new(100);
        assert_eq!((config.dim, config.depth, config.heads, config.max_len), (256, 6, 8, 1024));
        assert!(config.tasks.is_empty());
        assert_eq!(config.motifs, vec!["TATA", "GCGC", "ATAT"]);
        assert!((config.dropout - 0.1).abs() < 1e-12);
        assert_eq!(config.block_kinds(), AttentionKind::alternating(6));
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let bad = [
            small_config().with_heads(5),
            small_config().with_heads(0),
            small_config().with_max_len(0),
            small_config().with_motifs(vec![]),
            small_config().with_motifs(vec!["TATA".into(), String::new()]),
            small_config().with_attention_pattern(Some(vec![AttentionKind::Motif])),
            BiologicalGptConfig::new(0),
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(GenomeError::InvalidInput(_))));
        }

        let mut tasks = BTreeMap::new();
        tasks.insert("empty".to_string(), 0);
        assert!(small_config().with_tasks(tasks).init::<TestBackend>(&Default::default()).is_err());
    }

    #[test]
    fn test_config_json_roundtrip_keeps_tasks_and_pattern() {
        let config = small_config()
            .with_attention_pattern(Some(vec![AttentionKind::Motif, AttentionKind::Structure]));
        let json   = serde_json::to_string(&config).unwrap();
        let back: BiologicalGptConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tasks, config.tasks);
        assert_eq!(back.block_kinds(), vec![AttentionKind::Motif, AttentionKind::Structure]);
    }

    #[test]
    fn test_all_pad_batch_is_finite() {
        let device = Default::default();
        let model  = small_config().init::<TestBackend>(&device).unwrap();
        let tokens = Tensor::<TestBackend, 2, Int>::zeros([1, 16], &device);

        let output = model.infer(tokens).unwrap();
        assert_eq!(output.logits.dims(), [1, 16, 50]);
        assert_eq!(output.task_logits[PHENOTYPE_TASK].dims(), [1, 3]);
        assert_eq!(output.task_logits[GC_CONTENT_TASK].dims(), [1, 1]);
        assert!(output.losses.is_empty());
        assert!(floats(output.logits).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_identical_rows_give_identical_task_outputs() {
        let device = Default::default();
        let model  = small_config().with_dropout(0.0).init::<TestBackend>(&device).unwrap();
        let row: Vec<i32> = (0..16).map(|i| 5 + i % 7).collect();
        let flat: Vec<i32> = row.iter().cycle().take(16 * 3).copied().collect();
        let tokens = Tensor::<TestBackend, 1, Int>::from_ints(flat.as_slice(), &device).reshape([3, 16]);

        let output = model.infer(tokens).unwrap();
        for task in model.tasks() {
            let values = output.task_logits[&task.name].clone();
            assert_eq!(values.dims(), [3, task.output_dim]);

            let values = floats(values);
            let width  = task.output_dim;
            for row in 1..3 {
                for col in 0..width {
                    assert!((values[col] - values[row * width + col]).abs() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_explicit_pattern_is_respected() {
        let device = Default::default();
        let model = small_config()
            .with_attention_pattern(Some(vec![AttentionKind::Motif, AttentionKind::Motif]))
            .init::<TestBackend>(&device)
            .unwrap();
        assert!(model.blocks.iter().all(|b| b.attention.kind() == AttentionKind::Motif));

        let default = small_config().init::<TestBackend>(&device).unwrap();
        assert_eq!(default.blocks[0].attention.kind(), AttentionKind::Structure);
        assert_eq!(default.blocks[1].attention.kind(), AttentionKind::Motif);
    }

    #[test]
    fn test_no_tasks_means_no_task_outputs() {
        let device = Default::default();
        let model  = small_config()
            .with_tasks(BTreeMap::new())
            .init::<TestBackend>(&device)
            .unwrap();
        let output = model.forward(Tensor::<TestBackend, 2, Int>::zeros([2, 4], &device));
        assert!(output.task_logits.is_empty());
        assert!(model.tasks().is_empty());
    }

    #[test]
    fn test_forward_loss_covers_lm_and_tasks() {
        let device = Default::default();
        let model  = small_config().init::<TestBackend>(&device).unwrap();
        let tokens  = Tensor::<TestBackend, 2, Int>::from_ints([[5, 6, 7, 8], [9, 10, 11, 12]], &device);
        let targets = Tensor::<TestBackend, 2, Int>::from_ints([[6, 7, 8, 0], [10, 11, 12, 0]], &device);

        let mut task_targets = BTreeMap::new();
        task_targets.insert(
            PHENOTYPE_TASK.to_string(),
            TaskTarget::Class(Tensor::from_ints([0, 2], &device)),
        );
        task_targets.insert(
            GC_CONTENT_TASK.to_string(),
            TaskTarget::Value(Tensor::from_floats([0.5, 0.25], &device)),
        );
        // Not configured on the model
        task_targets.insert(
            "sequence_length".to_string(),
            TaskTarget::Value(Tensor::from_floats([4.0, 4.0], &device)),
        );

        let output = model.forward_loss(tokens, Some(targets), task_targets).unwrap();
        let keys: Vec<&str> = output.losses.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec![GC_CONTENT_TASK, LM_LOSS, PHENOTYPE_TASK]);
        for loss in output.losses.values() {
            let value = loss.clone().into_scalar().elem::<f32>();
            assert!(value.is_finite() && value >= 0.0);
        }
    }

    #[test]
    fn test_classification_task_rejects_real_targets() {
        let device = Default::default();
        let model  = small_config().init::<TestBackend>(&device).unwrap();
        let mut task_targets = BTreeMap::new();
        task_targets.insert(
            PHENOTYPE_TASK.to_string(),
            TaskTarget::Value(Tensor::from_floats([1.0], &device)),
        );
        let result = model.forward_loss(
            Tensor::<TestBackend, 2, Int>::zeros([1, 4], &device),
            None,
            task_targets,
        );
        assert!(matches!(result, Err(GenomeError::InvalidInput(_))));
    }

    #[test]
    fn test_forward_loss_rejects_out_of_range_ids() {
        let device = Default::default();
        let model  = small_config().init::<TestBackend>(&device).unwrap();
        let tokens = || Tensor::<TestBackend, 2, Int>::from_ints([[5, 6, 7, 8]], &device);

        let bad_token = Tensor::<TestBackend, 2, Int>::from_ints([[5, 6, 60, 8]], &device);
        let result = model.forward_loss(bad_token, None, BTreeMap::new());
        assert!(matches!(result, Err(GenomeError::InvalidInput(_))));

        let bad_target = Tensor::<TestBackend, 2, Int>::from_ints([[6, 7, 8, 50]], &device);
        let result = model.forward_loss(tokens(), Some(bad_target), BTreeMap::new());
        assert!(matches!(result, Err(GenomeError::InvalidInput(_))));

        let negative_target = Tensor::<TestBackend, 2, Int>::from_ints([[6, 7, 8, -1]], &device);
        let result = model.forward_loss(tokens(), Some(negative_target), BTreeMap::new());
        assert!(matches!(result, Err(GenomeError::InvalidInput(_))));

        // Three phenotype classes, so 7 has no logit
        let mut task_targets = BTreeMap::new();
        task_targets.insert(
            PHENOTYPE_TASK.to_string(),
            TaskTarget::Class(Tensor::from_ints([7], &device)),
        );
        let result = model.forward_loss(tokens(), None, task_targets);
        assert!(matches!(result, Err(GenomeError::InvalidInput(_))));

        let mut task_targets = BTreeMap::new();
        task_targets.insert(
            PHENOTYPE_TASK.to_string(),
            TaskTarget::Class(Tensor::from_ints([2], &device)),
        );
        assert!(model.forward_loss(tokens(), None, task_targets).is_ok());
    }

    #[test]
    fn test_infer_rejects_bad_batches() {
        let device = Default::default();
        let model  = small_config().init::<TestBackend>(&device).unwrap();

        let too_long = Tensor::<TestBackend, 2, Int>::zeros([1, 17], &device);
        assert!(matches!(model.infer(too_long), Err(GenomeError::InvalidInput(_))));

        let out_of_vocab = Tensor::<TestBackend, 2, Int>::from_ints([[1, 2, 50]], &device);
        assert!(matches!(model.infer(out_of_vocab), Err(GenomeError::InvalidInput(_))));

        let bad_mask = Tensor::<TestBackend, 3, Int>::ones([1, 3, 3], &device).bool();
        let tokens   = Tensor::<TestBackend, 2, Int>::zeros([1, 4], &device);
        assert!(matches!(
            model.infer_masked(tokens, Some(bad_mask)),
            Err(GenomeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_degenerate_mask_is_a_numeric_failure() {
        let device = Default::default();
        let model  = small_config().init::<TestBackend>(&device).unwrap();
        let tokens = Tensor::<TestBackend, 2, Int>::zeros([1, 4], &device);
        let nothing_allowed = Tensor::<TestBackend, 3, Int>::zeros([1, 4, 4], &device).bool();

        let result = model.infer_masked(tokens, Some(nothing_allowed));
        assert!(matches!(result, Err(GenomeError::NumericFailure(_))));
    }
}
