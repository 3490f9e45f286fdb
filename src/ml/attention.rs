// ============================================================
// Layer 5 — Biological Attention Variants
// ============================================================
// Two causal multi-head attention mechanisms sharing one
// scaled dot-product core (ScaledDotProduct):
//
//   StructureAttention — adds a learned bias per absolute
//     (query, key) position pair, read from a [max_len, max_len]
//     table and sliced to the active length. Models long-range
//     structural contacts that depend on where bases sit.
//     Accepts an optional external boolean mask.
//
//   MotifAttention — runs one 1-D convolution per motif over the
//     channel-major hidden states, averages the detector outputs
//     into one scalar per position, and adds that scalar to every
//     query row's score for that KEY position. A content prior
//     that is independent of sequence offset.
//
// Both apply the causal mask (key j > query i → -inf) before the
// row-wise softmax. Shapes: [batch, seq, dim] → [batch, seq, dim].

use burn::{
    module::Param,
    nn::{
        conv::{Conv1d, Conv1dConfig},
        Linear, LinearConfig, PaddingConfig1d,
    },
    prelude::*,
    tensor::{activation::softmax, Distribution},
};
use serde::{Deserialize, Serialize};

/// Motifs scanned by default: a TATA box and two short repeats.
pub const DEFAULT_MOTIFS: [&str; 3] = ["TATA", "GCGC", "ATAT"];

pub fn default_motifs() -> Vec<String> {
    DEFAULT_MOTIFS.iter().map(|m| m.to_string()).collect()
}

// ─── AttentionKind ────────────────────────────────────────────────────────────
/// Which mechanism a block uses. Serialised in the model config as
/// "structure" / "motif".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionKind {
    Structure,
    Motif,
}

impl AttentionKind {
    /// Default per-block policy: even depth → Structure, odd → Motif.
    pub fn alternating(depth: usize) -> Vec<Self> {
        (0..depth)
            .map(|i| if i % 2 == 0 { Self::Structure } else { Self::Motif })
            .collect()
    }
}

/// `[seq_len, seq_len]` mask that is true where key j > query i.
pub fn causal_mask<B: Backend>(seq_len: usize, device: &B::Device) -> Tensor<B, 2, Bool> {
    let idx  = Tensor::<B, 1, Int>::arange(0..seq_len as i64, device);
    let rows = idx.clone().reshape([seq_len, 1]).expand([seq_len, seq_len]);
    let cols = idx.reshape([1, seq_len]).expand([seq_len, seq_len]);
    cols.greater(rows)
}

// ─── ScaledDotProduct ─────────────────────────────────────────────────────────
/// Fused QKV projection, per-head scores and the output projection.
#[derive(Module, Debug)]
pub struct ScaledDotProduct<B: Backend> {
    pub qkv:      Linear<B>,
    pub out:      Linear<B>,
    pub heads:    usize,
    pub head_dim: usize,
}

impl<B: Backend> ScaledDotProduct<B> {
    pub fn new(dim: usize, heads: usize, device: &B::Device) -> Self {
        Self {
            qkv:      LinearConfig::new(dim, dim * 3).init(device),
            out:      LinearConfig::new(dim, dim).init(device),
            heads,
            head_dim: dim / heads,
        }
    }

    /// x: [b, t, c] → (scores [b, h, t, t], values [b, h, t, head_dim])
    pub fn scores_and_values(&self, x: Tensor<B, 3>) -> (Tensor<B, 4>, Tensor<B, 4>) {
        let [b, t, c] = x.dims();
        let qkv = self.qkv.forward(x);

        // Channel layout of the fused projection is [q | k | v]
        let q = self.split_heads(qkv.clone().slice([0..b, 0..t, 0..c]));
        let k = self.split_heads(qkv.clone().slice([0..b, 0..t, c..2 * c]));
        let v = self.split_heads(qkv.slice([0..b, 0..t, 2 * c..3 * c]));

        let scores = q.matmul(k.swap_dims(2, 3)) / (self.head_dim as f64).sqrt();
        (scores, v)
    }

    /// Softmax over keys, weight the values, merge heads, project.
    pub fn attend(&self, scores: Tensor<B, 4>, values: Tensor<B, 4>) -> Tensor<B, 3> {
        self.combine(softmax(scores, 3), values)
    }

    /// Apply already-normalised weights [b, h, t, t] to the values.
    pub fn combine(&self, weights: Tensor<B, 4>, values: Tensor<B, 4>) -> Tensor<B, 3> {
        let [b, _, t, _] = values.dims();
        let merged = weights
            .matmul(values)
            .swap_dims(1, 2)
            .reshape([b, t, self.heads * self.head_dim]);
        self.out.forward(merged)
    }

    fn split_heads(&self, x: Tensor<B, 3>) -> Tensor<B, 4> {
        let [b, t, _] = x.dims();
        x.reshape([b, t, self.heads, self.head_dim]).swap_dims(1, 2)
    }

    fn mask_future(&self, scores: Tensor<B, 4>) -> Tensor<B, 4> {
        let [b, h, t, _] = scores.dims();
        let causal = causal_mask::<B>(t, &scores.device())
            .reshape([1, 1, t, t])
            .expand([b, h, t, t]);
        scores.mask_fill(causal, f32::NEG_INFINITY)
    }
}

// ─── StructureAttention ───────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct StructureAttentionConfig {
    pub dim:     usize,
    pub heads:   usize,
    pub max_len: usize,
}

impl StructureAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> StructureAttention<B> {
        let table = Tensor::random(
            [self.max_len, self.max_len],
            Distribution::Normal(0.0, 1.0),
            device,
        );
        StructureAttention {
            projection:     ScaledDotProduct::new(self.dim, self.heads, device),
            structure_bias: Param::from_tensor(table),
        }
    }
}

#[derive(Module, Debug)]
pub struct StructureAttention<B: Backend> {
    pub projection: ScaledDotProduct<B>,
    /// Learned bias for every (query, key) absolute position pair
    pub structure_bias: Param<Tensor<B, 2>>,
}

impl<B: Backend> StructureAttention<B> {
    /// `mask`: optional `[b, t, t]`, true where attending is allowed.
    /// Applied after the causal mask.
    pub fn forward(&self, x: Tensor<B, 3>, mask: Option<Tensor<B, 3, Bool>>) -> Tensor<B, 3> {
        let [b, t, _] = x.dims();
        let heads = self.projection.heads;

        let (scores, values) = self.projection.scores_and_values(x);
        let bias = self
            .structure_bias
            .val()
            .slice([0..t, 0..t])
            .reshape([1, 1, t, t])
            .expand([b, heads, t, t]);

        let mut scores = self.projection.mask_future(scores + bias);
        if let Some(allowed) = mask {
            let blocked = allowed
                .bool_not()
                .reshape([b, 1, t, t])
                .expand([b, heads, t, t]);
            scores = scores.mask_fill(blocked, f32::NEG_INFINITY);
        }

        self.projection.attend(scores, values)
    }
}

// ─── MotifAttention ───────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct MotifAttentionConfig {
    pub dim:   usize,
    pub heads: usize,
    #[config(default = "default_motifs()")]
    pub motifs: Vec<String>,
}

impl MotifAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MotifAttention<B> {
        let widths: Vec<usize> = self.motifs.iter().map(|m| m.len()).collect();
        // One output channel per detector; padding w/2 on both sides
        // then an offset slice reproduces "same" alignment for even widths.
        let detectors = widths
            .iter()
            .map(|&w| {
                Conv1dConfig::new(self.dim, 1, w)
                    .with_padding(PaddingConfig1d::Explicit(w / 2))
                    .init(device)
            })
            .collect();
        MotifAttention {
            projection:      ScaledDotProduct::new(self.dim, self.heads, device),
            detectors,
            detector_widths: widths,
        }
    }
}

#[derive(Module, Debug)]
pub struct MotifAttention<B: Backend> {
    pub projection:      ScaledDotProduct<B>,
    pub detectors:       Vec<Conv1d<B>>,
    pub detector_widths: Vec<usize>,
}

impl<B: Backend> MotifAttention<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let (scores, values) = self.projection.scores_and_values(x.clone());
        let weights = self.biased_weights(scores, self.motif_bias(x));
        self.projection.combine(weights, values)
    }

    /// Causal softmax of `scores` [b, h, t, t] after adding `key_bias`
    /// [b, t] to every query row: key j gets `key_bias[.., j]` in all
    /// heads.
    pub fn biased_weights(&self, scores: Tensor<B, 4>, key_bias: Tensor<B, 2>) -> Tensor<B, 4> {
        let [b, h, t, _] = scores.dims();
        let bias = key_bias.reshape([b, 1, 1, t]).expand([b, h, t, t]);
        softmax(self.projection.mask_future(scores + bias), 3)
    }

    /// Mean detector response per position — shape [b, t]
    pub fn motif_bias(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [b, t, _] = x.dims();
        let channels_first = x.swap_dims(1, 2);

        let responses: Vec<Tensor<B, 3>> = self
            .detectors
            .iter()
            .zip(&self.detector_widths)
            .map(|(detector, &w)| {
                let offset = w / 2 - (w - 1) / 2;
                detector
                    .forward(channels_first.clone())
                    .slice([0..b, 0..1, offset..offset + t])
            })
            .collect();

        Tensor::cat(responses, 1).mean_dim(1).reshape([b, t])
    }
}

// ─── BlockAttention ───────────────────────────────────────────────────────────
/// The attention sub-layer of one transformer block, chosen at
/// construction time.
#[derive(Module, Debug)]
pub enum BlockAttention<B: Backend> {
    Structure(StructureAttention<B>),
    Motif(MotifAttention<B>),
}

impl<B: Backend> BlockAttention<B> {
    pub fn init(
        kind:    AttentionKind,
        dim:     usize,
        heads:   usize,
        max_len: usize,
        motifs:  &[String],
        device:  &B::Device,
    ) -> Self {
        match kind {
            AttentionKind::Structure => Self::Structure(
                StructureAttentionConfig::new(dim, heads, max_len).init(device),
            ),
            AttentionKind::Motif => Self::Motif(
                MotifAttentionConfig::new(dim, heads)
                    .with_motifs(motifs.to_vec())
                    .init(device),
            ),
        }
    }

    pub fn kind(&self) -> AttentionKind {
        match self {
            Self::Structure(_) => AttentionKind::Structure,
            Self::Motif(_)     => AttentionKind::Motif,
        }
    }

    /// The external mask only reaches structure-aware attention.
    pub fn forward(&self, x: Tensor<B, 3>, mask: Option<Tensor<B, 3, Bool>>) -> Tensor<B, 3> {
        match self {
            Self::Structure(attn) => attn.forward(x, mask),
            Self::Motif(attn)     => attn.forward(x),
        }
    }
}
