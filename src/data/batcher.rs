// ============================================================
// Layer 4 — Sequence Batcher
// ============================================================
// Converts encoded sequences into the fixed-shape Int tensor the
// model consumes.
//
// Every row is fitted to exactly `max_len` tokens:
//   longer  → trailing tokens dropped
//   shorter → right-padded with the PAD id
//
//   [[5, 9, 7], [6]]  (max_len = 4)  →  [[5, 9, 7, 0],
//                                        [6, 0, 0, 0]]
//
// Rows keep their input order; row i of the batch is sequence i.

use burn::prelude::*;

use crate::domain::traits::SequenceEncoder;

/// A batch of token sequences — shape [batch_size, max_len]
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    pub tokens: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug)]
pub struct SequenceBatcher<B: Backend> {
    pub device:  B::Device,
    pub max_len: usize,
    pub pad_id:  u32,
}

impl<B: Backend> SequenceBatcher<B> {
    pub fn new(device: B::Device, max_len: usize, pad_id: u32) -> Self {
        Self { device, max_len, pad_id }
    }

    /// Truncate or right-pad `ids` to exactly `max_len`.
    pub fn fit(&self, ids: &[u32]) -> Vec<u32> {
        fit_to_length(ids, self.max_len, self.pad_id)
    }

    /// Stack already-encoded sequences into one batch.
    pub fn batch(&self, items: &[Vec<u32>]) -> SequenceBatch<B> {
        let batch_size = items.len();
        let flat: Vec<i32> = items
            .iter()
            .flat_map(|ids| self.fit(ids).into_iter().map(|x| x as i32))
            .collect();

        let tokens = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([batch_size, self.max_len]);

        SequenceBatch { tokens }
    }

    /// Encode raw sequences with `encoder` and batch them.
    pub fn encode_batch<E: SequenceEncoder, S: AsRef<str>>(
        &self,
        encoder:   &E,
        sequences: &[S],
    ) -> SequenceBatch<B> {
        let encoded: Vec<Vec<u32>> = sequences.iter().map(|s| encoder.encode(s.as_ref())).collect();
        self.batch(&encoded)
    }
}

/// Truncate or right-pad `ids` to exactly `max_len`.
pub fn fit_to_length(ids: &[u32], max_len: usize, pad_id: u32) -> Vec<u32> {
    let mut fitted: Vec<u32> = ids.iter().copied().take(max_len).collect();
    fitted.resize(max_len, pad_id);
    fitted
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    use crate::data::tokenizer::{KmerTokenizer, VocabConfig, PAD_ID};

    type TestBackend = NdArray;

    #[test]
    fn test_fit_truncates_and_pads() {
        assert_eq!(fit_to_length(&[1, 2, 3, 4, 5], 3, 0), vec![1, 2, 3]);
        assert_eq!(fit_to_length(&[7], 4, 0), vec![7, 0, 0, 0]);
        assert_eq!(fit_to_length(&[], 2, 9), vec![9, 9]);
    }

    #[test]
    fn test_batch_shape_and_row_order() {
        let batcher = SequenceBatcher::<TestBackend>::new(Default::default(), 4, PAD_ID);
        let batch   = batcher.batch(&[vec![5, 9, 7], vec![6]]);
        assert_eq!(batch.tokens.dims(), [2, 4]);

        let values: Vec<i64> = batch.tokens.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(values, vec![5, 9, 7, 0, 6, 0, 0, 0]);
    }

    #[test]
    fn test_encode_batch_uses_tokenizer() {
        let tok     = KmerTokenizer::build("ACGTACGT", VocabConfig::new(3)).unwrap();
        let batcher = SequenceBatcher::<TestBackend>::new(Default::default(), 6, PAD_ID);
        let batch   = batcher.encode_batch(&tok, &["ACGT", "A"]);
        assert_eq!(batch.tokens.dims(), [2, 6]);
    }
}
