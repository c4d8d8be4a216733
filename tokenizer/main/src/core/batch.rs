//! Left-side batch padding for causal generation.

/// A batch of token sequences padded to equal length.
///
/// `input_ids[i]` is the i-th sequence, padded on the left with the pad
/// token; `attention_mask[i]` is 0 over padding and 1 over real tokens;
/// `seq_lens[i]` is the unpadded length of the i-th sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedBatch {
    pub input_ids: Vec<Vec<u32>>,
    pub attention_mask: Vec<Vec<u32>>,
    pub seq_lens: Vec<usize>,
}

impl PaddedBatch {
    /// Number of sequences in the batch.
    pub fn rows(&self) -> usize {
        self.input_ids.len()
    }

    /// Padded length shared by every sequence (0 for an empty batch).
    pub fn padded_len(&self) -> usize {
        self.input_ids.first().map(Vec::len).unwrap_or(0)
    }
}

/// Pad `sequences` on the left with `pad_id` so that all rows share the
/// length of the longest sequence.
pub fn pad_left(sequences: &[Vec<u32>], pad_id: u32) -> PaddedBatch {
    let target = sequences.iter().map(Vec::len).max().unwrap_or(0);

    let mut input_ids = Vec::with_capacity(sequences.len());
    let mut attention_mask = Vec::with_capacity(sequences.len());
    let mut seq_lens = Vec::with_capacity(sequences.len());

    for seq in sequences {
        let pad = target - seq.len();
        let mut ids = vec![pad_id; pad];
        ids.extend_from_slice(seq);
        let mut mask = vec![0u32; pad];
        mask.extend(std::iter::repeat(1u32).take(seq.len()));
        input_ids.push(ids);
        attention_mask.push(mask);
        seq_lens.push(seq.len());
    }

    PaddedBatch {
        input_ids,
        attention_mask,
        seq_lens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_shorter_rows_on_the_left() {
        let batch = pad_left(&[vec![1, 2, 3], vec![7]], 0);
        assert_eq!(batch.input_ids, vec![vec![1, 2, 3], vec![0, 0, 7]]);
        assert_eq!(batch.attention_mask, vec![vec![1, 1, 1], vec![0, 0, 1]]);
        assert_eq!(batch.seq_lens, vec![3, 1]);
    }

    #[test]
    fn all_rows_end_at_same_position() {
        let batch = pad_left(&[vec![5], vec![1, 2], vec![9, 9, 9, 9]], 42);
        assert_eq!(batch.padded_len(), 4);
        for (ids, len) in batch.input_ids.iter().zip(&batch.seq_lens) {
            assert_eq!(ids.len(), 4);
            // Real tokens occupy the rightmost positions
            assert!(ids[..4 - len].iter().all(|&t| t == 42));
        }
    }

    #[test]
    fn equal_length_rows_are_unchanged() {
        let rows = vec![vec![1, 2], vec![3, 4]];
        let batch = pad_left(&rows, 0);
        assert_eq!(batch.input_ids, rows);
        assert!(batch.attention_mask.iter().all(|m| m == &vec![1, 1]));
    }

    #[test]
    fn empty_batch() {
        let batch = pad_left(&[], 0);
        assert_eq!(batch.rows(), 0);
        assert_eq!(batch.padded_len(), 0);
    }

    #[test]
    fn empty_sequence_is_all_padding() {
        let batch = pad_left(&[vec![], vec![1]], 7);
        assert_eq!(batch.input_ids[0], vec![7]);
        assert_eq!(batch.attention_mask[0], vec![0]);
    }
}
