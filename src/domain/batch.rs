// ============================================================
// Layer 3 — EncodedBatch
// ============================================================
// One training step's worth of data, laid out as flat row-major
// f32 buffers. No device or framework; the ML layer turns these
// into tensors (see data::batcher).
//
// Shapes (rows = examples in this batch):
//
//   input            [rows, 1, row_size]         raw IDs, left-aligned
//   decoder_input    [rows, dict_size, row_size] one-hot, <go> first
//   prediction       [rows, dict_size, row_size] one-hot, <eos> last
//   input_mask       [rows, row_size]            1 = feature token
//   prediction_mask  [rows, row_size]            1 = label token or <eos>
//
// The one-hot tensors are channel-major: for a given row the
// dict_size axis comes before the time axis, so position t of
// word w lives at (w * row_size + t) inside that row's block.
//
// Reference: Rust Book §8 (Vectors)

/// Tensors for one batch, ready to hand to a trainable model.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBatch {
    pub rows:            usize,
    pub dict_size:       usize,
    pub row_size:        usize,
    pub input:           Vec<f32>,
    pub decoder_input:   Vec<f32>,
    pub prediction:      Vec<f32>,
    pub input_mask:      Vec<f32>,
    pub prediction_mask: Vec<f32>,
}

impl EncodedBatch {
    /// An all-zero batch of the given shape.
    pub fn zeros(rows: usize, dict_size: usize, row_size: usize) -> Self {
        Self {
            rows,
            dict_size,
            row_size,
            input:           vec![0.0; rows * row_size],
            decoder_input:   vec![0.0; rows * dict_size * row_size],
            prediction:      vec![0.0; rows * dict_size * row_size],
            input_mask:      vec![0.0; rows * row_size],
            prediction_mask: vec![0.0; rows * row_size],
        }
    }

    pub fn input_shape(&self) -> [usize; 3] {
        [self.rows, 1, self.row_size]
    }

    pub fn one_hot_shape(&self) -> [usize; 3] {
        [self.rows, self.dict_size, self.row_size]
    }

    pub fn mask_shape(&self) -> [usize; 2] {
        [self.rows, self.row_size]
    }

    /// Number of valid feature positions in `row`.
    pub fn input_length(&self, row: usize) -> usize {
        mask_sum(&self.input_mask, row, self.row_size)
    }

    /// Number of valid target positions in `row` (label + <eos>).
    pub fn prediction_length(&self, row: usize) -> usize {
        mask_sum(&self.prediction_mask, row, self.row_size)
    }

    /// Value of the decoder one-hot at (row, word, t).
    pub fn decoder_at(&self, row: usize, word: usize, t: usize) -> f32 {
        self.decoder_input[self.one_hot_index(row, word, t)]
    }

    /// Value of the prediction one-hot at (row, word, t).
    pub fn prediction_at(&self, row: usize, word: usize, t: usize) -> f32 {
        self.prediction[self.one_hot_index(row, word, t)]
    }

    fn one_hot_index(&self, row: usize, word: usize, t: usize) -> usize {
        (row * self.dict_size + word) * self.row_size + t
    }
}

fn mask_sum(mask: &[f32], row: usize, row_size: usize) -> usize {
    mask[row * row_size..(row + 1) * row_size]
        .iter()
        .filter(|&&m| m > 0.5)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_has_declared_shapes() {
        let b = EncodedBatch::zeros(3, 10, 4);
        assert_eq!(b.input.len(), 12);
        assert_eq!(b.decoder_input.len(), 120);
        assert_eq!(b.input_mask.len(), 12);
        assert_eq!(b.one_hot_shape(), [3, 10, 4]);
        assert_eq!(b.input_length(2), 0);
    }

    #[test]
    fn test_channel_major_indexing() {
        let mut b = EncodedBatch::zeros(2, 5, 3);
        // row 1, word 4, t 2
        b.prediction[(5 + 4) * 3 + 2] = 1.0;
        assert_eq!(b.prediction_at(1, 4, 2), 1.0);
        assert_eq!(b.prediction_at(0, 4, 2), 0.0);
    }
}
