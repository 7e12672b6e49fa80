// ============================================================
// Layer 4 — One-hot Construction
// ============================================================
// Pure functions that lay an ID sequence out as a channel-major
// one-hot block of shape [dict_size, row_size].
//
// Without a prefill sentinel, ID k of the sequence lights up
// position k:
//
//   ids = [A, B, <eos>]          t:  0   1   2   3
//                                A   1   .   .   .
//                                B   .   1   .   .
//                            <eos>   .   .   1   .
//
// With a prefill sentinel the sequence is shifted right by one
// and the sentinel occupies position 0. This is how the decoder
// input is built: it sees <go> at step 0 and the previous target
// token at every later step.
//
//   prediction:   A    B    C   ...  Z   <eos>
//   decoder:    <go>   A    B   C   ...    Z
//
// Positions past the sequence stay all-zero (padding).
//
// Reference: Rust Book §8 (Vectors and slices)

use crate::domain::error::{PipelineError, Result};

/// Number of time steps `ids` occupies once laid out.
pub fn encoded_length(ids: &[u32], prefill: Option<u32>) -> usize {
    ids.len() + usize::from(prefill.is_some())
}

/// Write the one-hot layout of `ids` into `out`, which must hold
/// exactly `dict_size * row_size` zeroed values.
pub fn fill_one_hot(
    out:       &mut [f32],
    ids:       &[u32],
    dict_size: usize,
    row_size:  usize,
    prefill:   Option<u32>,
) -> Result<()> {
    debug_assert_eq!(out.len(), dict_size * row_size);

    let length = encoded_length(ids, prefill);
    if length > row_size {
        return Err(PipelineError::InvalidConfig(format!(
            "{length} positions do not fit a row of {row_size}"
        )));
    }

    let steps = prefill.into_iter().chain(ids.iter().copied());
    for (t, id) in steps.enumerate() {
        if id as usize >= dict_size {
            return Err(PipelineError::IdOutOfRange { id, dict_size });
        }
        out[id as usize * row_size + t] = 1.0;
    }
    Ok(())
}

/// Allocate and fill a `[dict_size, row_size]` one-hot block.
pub fn build_one_hot(
    ids:       &[u32],
    dict_size: usize,
    row_size:  usize,
    prefill:   Option<u32>,
) -> Result<Vec<f32>> {
    let mut out = vec![0.0; dict_size * row_size];
    fill_one_hot(&mut out, ids, dict_size, row_size, prefill)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocabulary::{EOS_ID, GO_ID};

    fn at(block: &[f32], row_size: usize, word: usize, t: usize) -> f32 {
        block[word * row_size + t]
    }

    #[test]
    fn test_plain_layout() {
        let block = build_one_hot(&[4, 3, EOS_ID], 6, 4, None).unwrap();
        assert_eq!(at(&block, 4, 4, 0), 1.0);
        assert_eq!(at(&block, 4, 3, 1), 1.0);
        assert_eq!(at(&block, 4, 1, 2), 1.0);
        // padding column is empty
        assert!((0..6).all(|w| at(&block, 4, w, 3) == 0.0));
        assert_eq!(block.iter().sum::<f32>(), 3.0);
    }

    #[test]
    fn test_prefill_shifts_right() {
        let block = build_one_hot(&[4, 3], 6, 4, Some(GO_ID)).unwrap();
        assert_eq!(at(&block, 4, GO_ID as usize, 0), 1.0);
        assert_eq!(at(&block, 4, 4, 1), 1.0);
        assert_eq!(at(&block, 4, 3, 2), 1.0);
        assert_eq!(block.iter().sum::<f32>(), 3.0);
    }

    #[test]
    fn test_prefill_on_empty_sequence() {
        let block = build_one_hot(&[], 5, 2, Some(GO_ID)).unwrap();
        assert_eq!(at(&block, 2, GO_ID as usize, 0), 1.0);
        assert_eq!(block.iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_each_column_has_at_most_one_hot() {
        let block = build_one_hot(&[3, 3, 4, 0], 5, 6, Some(GO_ID)).unwrap();
        for t in 0..6 {
            let column: f32 = (0..5).map(|w| at(&block, 6, w, t)).sum();
            assert!(column <= 1.0);
        }
    }

    #[test]
    fn test_too_long_is_rejected() {
        assert!(build_one_hot(&[3, 3, 3], 5, 3, Some(GO_ID)).is_err());
        assert!(build_one_hot(&[3, 3, 3], 5, 3, None).is_ok());
    }

    #[test]
    fn test_out_of_range_id() {
        let err = build_one_hot(&[7], 5, 3, None).unwrap_err();
        assert!(matches!(err, PipelineError::IdOutOfRange { id: 7, dict_size: 5 }));
    }
}
