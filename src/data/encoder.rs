// ============================================================
// Layer 4 — Sequence Encoder
// ============================================================
// Maps token sequences to vocabulary IDs for inference-time use.
//
//   ["今日", "は", "雨"]  →  [3, 4, 0]     ("雨" unseen → <unk>)
//
// The encoder only borrows the vocabulary immutably, so it can
// never grow it; growth happens only inside CorpusBuilder.
// Output length always equals input length: no truncation and
// no padding here (padding belongs to the BatchIterator).
//
// Reference: Rust Book §4 (References and Borrowing)
//            Rust Book §13 (Iterators)

use crate::domain::error::Result;
use crate::domain::traits::TextSegmenter;
use crate::domain::vocabulary::{Vocabulary, UNK_ID};

#[derive(Debug, Clone, Copy)]
pub struct SequenceEncoder<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> SequenceEncoder<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Map each token to its ID, falling back to <unk>.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        tokens
            .iter()
            .map(|t| self.vocabulary.id_of(t.as_ref()).unwrap_or(UNK_ID))
            .collect()
    }

    /// Segment `text` and encode the result.
    pub fn encode_text<T: TextSegmenter + ?Sized>(&self, segmenter: &T, text: &str) -> Result<Vec<u32>> {
        let tokens = segmenter.segment(text)?;
        Ok(self.encode(&tokens))
    }

    /// Map IDs back to words. IDs the vocabulary does not cover come
    /// back as "<unk>".
    pub fn decode(&self, ids: &[u32]) -> Vec<&'a str> {
        let unknown = self.vocabulary.word_of(UNK_ID).unwrap_or("<unk>");
        ids.iter()
            .map(|&id| self.vocabulary.word_of(id).unwrap_or(unknown))
            .collect()
    }
}
