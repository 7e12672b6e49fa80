// ============================================================
// Layer 2 — EncodeUseCase
// ============================================================
// Inference-time encoding against a built corpus:
//
//   text → segmenter → SequenceEncoder → IDs   (unseen → <unk>)
//   IDs  → SequenceEncoder::decode     → words
//
// The vocabulary is loaded read-only; encoding never grows it.

use anyhow::{Context, Result};

use crate::application::segmentation::{make_segmenter, SegmenterKind};
use crate::data::encoder::SequenceEncoder;
use crate::domain::{traits::TextSegmenter, vocabulary::Vocabulary};
use crate::infra::artifacts::CorpusArtifacts;

pub struct EncodeUseCase {
    vocabulary: Vocabulary,
    segmenter:  Box<dyn TextSegmenter>,
}

impl EncodeUseCase {
    /// Must use the same segmenter the corpus was built with.
    pub fn new(
        corpus_dir:     &str,
        segmenter:      SegmenterKind,
        tokenizer_path: Option<&str>,
    ) -> Result<Self> {
        let vocabulary = CorpusArtifacts::new(corpus_dir)
            .load_vocabulary()
            .with_context(|| format!("Cannot load vocabulary from '{corpus_dir}'"))?;
        let segmenter = make_segmenter(segmenter, tokenizer_path)?;
        Ok(Self { vocabulary, segmenter })
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let ids = SequenceEncoder::new(&self.vocabulary).encode_text(&self.segmenter, text)?;
        Ok(ids)
    }

    pub fn decode(&self, ids: &[u32]) -> Vec<String> {
        SequenceEncoder::new(&self.vocabulary)
            .decode(ids)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn dict_size(&self) -> usize {
        self.vocabulary.size()
    }
}
