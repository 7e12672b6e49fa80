// ============================================================
// Layer 4 — Built-in Text Segmenters
// ============================================================
// Two dependency-free TextSegmenter implementations:
//
//   WhitespaceSegmenter — "今日 は 晴れ" → ["今日", "は", "晴れ"]
//                         for text that is already word-split
//   CharSegmenter       — "今日は" → ["今", "日", "は"]
//                         for unsegmented Japanese when no
//                         morphological analyser is available
//
// A HuggingFace tokenizer can be plugged in instead through
// infra::tokenizer_store::HfSegmenter.
//
// Reference: Rust Book §8 (Strings — chars())

use crate::domain::error::Result;
use crate::domain::traits::TextSegmenter;

#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceSegmenter;

impl TextSegmenter for WhitespaceSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }
}

/// One token per character; whitespace is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharSegmenter;

impl TextSegmenter for CharSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>> {
        Ok(text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(String::from)
            .collect())
    }
}
