// ============================================================
// Layer 2 — Segmenter Selection
// ============================================================
// Turns the configured segmenter name into a TextSegmenter.
// Shared by build-corpus and encode so both segment text the
// same way.
//
// Reference: Rust Book §17 (Trait Objects)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::segmenter::{CharSegmenter, WhitespaceSegmenter};
use crate::domain::traits::TextSegmenter;
use crate::infra::tokenizer_store::HfSegmenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmenterKind {
    #[default]
    Whitespace,
    Char,
    /// Pretrained HuggingFace tokenizer.json
    HuggingFace,
}

pub fn make_segmenter(
    kind:           SegmenterKind,
    tokenizer_path: Option<&str>,
) -> Result<Box<dyn TextSegmenter>> {
    Ok(match kind {
        SegmenterKind::Whitespace => Box::new(WhitespaceSegmenter),
        SegmenterKind::Char => Box::new(CharSegmenter),
        SegmenterKind::HuggingFace => {
            let Some(path) = tokenizer_path else {
                bail!("the hugging-face segmenter needs --tokenizer <tokenizer.json>");
            };
            Box::new(HfSegmenter::from_file(Path::new(path))?)
        }
    })
}
