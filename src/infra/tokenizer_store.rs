// ============================================================
// Layer 6 — HuggingFace Segmenter
// ============================================================
// Segments text with a pretrained `tokenizer.json`.
//
// Only the token strings are used. The tokenizer's own IDs are
// ignored: every token goes through the pipeline's Vocabulary so
// the reserved <unk>/<eos>/<go> IDs stay at 0/1/2 whatever the
// tokenizer file says.
//
// Special tokens are not added (encode(text, false)), otherwise
// [CLS]/[SEP]-style markers would leak into every sequence.
//
// Reference: HuggingFace tokenizers documentation

use std::path::Path;

use tokenizers::Tokenizer;

use crate::domain::{
    error::{PipelineError, Result},
    traits::TextSegmenter,
};

pub struct HfSegmenter {
    tokenizer: Tokenizer,
}

impl HfSegmenter {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Load a tokenizer JSON file saved by the HuggingFace tooling.
    pub fn from_file(path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| PipelineError::Tokenization {
            text:   path.display().to_string(),
            reason: format!("cannot load tokenizer: {e}"),
        })?;
        tracing::info!("Loaded tokenizer from '{}'", path.display());
        Ok(Self { tokenizer })
    }
}

impl TextSegmenter for HfSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| PipelineError::Tokenization {
                text:   text.to_string(),
                reason: e.to_string(),
            })?;
        Ok(encoding.get_tokens().to_vec())
    }
}
