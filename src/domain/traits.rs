// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The pipeline talks to its two outside collaborators through
// traits so neither is baked in:
//
//   TextSegmenter   — turns a string into an ordered token list
//                     (whitespace, per-character, HuggingFace ...)
//   TrainableModel  — consumes one EncodedBatch per step and can
//                     snapshot / restore its weights
//
// Persistable covers the small artifacts (vocabulary, corpus
// summary) that must round-trip through disk between the build
// and training runs.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use std::path::Path;

use crate::domain::batch::EncodedBatch;
use crate::domain::error::Result;

// ─── TextSegmenter ────────────────────────────────────────────────────────────
/// Splits text into tokens. Must be deterministic: the same input
/// always gives the same tokens, or vocabularies built on different
/// runs would not line up.
pub trait TextSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>>;
}

impl<T: TextSegmenter + ?Sized> TextSegmenter for Box<T> {
    fn segment(&self, text: &str) -> Result<Vec<String>> {
        (**self).segment(text)
    }
}

// ─── TrainableModel ───────────────────────────────────────────────────────────
/// Anything that can learn from one batch at a time.
///
/// Implementations:
///   - BurnSeq2Seq → LSTM encoder-decoder on a burn backend
pub trait TrainableModel {
    /// Run one optimisation step and return the batch loss.
    fn fit(&mut self, batch: &EncodedBatch) -> anyhow::Result<f64>;

    /// Write the current weights to `path`, replacing any previous file.
    fn save(&self, path: &Path) -> anyhow::Result<()>;

    /// Replace the current weights with those stored at `path`.
    fn load(&mut self, path: &Path) -> anyhow::Result<()>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state can be saved and restored from disk.
///
/// Implementations (see infra::artifacts):
///   - Vocabulary → word→id JSON object
///   - CorpusMeta → corpus summary JSON
pub trait Persistable: Sized {
    fn save(&self, path: &Path) -> Result<()>;

    fn load(path: &Path) -> Result<Self>;
}
