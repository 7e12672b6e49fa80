// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the concerns that touch disk or third-party formats
// and don't belong in any business layer:
//
//   artifacts.rs       — Corpus directory layout
//                        Paths of the ID files and JSON writers
//                        for the vocabulary and corpus summary.
//
//   checkpoint.rs      — Rolling model backup
//                        Weights, cursor state and the training
//                        config, overwritten on every save.
//
//   tokenizer_store.rs — HuggingFace segmenter
//                        Wraps a pretrained tokenizer.json as a
//                        TextSegmenter.
//
//   metrics.rs         — Training metrics logging
//                        One CSV row per macro-batch.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling)

/// Corpus directory layout and JSON artifacts
pub mod artifacts;

/// Model backup saving and loading
pub mod checkpoint;

/// Pretrained tokenizer as a TextSegmenter
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
