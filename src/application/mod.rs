// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// user-facing goal each.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Segmenter choice shared by build-corpus and encode
pub mod segmentation;

// Raw pairs → persisted corpus
pub mod build_corpus_use_case;

// Persisted corpus → trained model
pub mod train_use_case;

// Corpus sizes and batch layout without training
pub mod inspect_use_case;

// Text → IDs through a built vocabulary
pub mod encode_use_case;
