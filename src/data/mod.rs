// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw paired text to device tensors.
//
//   raw pairs file
//       │
//       ▼
//   PairSource        → reads (text, label) rows
//       │
//       ▼
//   TextSegmenter     → splits each side into tokens
//       │
//       ▼
//   CorpusBuilder     → grows the vocabulary, freezes a Corpus,
//       │               persists row-aligned ID files
//       ▼
//   features.csv / labels.csv
//       │
//       ▼
//   BatchIterator     → batches + macro-batch windows,
//       │               padding, one-hot, masks
//       ▼
//   Seq2SeqBatcher    → tensors on the training device
//
// SequenceEncoder is the inference-time path: text → IDs
// through an existing vocabulary, without growing it.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads raw (text, label) rows from a delimited file
pub mod pair_source;

/// Whitespace and per-character segmenters
pub mod segmenter;

/// Token → ID mapping with <unk> fallback
pub mod encoder;

/// Vocabulary growth, corpus freeze and ID-file persistence
pub mod corpus_builder;

/// Row-aligned integer sequence files
pub mod id_file;

/// Pure one-hot block construction
pub mod one_hot;

/// Batch / macro-batch cursor and tensor layout
pub mod batch_iterator;

/// Producer-thread drain of one macro-batch window
pub mod prefetch;

/// EncodedBatch → burn tensors
pub mod batcher;
