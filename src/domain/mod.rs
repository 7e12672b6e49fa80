// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that define what the pipeline
// works with. No burn types, no file I/O, no ML code.
//
//   vocabulary — word ↔ id store with the reserved sentinels
//   corpus     — Example, Corpus, CorpusMeta, label-length policy
//   batch      — EncodedBatch, the host-side tensor layout
//   error      — PipelineError taxonomy
//   traits     — TextSegmenter, TrainableModel, Persistable
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

pub mod batch;

pub mod corpus;

pub mod error;

pub mod traits;

pub mod vocabulary;
