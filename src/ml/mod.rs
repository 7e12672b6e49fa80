// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Burn-specific code for the network and its training. Apart
// from data::batcher, no other layer builds tensors.
//
// What's in this layer:
//
//   model.rs     — The encoder-decoder architecture
//                  • Token embedding
//                  • LSTM encoder, thought vector by input mask
//                  • Thought vector duplicated over decoder steps
//                  • LSTM decoder over [one-hot ; thought]
//                  • Linear head, masked cross entropy
//
//   seq2seq.rs   — BurnSeq2Seq: network + optimiser behind the
//                  TrainableModel trait, CompactRecorder weights
//
//   trainer.rs   — The macro-batch training loop with timed
//                  backups, and the Wgpu entry point
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Sutskever et al. (2014) Sequence to Sequence Learning

/// LSTM encoder-decoder architecture
pub mod model;

/// TrainableModel adaptor over a burn network and optimiser
pub mod seq2seq;

/// Macro-batch training loop with checkpointing
pub mod trainer;
