// ============================================================
// Layer 4 — Seq2Seq Batcher
// ============================================================
// Moves an EncodedBatch from host buffers onto a burn device.
//
// What is a Batcher?
//   The BatchIterator already did the hard part (padding, one-hot,
//   masks). This step only wraps each flat Vec<f32> in a tensor
//   with the right shape, on the right device. Through burn's
//   Batcher trait several EncodedBatches can also be stacked into
//   one Seq2SeqBatch along the row axis.
//
// Shapes produced:
//   input            [rows, 1, row_size]
//   decoder_input    [rows, dict_size, row_size]
//   prediction       [rows, dict_size, row_size]
//   input_mask       [rows, row_size]
//   prediction_mask  [rows, row_size]
//
// B is the Burn Backend (e.g. Wgpu, NdArray), generic so the
// same batcher works on any device.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::batch::EncodedBatch;

/// One batch of seq2seq tensors on a device.
#[derive(Debug, Clone)]
pub struct Seq2SeqBatch<B: Backend> {
    pub input:           Tensor<B, 3>,
    pub decoder_input:   Tensor<B, 3>,
    pub prediction:      Tensor<B, 3>,
    pub input_mask:      Tensor<B, 2>,
    pub prediction_mask: Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct Seq2SeqBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> Seq2SeqBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Wrap one EncodedBatch in device tensors.
    pub fn to_device(&self, batch: &EncodedBatch) -> Seq2SeqBatch<B> {
        let one_hot = batch.one_hot_shape();
        let mask = batch.mask_shape();

        Seq2SeqBatch {
            input:           self.tensor(batch.input.clone(), batch.input_shape()),
            decoder_input:   self.tensor(batch.decoder_input.clone(), one_hot),
            prediction:      self.tensor(batch.prediction.clone(), one_hot),
            input_mask:      self.tensor(batch.input_mask.clone(), mask),
            prediction_mask: self.tensor(batch.prediction_mask.clone(), mask),
        }
    }

    fn tensor<const D: usize>(&self, values: Vec<f32>, shape: [usize; D]) -> Tensor<B, D> {
        Tensor::<B, D>::from_data(TensorData::new(values, shape), &self.device)
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
// Stacks several encoded batches row-wise. All items must share
// dict_size and row_size; `items` must not be empty.
impl<B: Backend> Batcher<EncodedBatch, Seq2SeqBatch<B>> for Seq2SeqBatcher<B> {
    fn batch(&self, items: Vec<EncodedBatch>) -> Seq2SeqBatch<B> {
        let parts: Vec<Seq2SeqBatch<B>> = items.iter().map(|b| self.to_device(b)).collect();

        let mut input           = Vec::with_capacity(parts.len());
        let mut decoder_input   = Vec::with_capacity(parts.len());
        let mut prediction      = Vec::with_capacity(parts.len());
        let mut input_mask      = Vec::with_capacity(parts.len());
        let mut prediction_mask = Vec::with_capacity(parts.len());
        for part in parts {
            input.push(part.input);
            decoder_input.push(part.decoder_input);
            prediction.push(part.prediction);
            input_mask.push(part.input_mask);
            prediction_mask.push(part.prediction_mask);
        }

        Seq2SeqBatch {
            input:           Tensor::cat(input, 0),
            decoder_input:   Tensor::cat(decoder_input, 0),
            prediction:      Tensor::cat(prediction, 0),
            input_mask:      Tensor::cat(input_mask, 0),
            prediction_mask: Tensor::cat(prediction_mask, 0),
        }
    }
}
