// ============================================================
// Layer 5 — Seq2Seq Network
// ============================================================
// A fixed encoder-decoder graph:
//
//   input ids [b, 1, r]
//       │ embedding (dict → embedding_dim)
//       ▼
//   LSTM encoder (→ hidden)                 [b, r, h]
//       │ last valid step, chosen by input_mask
//       ▼
//   thought vector                          [b, 1, h]
//       │ duplicated over the decoder's r steps
//       ▼
//   merge with one-hot decoder input        [b, r, dict + h]
//       │
//       ▼
//   LSTM decoder (→ hidden)                 [b, r, h]
//       │ linear (→ dict), softmax in the loss
//       ▼
//   logits                                  [b, r, dict]
//
// The loss is multi-class cross entropy against the one-hot
// prediction tensor, counted only where prediction_mask is 1.
//
// Reference: Burn Book §3 (Building Blocks)
//            Sutskever et al. (2014) Sequence to Sequence Learning

use burn::{
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig, Lstm, LstmConfig},
    prelude::*,
    tensor::activation::log_softmax,
};

use crate::data::batcher::Seq2SeqBatch;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct Seq2SeqConfig {
    pub dict_size: usize,
    #[config(default = 256)]
    pub embedding_dim: usize,
    #[config(default = 1024)]
    pub hidden_size: usize,
}

impl Seq2SeqConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Seq2SeqNet<B> {
        Seq2SeqNet {
            embedding: EmbeddingConfig::new(self.dict_size, self.embedding_dim).init(device),
            encoder:   LstmConfig::new(self.embedding_dim, self.hidden_size, true).init(device),
            decoder:   LstmConfig::new(self.dict_size + self.hidden_size, self.hidden_size, true)
                .init(device),
            output:    LinearConfig::new(self.hidden_size, self.dict_size).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct Seq2SeqNet<B: Backend> {
    pub embedding: Embedding<B>,
    pub encoder:   Lstm<B>,
    pub decoder:   Lstm<B>,
    pub output:    Linear<B>,
}

impl<B: Backend> Seq2SeqNet<B> {
    /// input [b, 1, r], decoder_input [b, dict, r], input_mask [b, r]
    /// → logits [b, r, dict]
    pub fn forward(
        &self,
        input:         Tensor<B, 3>,
        decoder_input: Tensor<B, 3>,
        input_mask:    Tensor<B, 2>,
    ) -> Tensor<B, 3> {
        let [batch, _, steps] = input.dims();

        let ids = input.reshape([batch, steps]).int();
        let embedded = self.embedding.forward(ids);
        let (encoded, _) = self.encoder.forward(embedded, None);

        let thought = last_valid_step(encoded, input_mask);
        let [_, _, hidden] = thought.dims();
        let duplicated = thought.expand([batch, steps, hidden]);

        let merged = Tensor::cat(vec![decoder_input.swap_dims(1, 2), duplicated], 2);
        let (decoded, _) = self.decoder.forward(merged, None);

        self.output.forward(decoded)
    }

    pub fn forward_loss(&self, batch: &Seq2SeqBatch<B>) -> Tensor<B, 1> {
        let logits = self.forward(
            batch.input.clone(),
            batch.decoder_input.clone(),
            batch.input_mask.clone(),
        );
        masked_cross_entropy(logits, batch.prediction.clone(), batch.prediction_mask.clone())
    }
}

/// Pick each row's hidden state at its last masked-in step.
///
/// For a left-aligned mask, `mask[t] - mask[t + 1]` is 1 exactly at
/// the last valid step, so the selection is a masked sum over time.
/// A row with an empty mask selects nothing and yields zeros.
pub fn last_valid_step<B: Backend>(sequence: Tensor<B, 3>, mask: Tensor<B, 2>) -> Tensor<B, 3> {
    let [batch, steps, _] = sequence.dims();
    let selector = if steps > 1 {
        let shifted = Tensor::cat(
            vec![
                mask.clone().slice([0..batch, 1..steps]),
                Tensor::zeros([batch, 1], &mask.device()),
            ],
            1,
        );
        mask - shifted
    } else {
        mask
    };
    (sequence * selector.unsqueeze_dim::<3>(2)).sum_dim(1)
}

/// logits [b, r, dict], target one-hot [b, dict, r] (channel-major),
/// mask [b, r] → mean negative log-likelihood over masked-in steps.
pub fn masked_cross_entropy<B: Backend>(
    logits: Tensor<B, 3>,
    target: Tensor<B, 3>,
    mask:   Tensor<B, 2>,
) -> Tensor<B, 1> {
    let [batch, steps, _] = logits.dims();
    let log_probs = log_softmax(logits, 2);
    let per_step = (log_probs * target.swap_dims(1, 2))
        .sum_dim(2)
        .reshape([batch, steps])
        .neg();
    let total = (per_step * mask.clone()).sum();
    total / mask.sum().clamp_min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batch_iterator::{BatchConfig, BatchIterator};
    use crate::data::batcher::Seq2SeqBatcher;
    use crate::domain::corpus::Example;
    use burn::backend::ndarray::NdArray;

    type TestBackend = NdArray;

    fn small_batch() -> Seq2SeqBatch<TestBackend> {
        let examples = vec![
            Example::new(vec![3, 4, 5], vec![4]),
            Example::new(vec![5], vec![3, 5]),
        ];
        let config = BatchConfig {
            batch_size:             2,
            batches_per_macrobatch: 1,
            dict_size:              6,
            row_size:               4,
        };
        let encoded = BatchIterator::new(examples, config).unwrap().next_batch().unwrap();
        Seq2SeqBatcher::<TestBackend>::new(Default::default()).to_device(&encoded)
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let net = Seq2SeqConfig::new(6)
            .with_embedding_dim(4)
            .with_hidden_size(5)
            .init::<TestBackend>(&device);
        let batch = small_batch();
        let logits = net.forward(batch.input, batch.decoder_input, batch.input_mask);
        assert_eq!(logits.dims(), [2, 4, 6]);
    }

    #[test]
    fn test_loss_is_finite_and_positive() {
        let device = Default::default();
        let net = Seq2SeqConfig::new(6)
            .with_embedding_dim(4)
            .with_hidden_size(5)
            .init::<TestBackend>(&device);
        let loss: f32 = net.forward_loss(&small_batch()).into_scalar().elem();
        assert!(loss.is_finite());
        assert!(loss > 0.0);
    }

    #[test]
    fn test_last_valid_step_follows_mask() {
        let device = Default::default();
        let sequence = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![10.0f32, 20.0, 30.0, 1.0, 2.0, 3.0], [2, 3, 1]),
            &device,
        );
        let mask = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![1.0f32, 1.0, 0.0, 0.0, 0.0, 0.0], [2, 3]),
            &device,
        );
        let picked: Vec<f32> = last_valid_step(sequence, mask).into_data().to_vec().unwrap();
        assert_eq!(picked, vec![20.0, 0.0]);
    }

    #[test]
    fn test_cross_entropy_of_confident_prediction_is_small() {
        let device = Default::default();
        // one row, one step, dict 3, logits strongly favour word 2
        let logits = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![-10.0f32, -10.0, 10.0], [1, 1, 3]),
            &device,
        );
        let target = Tensor::<TestBackend, 3>::from_data(
            TensorData::new(vec![0.0f32, 0.0, 1.0], [1, 3, 1]),
            &device,
        );
        let mask = Tensor::<TestBackend, 2>::ones([1, 1], &device);
        let loss: f32 = masked_cross_entropy(logits, target, mask).into_scalar().elem();
        assert!(loss < 1e-3);
    }
}
