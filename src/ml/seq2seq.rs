// ============================================================
// Layer 5 — BurnSeq2Seq (TrainableModel on burn)
// ============================================================
// Adapts Seq2SeqNet + an optimiser to the TrainableModel trait,
// so the training loop only ever sees EncodedBatch in, loss out.
//
// One fit() step:
//   EncodedBatch → Seq2SeqBatcher → tensors on device
//   forward_loss → backward → GradientsParams → optim.step
//
// Weights are stored with CompactRecorder (MessagePack, half
// precision). The recorder appends its own file extension.
//
// Reference: Burn Book §5 (Training, Records)
//            Tieleman & Hinton (2012) RMSProp

use std::path::Path;

use anyhow::{anyhow, Result};
use burn::{
    optim::{GradientsParams, Optimizer},
    prelude::*,
    record::CompactRecorder,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::Seq2SeqBatcher;
use crate::domain::{batch::EncodedBatch, traits::TrainableModel};
use crate::ml::model::Seq2SeqNet;

pub struct BurnSeq2Seq<B: AutodiffBackend, O> {
    net:           Seq2SeqNet<B>,
    optim:         O,
    learning_rate: f64,
    batcher:       Seq2SeqBatcher<B>,
}

impl<B, O> BurnSeq2Seq<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Seq2SeqNet<B>, B>,
{
    pub fn new(net: Seq2SeqNet<B>, optim: O, learning_rate: f64, device: B::Device) -> Self {
        Self {
            net,
            optim,
            learning_rate,
            batcher: Seq2SeqBatcher::new(device),
        }
    }

    pub fn net(&self) -> &Seq2SeqNet<B> {
        &self.net
    }
}

impl<B, O> TrainableModel for BurnSeq2Seq<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Seq2SeqNet<B>, B>,
{
    fn fit(&mut self, batch: &EncodedBatch) -> Result<f64> {
        let batch = self.batcher.to_device(batch);
        let loss = self.net.forward_loss(&batch);
        let loss_value: f64 = loss.clone().into_scalar().elem::<f64>();

        let grads = GradientsParams::from_grads(loss.backward(), &self.net);
        self.net = self.optim.step(self.learning_rate, self.net.clone(), grads);

        if !loss_value.is_finite() {
            tracing::warn!("Non-finite batch loss: {}", loss_value);
        }
        Ok(loss_value)
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.net
            .clone()
            .save_file(path.to_path_buf(), &CompactRecorder::new())
            .map_err(|e| anyhow!("Cannot save weights to '{}': {e:?}", path.display()))
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        self.net = self
            .net
            .clone()
            .load_file(path.to_path_buf(), &CompactRecorder::new(), &self.batcher.device)
            .map_err(|e| anyhow!("Cannot load weights from '{}': {e:?}", path.display()))?;
        Ok(())
    }
}
