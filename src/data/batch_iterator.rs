// ============================================================
// Layer 4 — Batch Iterator
// ============================================================
// Groups examples into batches and batches into macro-batches,
// and turns the batch under the cursor into an EncodedBatch.
//
//   examples:  e0 e1 | e2 e3 | e4 e5 | e6      (batch_size = 2)
//   batches:     b0  |  b1   |  b2   | b3
//   macro:     [ m0: b0 b1 ] [ m1: b2 b3 ]     (batches_per_macrobatch = 2)
//
// Iteration is scoped to one macro-batch window at a time:
// has_next() turns false as soon as the cursor reaches the first
// batch of the next window, even if batches remain. The caller
// moves on with next_macro_batch(). Together with
// set_current_batch() this lets a training run resume at the
// batch it was at when it stopped.
//
// The cursor is a single Position value. It is replaced, never
// patched field by field:
//
//   batch        next batch to materialise
//   macro_batch  the active window
//
// Position::of_batch() is the pure mapping from a batch index to
// the window containing it.
//
// Concurrency: the iterator is Send and may be driven from a
// prefetching producer thread (see data::prefetch), but it holds
// no lock. At most one next_batch() may be in flight at a time.
//
// Reference: Rust Book §13 (Iterator trait)
//            Burn Book §4 (Batchers)

use std::path::Path;

use crate::data::id_file::read_id_rows;
use crate::data::one_hot::fill_one_hot;
use crate::domain::batch::EncodedBatch;
use crate::domain::corpus::Example;
use crate::domain::error::{PipelineError, Result};
use crate::domain::vocabulary::{EOS_ID, GO_ID};

// ─── Position ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub batch:       usize,
    pub macro_batch: usize,
}

impl Position {
    /// The position of `batch` with the window set to the
    /// macro-batch that contains it.
    pub fn of_batch(batch: usize, batches_per_macrobatch: usize) -> Self {
        Self { batch, macro_batch: batch / batches_per_macrobatch }
    }

    fn with_batch(self, batch: usize) -> Self {
        Self { batch, ..self }
    }

    fn with_macro_batch(self, macro_batch: usize) -> Self {
        Self { macro_batch, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorState {
    Ready,
    Exhausted,
}

// ─── BatchConfig ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub batch_size:             usize,
    pub batches_per_macrobatch: usize,
    pub dict_size:              usize,
    pub row_size:               usize,
}

impl BatchConfig {
    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig("batch_size must be positive".into()));
        }
        if self.batches_per_macrobatch == 0 {
            return Err(PipelineError::InvalidConfig(
                "batches_per_macrobatch must be positive".into(),
            ));
        }
        if self.row_size == 0 {
            return Err(PipelineError::InvalidConfig("row_size must be positive".into()));
        }
        // <unk>, <eos> and <go> must be addressable
        if self.dict_size <= GO_ID as usize {
            return Err(PipelineError::InvalidConfig(format!(
                "dict_size {} cannot hold the reserved tokens",
                self.dict_size
            )));
        }
        Ok(())
    }
}

// ─── BatchIterator ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct BatchIterator {
    examples:            Vec<Example>,
    config:              BatchConfig,
    total_batches:       usize,
    total_macro_batches: usize,
    cursor:              Position,
}

impl BatchIterator {
    /// Iterate over in-memory examples.
    ///
    /// Every ID must be below `dict_size`, every feature must fit in
    /// `row_size` and every label must fit with its appended <eos>.
    pub fn new(examples: Vec<Example>, config: BatchConfig) -> Result<Self> {
        config.validate()?;
        for (row, example) in examples.iter().enumerate() {
            check_example(row, example, &config)?;
        }

        let total_batches = examples.len().div_ceil(config.batch_size);
        let total_macro_batches = total_batches.div_ceil(config.batches_per_macrobatch);

        tracing::debug!(
            "BatchIterator: {} examples, {} batches, {} macro-batches",
            examples.len(),
            total_batches,
            total_macro_batches,
        );

        Ok(Self {
            examples,
            config,
            total_batches,
            total_macro_batches,
            cursor: Position::default(),
        })
    }

    /// Load two row-aligned ID files, skipping `header_rows` lines
    /// at the top of each.
    pub fn from_files(
        feature_path: &Path,
        label_path:   &Path,
        header_rows:  usize,
        config:       BatchConfig,
    ) -> Result<Self> {
        let features = read_id_rows(feature_path, header_rows)?;
        let labels = read_id_rows(label_path, header_rows)?;
        if features.len() != labels.len() {
            return Err(PipelineError::RaggedCorpus {
                features: features.len(),
                labels:   labels.len(),
            });
        }

        let examples = features
            .into_iter()
            .zip(labels)
            .map(|(f, l)| Example::new(f, l))
            .collect();
        Self::new(examples, config)
    }

    // ── Cursor queries ───────────────────────────────────────────────────────

    /// True while the cursor is inside the corpus and inside the
    /// active macro-batch window.
    pub fn has_next(&self) -> bool {
        self.cursor.batch < self.total_batches
            && self.window_of(self.cursor.batch) == self.cursor.macro_batch
    }

    pub fn has_next_macro_batch(&self) -> bool {
        self.window_of(self.cursor.batch) < self.total_macro_batches
            && self.cursor.macro_batch < self.total_macro_batches
    }

    pub fn state(&self) -> IteratorState {
        if self.cursor.batch < self.total_batches {
            IteratorState::Ready
        } else {
            IteratorState::Exhausted
        }
    }

    pub fn position(&self) -> Position {
        self.cursor
    }

    pub fn current_batch(&self) -> usize {
        self.cursor.batch
    }

    pub fn current_macro_batch(&self) -> usize {
        self.cursor.macro_batch
    }

    pub fn total_batches(&self) -> usize {
        self.total_batches
    }

    pub fn total_macro_batches(&self) -> usize {
        self.total_macro_batches
    }

    pub fn example_count(&self) -> usize {
        self.examples.len()
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Only a full rewind is offered; there is no arbitrary seek
    /// beyond set_current_batch().
    pub fn reset_supported(&self) -> bool {
        false
    }

    /// Safe to drive from a prefetching producer thread.
    pub fn async_supported(&self) -> bool {
        true
    }

    // ── Cursor moves ─────────────────────────────────────────────────────────

    /// Build the batch under the cursor and advance by one batch.
    /// The active window is left alone.
    pub fn next_batch(&mut self) -> Result<EncodedBatch> {
        let batch = self.cursor.batch;
        if batch >= self.total_batches {
            return Err(PipelineError::BatchBounds {
                requested: batch,
                total:     self.total_batches,
            });
        }

        let start = batch * self.config.batch_size;
        let end = (start + self.config.batch_size).min(self.examples.len());
        let encoded = encode_batch(&self.examples[start..end], &self.config)?;

        self.cursor = self.cursor.with_batch(batch + 1);
        Ok(encoded)
    }

    /// Open the next macro-batch window. The batch cursor is kept.
    pub fn next_macro_batch(&mut self) {
        self.cursor = self.cursor.with_macro_batch(self.cursor.macro_batch + 1);
    }

    /// Rewind to the first batch of the first window. Data is not reloaded.
    pub fn reset(&mut self) {
        self.cursor = Position::default();
    }

    /// Jump to `batch` (for resuming), opening the window that holds it.
    /// `batch == total_batches` is allowed and leaves the iterator exhausted.
    pub fn set_current_batch(&mut self, batch: usize) -> Result<()> {
        if batch > self.total_batches {
            return Err(PipelineError::BatchBounds {
                requested: batch,
                total:     self.total_batches,
            });
        }
        self.cursor = Position::of_batch(batch, self.config.batches_per_macrobatch);
        Ok(())
    }

    fn window_of(&self, batch: usize) -> usize {
        Position::of_batch(batch, self.config.batches_per_macrobatch).macro_batch
    }
}

/// Yields the batches of the active window, then stops.
impl Iterator for BatchIterator {
    type Item = EncodedBatch;

    fn next(&mut self) -> Option<EncodedBatch> {
        if !self.has_next() {
            return None;
        }
        // Bounds and row contents were validated at construction,
        // so this cannot fail while has_next() holds.
        self.next_batch().ok()
    }
}

// ─── Row encoding ─────────────────────────────────────────────────────────────

fn check_example(row: usize, example: &Example, config: &BatchConfig) -> Result<()> {
    if let Some(&id) = example
        .features
        .iter()
        .chain(&example.labels)
        .find(|&&id| id as usize >= config.dict_size)
    {
        return Err(PipelineError::IdOutOfRange { id, dict_size: config.dict_size });
    }
    let needed = example.features.len().max(example.labels.len() + 1);
    if needed > config.row_size {
        return Err(PipelineError::SequenceTooLong {
            row,
            length:   needed,
            row_size: config.row_size,
        });
    }
    Ok(())
}

/// Lay a slice of examples out as one EncodedBatch.
pub fn encode_batch(examples: &[Example], config: &BatchConfig) -> Result<EncodedBatch> {
    let BatchConfig { dict_size, row_size, .. } = *config;
    let block = dict_size * row_size;
    let mut out = EncodedBatch::zeros(examples.len(), dict_size, row_size);

    for (j, example) in examples.iter().enumerate() {
        let line = j * row_size..(j + 1) * row_size;

        // input: raw IDs, not one-hot
        let input = &mut out.input[line.clone()];
        for (slot, &id) in input.iter_mut().zip(&example.features) {
            *slot = id as f32;
        }
        out.input_mask[line.clone()][..example.features.len()].fill(1.0);

        // target = label + <eos>
        let mut target = Vec::with_capacity(example.labels.len() + 1);
        target.extend_from_slice(&example.labels);
        target.push(EOS_ID);
        out.prediction_mask[line][..target.len()].fill(1.0);

        let cube = j * block..(j + 1) * block;
        fill_one_hot(&mut out.prediction[cube.clone()], &target, dict_size, row_size, None)?;
        fill_one_hot(&mut out.decoder_input[cube], &example.labels, dict_size, row_size, Some(GO_ID))?;
    }

    Ok(out)
}
