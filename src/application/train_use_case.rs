// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run. Step 4 runs first because a
// resumed run takes its batching and network shape from the
// saved train_config.json:
//
//   Step 1: Load corpus summary + vocabulary (Layer 6 - infra)
//   Step 2: Check they agree                 (Layer 3 - domain)
//   Step 3: Load the ID files into a
//           BatchIterator                    (Layer 4 - data)
//   Step 4: Decide fresh start or resume     (Layer 6 - infra)
//   Step 5: Save config                      (Layer 6 - infra)
//   Step 6: Run training loop                (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::batch_iterator::{BatchConfig, BatchIterator};
use crate::domain::{corpus::CorpusMeta, error::PipelineError};
use crate::infra::{artifacts::CorpusArtifacts, checkpoint::CheckpointManager};
use crate::ml::trainer::{run_training, TrainingPlan, TrainingSummary};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub corpus_dir:               String,
    pub checkpoint_dir:           String,
    pub batch_size:               usize,
    pub batches_per_macrobatch:   usize,
    /// Tensor width; defaults to the corpus row size
    pub row_size:                 Option<usize>,
    /// Header lines to skip in the ID files; defaults to the corpus value
    pub skip_rows:                Option<usize>,
    /// Batch cursor epoch 1 starts from
    pub start_batch:              usize,
    pub epochs:                   usize,
    pub learning_rate:            f64,
    pub embedding_dim:            usize,
    pub hidden_size:              usize,
    pub grad_clip_norm:           f32,
    pub checkpoint_interval_secs: u64,
    /// Batches built ahead of the model; 0 disables the producer thread
    pub prefetch_depth:           usize,
    pub resume:                   bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_dir:               "corpus".to_string(),
            checkpoint_dir:           "checkpoints".to_string(),
            batch_size:               200,
            batches_per_macrobatch:   2,
            row_size:                 None,
            skip_rows:                None,
            start_batch:              0,
            epochs:                   599,
            learning_rate:            5e-2,
            embedding_dim:            256,
            hidden_size:              1024,
            grad_clip_norm:           1.0,
            checkpoint_interval_secs: 100,
            prefetch_depth:           2,
            resume:                   false,
        }
    }
}

impl TrainConfig {
    /// Copy of `self` whose network shape and batch numbering come
    /// from the run being resumed. The saved batch cursor only points
    /// at the same examples under the same batching.
    pub fn resumed_from(&self, saved: &TrainConfig) -> TrainConfig {
        let overridden = [
            ("batch_size", self.batch_size, saved.batch_size),
            ("batches_per_macrobatch", self.batches_per_macrobatch, saved.batches_per_macrobatch),
            ("embedding_dim", self.embedding_dim, saved.embedding_dim),
            ("hidden_size", self.hidden_size, saved.hidden_size),
        ];
        for (name, requested, kept) in overridden {
            if requested != kept {
                tracing::warn!("Resuming with saved {name}={kept}, ignoring {requested}");
            }
        }
        if self.row_size != saved.row_size || self.skip_rows != saved.skip_rows {
            tracing::warn!(
                "Resuming with saved row_size={:?} skip_rows={:?}",
                saved.row_size,
                saved.skip_rows,
            );
        }

        TrainConfig {
            batch_size:             saved.batch_size,
            batches_per_macrobatch: saved.batches_per_macrobatch,
            row_size:               saved.row_size,
            skip_rows:              saved.skip_rows,
            embedding_dim:          saved.embedding_dim,
            hidden_size:            saved.hidden_size,
            ..self.clone()
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training run end to end
    pub fn execute(&self) -> Result<TrainingSummary> {
        // ── Step 4 first: it may replace the batching settings ────────────────
        let ckpt_manager = CheckpointManager::new(&self.config.checkpoint_dir)?;
        let (cfg, plan) = self.plan(&ckpt_manager)?;

        // ── Steps 1-3: Corpus ─────────────────────────────────────────────────
        let (_, iter) = load_batches(&cfg)?;

        if plan.is_empty() {
            tracing::info!("All {} epochs already trained", cfg.epochs);
            return Ok(TrainingSummary::default());
        }

        // ── Step 5: Save config ───────────────────────────────────────────────
        ckpt_manager.save_config(&cfg)?;

        // ── Step 6: Run training loop (Layer 5) ───────────────────────────────
        run_training(&cfg, iter, &plan, &ckpt_manager, cfg.resume)
    }

    /// Load the persisted corpus and wrap it in a BatchIterator.
    pub fn load_batches(&self) -> Result<(CorpusMeta, BatchIterator)> {
        load_batches(&self.config)
    }

    /// Fresh start, or the saved cursor and settings of a backup.
    fn plan(&self, ckpt_manager: &CheckpointManager) -> Result<(TrainConfig, TrainingPlan)> {
        if !self.config.resume {
            return Ok((self.config.clone(), TrainingPlan::fresh(&self.config)));
        }

        let Some(state) = ckpt_manager.load_state()? else {
            bail!(
                "Nothing to resume: no training state in '{}'",
                ckpt_manager.dir().display()
            );
        };
        let saved = ckpt_manager.load_config()?;
        let cfg = self.config.resumed_from(&saved);

        tracing::info!(
            "Resuming at epoch {} batch {}{}",
            state.epoch,
            state.batch,
            if state.completed { " (completed)" } else { "" },
        );
        let plan = TrainingPlan::resuming(&cfg, state);
        Ok((cfg, plan))
    }
}

fn load_batches(cfg: &TrainConfig) -> Result<(CorpusMeta, BatchIterator)> {
    let artifacts = CorpusArtifacts::new(&cfg.corpus_dir);

    let meta = artifacts
        .load_meta()
        .with_context(|| format!("Cannot load corpus summary from '{}'", cfg.corpus_dir))?;
    let vocabulary = artifacts
        .load_vocabulary()
        .with_context(|| format!("Cannot load vocabulary from '{}'", cfg.corpus_dir))?;

    if vocabulary.size() != meta.dict_size {
        return Err(PipelineError::VocabularyInconsistency(format!(
            "corpus.json records dict_size {} but vocabulary.json holds {} words",
            meta.dict_size,
            vocabulary.size()
        ))
        .into());
    }

    let batch_config = BatchConfig {
        batch_size:             cfg.batch_size,
        batches_per_macrobatch: cfg.batches_per_macrobatch,
        dict_size:              meta.dict_size,
        row_size:               cfg.row_size.unwrap_or(meta.row_size),
    };
    let skip_rows = cfg.skip_rows.unwrap_or(meta.header_rows);

    let iter = BatchIterator::from_files(
        &artifacts.features_path(),
        &artifacts.labels_path(),
        skip_rows,
        batch_config,
    )
    .with_context(|| format!("Cannot load ID files from '{}'", cfg.corpus_dir))?;

    if iter.example_count() != meta.example_count {
        tracing::warn!(
            "corpus.json records {} examples but the ID files hold {}",
            meta.example_count,
            iter.example_count(),
        );
    }
    tracing::info!(
        "Loaded {} examples: {} batches of {}, {} macro-batches, row_size={}",
        iter.example_count(),
        iter.total_batches(),
        batch_config.batch_size,
        iter.total_macro_batches(),
        batch_config.row_size,
    );
    Ok((meta, iter))
}
