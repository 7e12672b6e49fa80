// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Keeps one rolling backup of a training run.
//
// What gets saved per checkpoint:
//   1. Model weights (model.mpk)  — overwritten on every save
//   2. training_state.json        — epoch and batch cursor reached
//   3. train_config.json          — hyperparameters of the run
//
// Only the latest backup is kept: training saves on a timer, not
// per epoch, and a long run would otherwise fill the disk.
//
// Resuming reads training_state.json, reloads the weights and
// restarts the batch cursor where the backup was taken.
//
// File layout:
//   checkpoints/
//     model.mpk             ← weights (recorder adds the extension)
//     training_state.json   ← {"epoch": 3, "batch": 12, "completed": false}
//     train_config.json     ← TrainConfig
//     metrics.csv           ← see infra::metrics
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::traits::TrainableModel;

/// Where a run stopped, so a later run can pick it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingState {
    /// Epoch being trained when the backup was taken (starts at 1)
    pub epoch:     usize,
    /// Batch cursor at that moment
    pub batch:     usize,
    /// True once the final epoch has finished
    #[serde(default)]
    pub completed: bool,
}

/// Manages the backup files of one training run.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Weights path without extension; the recorder appends its own.
    pub fn model_path(&self) -> PathBuf {
        self.dir.join("model")
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join("training_state.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join("train_config.json")
    }

    /// Overwrite the backup with the model's current weights and
    /// the cursor it was taken at.
    pub fn save_backup<M: TrainableModel + ?Sized>(
        &self,
        model: &M,
        state: TrainingState,
    ) -> Result<()> {
        let path = self.model_path();
        model
            .save(&path)
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;
        self.save_state(&state)?;

        tracing::info!(
            "Saved backup at epoch {} batch {} to '{}'",
            state.epoch,
            state.batch,
            self.dir.display(),
        );
        Ok(())
    }

    /// Restore weights from the backup into `model`.
    pub fn load_model<M: TrainableModel + ?Sized>(&self, model: &mut M) -> Result<()> {
        let path = self.model_path();
        model.load(&path).with_context(|| {
            format!("Cannot load backup '{}'. Has a run saved one yet?", path.display())
        })?;
        tracing::info!("Loaded weights from '{}'", path.display());
        Ok(())
    }

    pub fn save_state(&self, state: &TrainingState) -> Result<()> {
        let path = self.state_path();
        fs::write(&path, serde_json::to_string_pretty(state)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        Ok(())
    }

    /// The last recorded cursor, or None when no run has saved yet.
    pub fn load_state(&self) -> Result<Option<TrainingState>> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        let state = serde_json::from_str(&json)
            .with_context(|| format!("Cannot parse '{}'", path.display()))?;
        Ok(Some(state))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.config_path();
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.config_path();
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure 'train' has run at least once.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch::EncodedBatch;
    use std::cell::RefCell;

    /// Writes a counter to disk instead of real weights.
    #[derive(Default)]
    struct CountingModel {
        steps: usize,
        saves: RefCell<usize>,
    }

    impl TrainableModel for CountingModel {
        fn fit(&mut self, _batch: &EncodedBatch) -> anyhow::Result<f64> {
            self.steps += 1;
            Ok(1.0)
        }

        fn save(&self, path: &Path) -> anyhow::Result<()> {
            *self.saves.borrow_mut() += 1;
            fs::write(path, self.steps.to_string())?;
            Ok(())
        }

        fn load(&mut self, path: &Path) -> anyhow::Result<()> {
            self.steps = fs::read_to_string(path)?.parse()?;
            Ok(())
        }
    }

    #[test]
    fn test_state_absent_before_first_save() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        assert_eq!(ckpt.load_state().unwrap(), None);
    }

    #[test]
    fn test_backup_round_trip_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("ckpt")).unwrap();

        let mut model = CountingModel { steps: 7, ..Default::default() };
        ckpt.save_backup(&model, TrainingState { epoch: 1, batch: 4, completed: false })
            .unwrap();
        model.steps = 9;
        ckpt.save_backup(&model, TrainingState { epoch: 2, batch: 2, completed: false })
            .unwrap();
        assert_eq!(*model.saves.borrow(), 2);

        let mut restored = CountingModel::default();
        ckpt.load_model(&mut restored).unwrap();
        assert_eq!(restored.steps, 9);
        assert_eq!(
            ckpt.load_state().unwrap(),
            Some(TrainingState { epoch: 2, batch: 2, completed: false })
        );
    }

    #[test]
    fn test_load_without_backup_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let mut model = CountingModel::default();
        assert!(ckpt.load_model(&mut model).is_err());
    }

    #[test]
    fn test_state_without_completed_flag_parses() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        fs::write(ckpt.state_path(), r#"{"epoch": 5, "batch": 0}"#).unwrap();
        let state = ckpt.load_state().unwrap().unwrap();
        assert_eq!(state.epoch, 5);
        assert!(!state.completed);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let cfg = TrainConfig {
            epochs: 3,
            ..TrainConfig::default()
        };
        ckpt.save_config(&cfg).unwrap();
        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.epochs, 3);
        assert_eq!(loaded.batch_size, cfg.batch_size);
    }
}
