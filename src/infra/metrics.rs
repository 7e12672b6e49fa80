// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per macro-batch of training.
//
// Columns:
//   - epoch:        the epoch number (1, 2, 3, ...)
//   - macro_batch:  index of the window inside the epoch
//   - batch:        batch cursor after the window was drained
//   - mean_loss:    average batch loss over the window
//   - elapsed_secs: wall-clock seconds since training started
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,macro_batch,batch,mean_loss,elapsed_secs
//   1,0,2,6.651200,41.3
//   1,1,4,6.402100,83.0
//
// Rows are appended, so a resumed run continues the same file.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "epoch,macro_batch,batch,mean_loss,elapsed_secs";

/// One row of metrics for a drained macro-batch window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroBatchMetrics {
    pub epoch:        usize,
    pub macro_batch:  usize,
    pub batch:        usize,
    pub mean_loss:    f64,
    pub elapsed_secs: f64,
}

impl MacroBatchMetrics {
    /// Summarise the per-batch losses of one window.
    pub fn from_losses(
        epoch:        usize,
        macro_batch:  usize,
        batch:        usize,
        losses:       &[f64],
        elapsed_secs: f64,
    ) -> Self {
        let mean_loss = if losses.is_empty() {
            f64::NAN
        } else {
            losses.iter().sum::<f64>() / losses.len() as f64
        };
        Self { epoch, macro_batch, batch, mean_loss, elapsed_secs }
    }
}

/// Appends macro-batch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &MacroBatchMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;

        writeln!(
            f,
            "{},{},{},{:.6},{:.1}",
            m.epoch, m.macro_batch, m.batch, m.mean_loss, m.elapsed_secs,
        )?;

        tracing::debug!(
            "Logged epoch {} macro-batch {}: mean_loss={:.4}",
            m.epoch,
            m.macro_batch,
            m.mean_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
