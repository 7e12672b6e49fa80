// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Loads a built corpus exactly as training would and reports
// its sizes, so batch settings can be checked before a long run.
// Every ID file row is parsed and validated on the way.

use anyhow::Result;

use crate::application::train_use_case::{TrainConfig, TrainUseCase};
use crate::domain::corpus::CorpusMeta;

#[derive(Debug, Clone, PartialEq)]
pub struct CorpusReport {
    pub meta:                CorpusMeta,
    pub loaded_examples:     usize,
    pub row_size:            usize,
    pub total_batches:       usize,
    pub total_macro_batches: usize,
}

pub struct InspectUseCase {
    config: TrainConfig,
}

impl InspectUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<CorpusReport> {
        let (meta, iter) = TrainUseCase::new(self.config.clone()).load_batches()?;
        Ok(CorpusReport {
            loaded_examples:     iter.example_count(),
            row_size:            iter.config().row_size,
            total_batches:       iter.total_batches(),
            total_macro_batches: iter.total_macro_batches(),
            meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::build_corpus_use_case::{BuildCorpusConfig, BuildCorpusUseCase};
    use std::fs;

    #[test]
    fn test_report_for_205_examples() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("pairs.csv");
        let rows: String = (0..205).map(|i| format!("q{i},a{i}\n")).collect();
        fs::write(&source, rows).unwrap();
        let corpus_dir = dir.path().join("corpus").display().to_string();
        BuildCorpusUseCase::new(BuildCorpusConfig {
            source_path: source.display().to_string(),
            output_dir: corpus_dir.clone(),
            ..BuildCorpusConfig::default()
        })
        .execute()
        .unwrap();

        let report = InspectUseCase::new(TrainConfig {
            corpus_dir,
            ..TrainConfig::default()
        })
        .execute()
        .unwrap();

        assert_eq!(report.loaded_examples, 205);
        assert_eq!(report.meta.dict_size, 3 + 410);
        assert_eq!(report.row_size, 2);
        assert_eq!(report.total_batches, 2);
        assert_eq!(report.total_macro_batches, 1);
    }
}
