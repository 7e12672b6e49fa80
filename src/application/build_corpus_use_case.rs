// ============================================================
// Layer 2 — BuildCorpusUseCase
// ============================================================
// Orchestrates the corpus build in order:
//
//   Step 1: Read raw (text, label) pairs     (Layer 4 - data)
//   Step 2: Pick the segmenter               (Layer 2 / 6)
//   Step 3: Start from an existing or fresh
//           vocabulary                       (Layer 6 - infra)
//   Step 4: Segment, grow vocabulary, freeze (Layer 4 - data)
//   Step 5: Persist ID files, vocabulary and
//           corpus summary                   (Layer 6 - infra)
//
// Any failure aborts the build; nothing is written until the
// whole corpus has been segmented.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::segmentation::{make_segmenter, SegmenterKind};
use crate::data::{corpus_builder::CorpusBuilder, pair_source::PairSource};
use crate::domain::{
    corpus::{CorpusMeta, LabelLengthPolicy},
    traits::Persistable,
    vocabulary::Vocabulary,
};
use crate::infra::artifacts::CorpusArtifacts;

// ─── Build Configuration ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildCorpusConfig {
    pub source_path:         String,
    pub output_dir:          String,
    pub delimiter:           char,
    pub feature_column:      usize,
    pub label_column:        usize,
    pub segmenter:           SegmenterKind,
    pub tokenizer_path:      Option<String>,
    pub label_length_policy: LabelLengthPolicy,
    pub header_rows:         usize,
    /// Continue numbering from a previously saved vocabulary.json
    pub base_vocabulary:     Option<String>,
}

impl Default for BuildCorpusConfig {
    fn default() -> Self {
        Self {
            source_path:         "data/pairs.csv".to_string(),
            output_dir:          "corpus".to_string(),
            delimiter:           ',',
            feature_column:      0,
            label_column:        1,
            segmenter:           SegmenterKind::Whitespace,
            tokenizer_path:      None,
            label_length_policy: LabelLengthPolicy::OwnMaximum,
            header_rows:         0,
            base_vocabulary:     None,
        }
    }
}

// ─── BuildCorpusUseCase ───────────────────────────────────────────────────────
pub struct BuildCorpusUseCase {
    config: BuildCorpusConfig,
}

impl BuildCorpusUseCase {
    pub fn new(config: BuildCorpusConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<CorpusMeta> {
        let cfg = &self.config;

        // ── Step 1: Read raw pairs ────────────────────────────────────────────
        tracing::info!("Reading pairs from '{}'", cfg.source_path);
        let pairs = PairSource::new(&cfg.source_path)
            .with_delimiter(cfg.delimiter)
            .with_columns(cfg.feature_column, cfg.label_column)
            .read_pairs()
            .with_context(|| format!("Cannot read pairs from '{}'", cfg.source_path))?;
        tracing::info!("Read {} pairs", pairs.len());

        // ── Step 2: Segmenter ─────────────────────────────────────────────────
        let segmenter = make_segmenter(cfg.segmenter, cfg.tokenizer_path.as_deref())?;

        // ── Step 3: Starting vocabulary ───────────────────────────────────────
        let vocabulary = match &cfg.base_vocabulary {
            Some(path) => {
                let vocab = Vocabulary::load(Path::new(path))
                    .with_context(|| format!("Cannot load base vocabulary '{path}'"))?;
                tracing::info!("Extending vocabulary of {} words from '{}'", vocab.size(), path);
                vocab
            }
            None => Vocabulary::new(),
        };

        // ── Step 4: Segment and freeze ────────────────────────────────────────
        let mut builder = CorpusBuilder::new(vocabulary).with_policy(cfg.label_length_policy);
        let corpus = builder
            .build(pairs, &segmenter)
            .context("Corpus build failed")?;

        // ── Step 5: Persist ───────────────────────────────────────────────────
        let artifacts = CorpusArtifacts::new(&cfg.output_dir);
        let meta = artifacts
            .save_corpus(&corpus, cfg.label_length_policy, cfg.header_rows)
            .with_context(|| format!("Cannot write corpus to '{}'", cfg.output_dir))?;

        tracing::info!(
            "Corpus ready in '{}': {} examples, dict_size={}, row_size={}",
            cfg.output_dir,
            meta.example_count,
            meta.dict_size,
            meta.row_size,
        );
        Ok(meta)
    }
}
