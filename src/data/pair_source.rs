// ============================================================
// Layer 4 — Raw Pair Source
// ============================================================
// Reads the raw paired-text corpus: one example per line,
// fields separated by a delimiter, with the query text and the
// response text picked out by column index.
//
//   こんにちは,こんにちは、元気ですか
//   ありがとう,どういたしまして
//
// Rules:
//   - blank lines are not rows and are passed over
//   - a line with fewer columns than the requested indices
//     aborts the read (no silent skipping of bad rows)
//   - fields are trimmed, and a leading BOM is dropped
//
// Reference: Rust Book §12 (Reading a File)
//            Rust Book §13 (Iterators)

use std::{fs, path::PathBuf};

use crate::domain::error::{PipelineError, Result};

/// One raw (feature text, label text) row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPair {
    pub text:  String,
    pub label: String,
}

impl RawPair {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self { text: text.into(), label: label.into() }
    }
}

/// Where the raw pairs live and how to cut each line.
#[derive(Debug, Clone)]
pub struct PairSource {
    path:          PathBuf,
    delimiter:     char,
    feature_index: usize,
    label_index:   usize,
}

impl PairSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path:          path.into(),
            delimiter:     ',',
            feature_index: 0,
            label_index:   1,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_columns(mut self, feature_index: usize, label_index: usize) -> Self {
        self.feature_index = feature_index;
        self.label_index = label_index;
        self
    }

    /// Read every pair in file order.
    pub fn read_pairs(&self) -> Result<Vec<RawPair>> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| PipelineError::io(&self.path, e))?;
        let content = content.strip_prefix('\u{FEFF}').unwrap_or(&content);

        let needed = self.feature_index.max(self.label_index) + 1;
        let mut pairs = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(self.delimiter).collect();
            if fields.len() < needed {
                return Err(PipelineError::MalformedRow {
                    path:   self.path.clone(),
                    line:   idx + 1,
                    reason: format!("expected at least {needed} columns, found {}", fields.len()),
                });
            }
            pairs.push(RawPair::new(
                fields[self.feature_index].trim(),
                fields[self.label_index].trim(),
            ));
        }

        tracing::debug!("Read {} raw pairs from '{}'", pairs.len(), self.path.display());
        Ok(pairs)
    }
}
