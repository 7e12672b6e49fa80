// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// Every failure the data pipeline can report, as one typed enum.
//
// Library code (domain + data layers) returns PipelineError so
// callers can match on the kind of failure. The application and
// CLI layers wrap these in anyhow::Error with extra context.
//
// Nothing here is retried or recovered: a malformed row aborts
// the whole load, a failed write aborts the whole build.
//
// Reference: thiserror crate documentation
//            Rust Book §9 (Recoverable Errors with Result)

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A path could not be opened, read, or written
    #[error("I/O failure on '{}': {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The segmenter could not split a piece of text
    #[error("cannot segment {text:?}: {reason}")]
    Tokenization { text: String, reason: String },

    /// word→id and id→word maps disagree, or a sentinel moved
    #[error("vocabulary inconsistency: {0}")]
    VocabularyInconsistency(String),

    /// The batch cursor was moved past the end of the corpus
    #[error("batch {requested} is out of bounds (corpus has {total} batches)")]
    BatchBounds { requested: usize, total: usize },

    /// A raw or persisted row could not be parsed
    #[error("malformed row {line} in '{}': {reason}", path.display())]
    MalformedRow {
        path:   PathBuf,
        line:   usize,
        reason: String,
    },

    /// Feature and label ID files hold a different number of rows
    #[error("feature file has {features} rows but label file has {labels}")]
    RaggedCorpus { features: usize, labels: usize },

    /// An example does not fit the configured tensor width
    #[error("example {row} needs {length} positions but row size is {row_size}")]
    SequenceTooLong {
        row:      usize,
        length:   usize,
        row_size: usize,
    },

    /// A persisted ID is not covered by the dictionary
    #[error("token id {id} is outside the dictionary (size {dict_size})")]
    IdOutOfRange { id: u32, dict_size: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    /// Shorthand for wrapping an io::Error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_path() {
        let err = PipelineError::io(
            "corpus/features.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("corpus/features.csv"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_display_batch_bounds() {
        let err = PipelineError::BatchBounds { requested: 7, total: 2 };
        assert_eq!(
            err.to_string(),
            "batch 7 is out of bounds (corpus has 2 batches)"
        );
    }

    #[test]
    fn test_display_malformed_row() {
        let err = PipelineError::MalformedRow {
            path:   PathBuf::from("labels.csv"),
            line:   3,
            reason: "not an integer: \"x\"".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("labels.csv"));
    }
}
