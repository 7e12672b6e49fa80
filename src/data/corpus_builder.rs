// ============================================================
// Layer 4 — Corpus Builder
// ============================================================
// Drives a segmenter and the vocabulary over raw text pairs.
//
// For every raw (text, label) row:
//   1. segment the text        → feature tokens
//   2. segment the label       → label tokens
//   3. register every token    → vocabulary grows
//   4. keep both token lists   → corpus rows, in input order
//   5. update the running maxima of each side's length
//
// When the rows run out the builder freezes the result into a
// Corpus holding a clone of the vocabulary as it stood at that
// moment. The builder keeps its own copy, so a second build
// (say, a held-out set) continues numbering where the first
// stopped without disturbing the first corpus.
//
// persist() writes the ID files. Tokens are resolved to IDs at
// write time through the corpus snapshot, so the files never
// contain raw words.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Rust Book §9 (Propagating Errors with ?)

use std::path::Path;

use crate::data::id_file::write_id_rows;
use crate::data::pair_source::RawPair;
use crate::domain::corpus::{Corpus, LabelLengthPolicy};
use crate::domain::error::Result;
use crate::domain::traits::TextSegmenter;
use crate::domain::vocabulary::Vocabulary;

pub struct CorpusBuilder {
    vocabulary: Vocabulary,
    policy:     LabelLengthPolicy,
}

impl CorpusBuilder {
    /// Start from `vocabulary` (a fresh one, or one loaded from an
    /// earlier run so IDs stay stable).
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary, policy: LabelLengthPolicy::default() }
    }

    pub fn with_policy(mut self, policy: LabelLengthPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> LabelLengthPolicy {
        self.policy
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Segment every pair, grow the vocabulary, and freeze a Corpus.
    ///
    /// The first segmentation failure aborts the build; no partial
    /// corpus is returned.
    pub fn build<I, T>(&mut self, pairs: I, segmenter: &T) -> Result<Corpus>
    where
        I: IntoIterator<Item = RawPair>,
        T: TextSegmenter + ?Sized,
    {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut feature_max = 0usize;
        let mut label_max = 0usize;

        for pair in pairs {
            let feature_tokens = segmenter.segment(&pair.text)?;
            if feature_tokens.len() > feature_max {
                feature_max = feature_tokens.len();
            }
            for token in &feature_tokens {
                self.vocabulary.add_word(token);
            }

            let label_tokens = segmenter.segment(&pair.label)?;
            let threshold = match self.policy {
                LabelLengthPolicy::OwnMaximum => label_max,
                LabelLengthPolicy::LegacyFeatureThreshold => feature_max,
            };
            if label_tokens.len() > threshold {
                label_max = label_tokens.len();
            }
            for token in &label_tokens {
                self.vocabulary.add_word(token);
            }

            features.push(feature_tokens);
            labels.push(label_tokens);
        }

        tracing::info!(
            "Built corpus: {} examples, dict_size={}, feature_max={}, label_max={}",
            features.len(),
            self.vocabulary.size(),
            feature_max,
            label_max,
        );

        Ok(Corpus::new(
            features,
            labels,
            feature_max,
            label_max,
            self.vocabulary.clone(),
        ))
    }

    /// Write the feature and label ID files, row-aligned.
    ///
    /// Every row is resolved before anything is written, so a
    /// vocabulary miss leaves no half-written files behind.
    pub fn persist(
        corpus:       &Corpus,
        feature_path: &Path,
        label_path:   &Path,
        header_rows:  usize,
    ) -> Result<usize> {
        let examples = corpus.examples()?;

        write_id_rows(feature_path, header_rows, examples.iter().map(|e| &e.features))?;
        write_id_rows(label_path, header_rows, examples.iter().map(|e| &e.labels))?;

        tracing::info!(
            "Persisted {} examples to '{}' and '{}'",
            examples.len(),
            feature_path.display(),
            label_path.display(),
        );
        Ok(examples.len())
    }

    /// build() followed by persist().
    pub fn run_and_save<I, T>(
        &mut self,
        pairs:        I,
        segmenter:    &T,
        feature_path: &Path,
        label_path:   &Path,
        header_rows:  usize,
    ) -> Result<Corpus>
    where
        I: IntoIterator<Item = RawPair>,
        T: TextSegmenter + ?Sized,
    {
        let corpus = self.build(pairs, segmenter)?;
        Self::persist(&corpus, feature_path, label_path, header_rows)?;
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::id_file::read_id_rows;
    use crate::data::segmenter::WhitespaceSegmenter;
    use crate::domain::error::PipelineError;

    struct FailingSegmenter;

    impl TextSegmenter for FailingSegmenter {
        fn segment(&self, text: &str) -> Result<Vec<String>> {
            if text.contains('!') {
                return Err(PipelineError::Tokenization {
                    text:   text.to_string(),
                    reason: "unsupported symbol".to_string(),
                });
            }
            WhitespaceSegmenter.segment(text)
        }
    }

    fn pairs() -> Vec<RawPair> {
        vec![
            RawPair::new("おはよう ございます", "おはよう"),
            RawPair::new("元気", "元気 です よ ね"),
            RawPair::new("さようなら また 明日", "また ね"),
        ]
    }

    #[test]
    fn test_build_registers_every_token() {
        let mut builder = CorpusBuilder::new(Vocabulary::new());
        let corpus = builder.build(pairs(), &WhitespaceSegmenter).unwrap();

        assert_eq!(corpus.len(), 3);
        // 3 sentinels + おはよう ございます 元気 です よ ね さようなら また 明日
        assert_eq!(corpus.dict_size(), 12);
        assert_eq!(corpus.feature_max_length(), 3);
        assert_eq!(corpus.label_max_length(), 4);
        assert_eq!(corpus.vocabulary().id_of("おはよう"), Some(3));
    }

    #[test]
    fn test_legacy_policy_compares_against_feature_max() {
        // Label of length 2 after a feature max of 3 is ignored,
        // label of length 4 exceeds it and is recorded.
        let rows = vec![
            RawPair::new("a b c", "x y"),
            RawPair::new("d", "x y z w"),
        ];
        let mut own = CorpusBuilder::new(Vocabulary::new());
        assert_eq!(own.build(rows.clone(), &WhitespaceSegmenter).unwrap().label_max_length(), 4);

        let rows_short = vec![RawPair::new("a b c", "x y"), RawPair::new("d", "z")];
        let mut own = CorpusBuilder::new(Vocabulary::new());
        let mut legacy = CorpusBuilder::new(Vocabulary::new())
            .with_policy(LabelLengthPolicy::LegacyFeatureThreshold);
        assert_eq!(own.build(rows_short.clone(), &WhitespaceSegmenter).unwrap().label_max_length(), 2);
        let legacy_corpus = legacy.build(rows_short, &WhitespaceSegmenter).unwrap();
        assert_eq!(legacy_corpus.label_max_length(), 0);
        // Row size is still measured from the real sequences
        assert_eq!(legacy_corpus.row_size(), 3);
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_builds() {
        let mut builder = CorpusBuilder::new(Vocabulary::new());
        let first = builder.build(pairs(), &WhitespaceSegmenter).unwrap();
        let second = builder
            .build(vec![RawPair::new("新しい 単語", "はい")], &WhitespaceSegmenter)
            .unwrap();

        assert_eq!(first.dict_size(), 12);
        assert_eq!(second.dict_size(), 15);
        assert_eq!(first.vocabulary().id_of("新しい"), None);
        assert_eq!(second.vocabulary().id_of("新しい"), Some(12));
    }

    #[test]
    fn test_tokenization_failure_propagates() {
        let mut builder = CorpusBuilder::new(Vocabulary::new());
        let rows = vec![RawPair::new("ok", "fine"), RawPair::new("bad!", "x")];
        let err = builder.build(rows, &FailingSegmenter).unwrap_err();
        assert!(matches!(err, PipelineError::Tokenization { .. }));
    }

    #[test]
    fn test_persist_writes_aligned_id_files() {
        let dir = tempfile::tempdir().unwrap();
        let fpath = dir.path().join("features.csv");
        let lpath = dir.path().join("labels.csv");

        let mut builder = CorpusBuilder::new(Vocabulary::new());
        let corpus = builder
            .run_and_save(pairs(), &WhitespaceSegmenter, &fpath, &lpath, 0)
            .unwrap();

        let features = read_id_rows(&fpath, 0).unwrap();
        let labels = read_id_rows(&lpath, 0).unwrap();
        assert_eq!(features.len(), corpus.len());
        assert_eq!(labels.len(), corpus.len());
        assert_eq!(features[0], vec![3, 4]);
        assert_eq!(labels[0], vec![3]);
        assert_eq!(labels[1], vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_persist_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = CorpusBuilder::new(Vocabulary::new());
        let corpus = builder.build(pairs(), &WhitespaceSegmenter).unwrap();
        let err = CorpusBuilder::persist(
            &corpus,
            &dir.path().join("no-such-dir").join("f.csv"),
            &dir.path().join("l.csv"),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
