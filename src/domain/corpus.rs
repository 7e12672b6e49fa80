// ============================================================
// Layer 3 — Examples and Corpus
// ============================================================
// An Example is one (feature ids, label ids) pair taken from
// one raw input row. A Corpus is the ordered collection of
// token sequences produced by one build, together with:
//
//   feature_max_length  longest feature sequence seen
//   label_max_length    longest label sequence seen (per policy)
//   vocabulary          frozen snapshot taken when the build ended
//
// The corpus owns its vocabulary snapshot. Growing the builder's
// vocabulary after the freeze cannot change what this corpus
// resolves its tokens to.
//
// CorpusMeta is the small serialisable summary written next to
// the persisted ID files so training can size its tensors
// without re-reading the raw text.
//
// Reference: Rust Book §5 (Structs), §8 (Vectors)

use serde::{Deserialize, Serialize};

use crate::domain::error::{PipelineError, Result};
use crate::domain::vocabulary::Vocabulary;

// ─── Example ──────────────────────────────────────────────────────────────────
/// One training pair as integer vocabulary IDs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Example {
    pub features: Vec<u32>,
    pub labels:   Vec<u32>,
}

impl Example {
    pub fn new(features: Vec<u32>, labels: Vec<u32>) -> Self {
        Self { features, labels }
    }
}

// ─── LabelLengthPolicy ────────────────────────────────────────────────────────
/// How the running label maximum is updated during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelLengthPolicy {
    /// Compare each label against the longest label so far.
    #[default]
    OwnMaximum,

    /// Compare each label against the feature maximum (after the
    /// current row's feature has been counted). Reproduces artifacts
    /// built by the earlier pipeline; the recorded label maximum can
    /// then be smaller than the true longest label.
    LegacyFeatureThreshold,
}

// ─── Corpus ───────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct Corpus {
    features:           Vec<Vec<String>>,
    labels:             Vec<Vec<String>>,
    feature_max_length: usize,
    label_max_length:   usize,
    vocabulary:         Vocabulary,
}

impl Corpus {
    pub(crate) fn new(
        features:           Vec<Vec<String>>,
        labels:             Vec<Vec<String>>,
        feature_max_length: usize,
        label_max_length:   usize,
        vocabulary:         Vocabulary,
    ) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        Self { features, labels, feature_max_length, label_max_length, vocabulary }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature_max_length(&self) -> usize {
        self.feature_max_length
    }

    pub fn label_max_length(&self) -> usize {
        self.label_max_length
    }

    /// Vocabulary size at freeze time.
    pub fn dict_size(&self) -> usize {
        self.vocabulary.size()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn into_vocabulary(self) -> Vocabulary {
        self.vocabulary
    }

    /// Narrowest tensor width that holds every feature and every
    /// label with its appended <eos>.
    ///
    /// Measured from the sequences themselves, so it stays correct
    /// even when the recorded label maximum came from the legacy policy.
    pub fn row_size(&self) -> usize {
        let longest_feature = self.features.iter().map(Vec::len).max().unwrap_or(0);
        let longest_label = self.labels.iter().map(Vec::len).max().unwrap_or(0);
        longest_feature.max(longest_label + 1)
    }

    /// Raw token rows, feature and label side by side.
    pub fn token_rows(&self) -> impl Iterator<Item = (&[String], &[String])> {
        self.features
            .iter()
            .zip(&self.labels)
            .map(|(f, l)| (f.as_slice(), l.as_slice()))
    }

    /// Resolve one token through the frozen vocabulary.
    ///
    /// Every token was registered during the build, so a miss means
    /// the snapshot and the token lists have diverged.
    pub fn resolve(&self, token: &str) -> Result<u32> {
        self.vocabulary.id_of(token).ok_or_else(|| {
            PipelineError::VocabularyInconsistency(format!(
                "token {token:?} is in the corpus but not in its vocabulary"
            ))
        })
    }

    /// Every row resolved to integer IDs, in corpus order.
    pub fn examples(&self) -> Result<Vec<Example>> {
        self.token_rows()
            .map(|(features, labels)| {
                Ok(Example::new(
                    features.iter().map(|t| self.resolve(t)).collect::<Result<_>>()?,
                    labels.iter().map(|t| self.resolve(t)).collect::<Result<_>>()?,
                ))
            })
            .collect()
    }

    /// Summary written next to the persisted ID files.
    pub fn meta(&self, label_length_policy: LabelLengthPolicy, header_rows: usize) -> CorpusMeta {
        CorpusMeta {
            example_count:      self.len(),
            feature_max_length: self.feature_max_length,
            label_max_length:   self.label_max_length,
            dict_size:          self.dict_size(),
            row_size:           self.row_size(),
            label_length_policy,
            header_rows,
        }
    }
}

// ─── CorpusMeta ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusMeta {
    pub example_count:       usize,
    pub feature_max_length:  usize,
    pub label_max_length:    usize,
    pub dict_size:           usize,
    pub row_size:            usize,
    pub label_length_policy: LabelLengthPolicy,
    /// Rows to skip at the top of each ID file before the first example
    pub header_rows:         usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn sample_corpus() -> Corpus {
        let mut vocab = Vocabulary::new();
        let features = vec![tokens(&["おはよう", "ございます"]), tokens(&["はい"])];
        let labels = vec![tokens(&["おはよう"]), tokens(&["いいえ", "です", "ね"])];
        for row in features.iter().chain(&labels) {
            for t in row {
                vocab.add_word(t);
            }
        }
        Corpus::new(features, labels, 2, 3, vocab)
    }

    #[test]
    fn test_examples_resolve_in_order() {
        let corpus = sample_corpus();
        let examples = corpus.examples().unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].features, vec![3, 4]);
        assert_eq!(examples[0].labels, vec![3]);
        assert_eq!(examples[1].features, vec![5]);
        assert_eq!(examples[1].labels, vec![6, 7, 8]);
    }

    #[test]
    fn test_row_size_covers_label_plus_eos() {
        let corpus = sample_corpus();
        // longest label is 3 tokens, +1 for <eos>
        assert_eq!(corpus.row_size(), 4);
    }

    #[test]
    fn test_resolve_detects_diverged_snapshot() {
        let corpus = Corpus::new(
            vec![tokens(&["ghost"])],
            vec![tokens(&[])],
            1,
            0,
            Vocabulary::new(),
        );
        let err = corpus.examples().unwrap_err();
        assert!(matches!(err, PipelineError::VocabularyInconsistency(_)));
    }

    #[test]
    fn test_meta_carries_policy_and_sizes() {
        let corpus = sample_corpus();
        let meta = corpus.meta(LabelLengthPolicy::LegacyFeatureThreshold, 1);
        assert_eq!(meta.example_count, 2);
        assert_eq!(meta.dict_size, 9);
        assert_eq!(meta.row_size, 4);
        assert_eq!(meta.header_rows, 1);

        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("legacy-feature-threshold"));
    }
}
