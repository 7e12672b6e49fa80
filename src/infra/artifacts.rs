// ============================================================
// Layer 6 — Corpus Artifacts
// ============================================================
// The on-disk hand-off between `build-corpus` and `train`.
//
// File layout:
//   corpus/
//     features.csv      ← one row of feature IDs per example
//     labels.csv        ← one row of label IDs per example
//     vocabulary.json   ← word → id object
//     corpus.json       ← CorpusMeta (sizes, policy, header rows)
//
// The two ID files are written by CorpusBuilder::persist; this
// module owns the paths and the two JSON artifacts. A save goes to
// corpus.staging/ first and is renamed over corpus/ only once all
// four files are on disk.
//
// Reference: Rust Book §12 (I/O and File Handling)
//            serde_json documentation

use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{
    corpus::{Corpus, CorpusMeta, LabelLengthPolicy},
    error::{PipelineError, Result},
    traits::Persistable,
    vocabulary::Vocabulary,
};
use crate::data::corpus_builder::CorpusBuilder;

/// Paths of every artifact in one corpus directory.
#[derive(Debug, Clone)]
pub struct CorpusArtifacts {
    dir: PathBuf,
}

impl CorpusArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn features_path(&self) -> PathBuf {
        self.dir.join("features.csv")
    }

    pub fn labels_path(&self) -> PathBuf {
        self.dir.join("labels.csv")
    }

    pub fn vocabulary_path(&self) -> PathBuf {
        self.dir.join("vocabulary.json")
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join("corpus.json")
    }

    /// Write the ID files, the vocabulary and the summary.
    ///
    /// Either all four artifacts are replaced or the directory is
    /// left as it was.
    pub fn save_corpus(
        &self,
        corpus:      &Corpus,
        policy:      LabelLengthPolicy,
        header_rows: usize,
    ) -> Result<CorpusMeta> {
        let meta = corpus.meta(policy, header_rows);
        self.replace_with(|staged| {
            CorpusBuilder::persist(
                corpus,
                &staged.features_path(),
                &staged.labels_path(),
                header_rows,
            )?;
            corpus.vocabulary().save(&staged.vocabulary_path())?;
            meta.save(&staged.meta_path())
        })?;
        Ok(meta)
    }

    /// Run `write` against a sibling staging directory, then swap it
    /// in for `dir`. A failed write removes the staging directory and
    /// leaves `dir` untouched.
    fn replace_with<F>(&self, write: F) -> Result<()>
    where
        F: FnOnce(&CorpusArtifacts) -> Result<()>,
    {
        let staged = CorpusArtifacts::new(self.sibling("staging")?);
        let retired = self.sibling("old")?;

        remove_if_present(staged.dir())?;
        if let Some(parent) = self.dir.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        fs::create_dir(staged.dir()).map_err(|e| PipelineError::io(staged.dir(), e))?;

        if let Err(e) = write(&staged) {
            discard(staged.dir());
            return Err(e);
        }

        let had_previous = self.dir.exists();
        if had_previous {
            remove_if_present(&retired)?;
            if let Err(e) = fs::rename(&self.dir, &retired) {
                discard(staged.dir());
                return Err(PipelineError::io(&self.dir, e));
            }
        }
        if let Err(e) = fs::rename(staged.dir(), &self.dir) {
            if had_previous {
                if let Err(back) = fs::rename(&retired, &self.dir) {
                    tracing::warn!(
                        "Could not restore '{}' from '{}': {back}",
                        self.dir.display(),
                        retired.display(),
                    );
                }
            }
            discard(staged.dir());
            return Err(PipelineError::io(&self.dir, e));
        }
        if had_previous {
            discard(&retired);
        }
        Ok(())
    }

    /// `<dir>.<suffix>` next to the corpus directory.
    fn sibling(&self, suffix: &str) -> Result<PathBuf> {
        let name = self.dir.file_name().ok_or_else(|| {
            PipelineError::InvalidConfig(format!(
                "corpus directory '{}' has no final component",
                self.dir.display()
            ))
        })?;
        let mut sibling = name.to_os_string();
        sibling.push(".");
        sibling.push(suffix);
        Ok(self.dir.with_file_name(sibling))
    }

    pub fn load_vocabulary(&self) -> Result<Vocabulary> {
        Vocabulary::load(&self.vocabulary_path())
    }

    pub fn load_meta(&self) -> Result<CorpusMeta> {
        CorpusMeta::load(&self.meta_path())
    }
}

// ─── Persistable impls ────────────────────────────────────────────────────────
impl Persistable for Vocabulary {
    /// Written sorted by word so rebuilding the same corpus gives
    /// byte-identical files.
    fn save(&self, path: &Path) -> Result<()> {
        let ordered: BTreeMap<&str, u32> = self
            .word_ids()
            .iter()
            .map(|(word, &id)| (word.as_str(), id))
            .collect();
        write_json(path, &ordered)
    }

    fn load(path: &Path) -> Result<Self> {
        let word_to_id: HashMap<String, u32> = read_json(path)?;
        Vocabulary::from_word_ids(word_to_id)
    }
}

impl Persistable for CorpusMeta {
    fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }
}

fn remove_if_present(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
    }
    Ok(())
}

fn discard(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir) {
        tracing::warn!("Could not remove '{}': {e}", dir.display());
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| PipelineError::io(path, io::Error::other(e)))?;
    fs::write(path, json).map_err(|e| PipelineError::io(path, e))?;
    tracing::debug!("Wrote '{}'", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&json).map_err(|e| PipelineError::MalformedRow {
        path:   path.to_path_buf(),
        line:   e.line(),
        reason: e.to_string(),
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{id_file::read_id_rows, pair_source::RawPair, segmenter::WhitespaceSegmenter};
    use crate::domain::vocabulary::{EOS_ID, GO_ID, UNK_ID};

    fn built_corpus() -> Corpus {
        let pairs = vec![
            RawPair::new("how are you", "fine"),
            RawPair::new("hello", "hi there"),
        ];
        CorpusBuilder::new(Vocabulary::new())
            .build(pairs, &WhitespaceSegmenter)
            .unwrap()
    }

    #[test]
    fn test_vocabulary_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocabulary.json");

        let mut vocab = Vocabulary::new();
        vocab.add_word("hello");
        vocab.add_word("world");
        vocab.save(&path).unwrap();

        let loaded = Vocabulary::load(&path).unwrap();
        assert_eq!(loaded, vocab);
        assert_eq!(loaded.id_of("world"), Some(4));
        assert_eq!(loaded.id_of("<unk>"), Some(UNK_ID));
        assert_eq!(loaded.id_of("<eos>"), Some(EOS_ID));
        assert_eq!(loaded.id_of("<go>"), Some(GO_ID));
    }

    #[test]
    fn test_loaded_vocabulary_keeps_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocabulary.json");

        let mut vocab = Vocabulary::new();
        vocab.add_word("a");
        vocab.save(&path).unwrap();

        let mut loaded = Vocabulary::load(&path).unwrap();
        assert_eq!(loaded.add_word("b"), 4);
    }

    #[test]
    fn test_vocabulary_with_moved_sentinel_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocabulary.json");
        fs::write(&path, r#"{"<eos>": 0, "<unk>": 1, "<go>": 2}"#).unwrap();

        let err = Vocabulary::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::VocabularyInconsistency(_)));
    }

    #[test]
    fn test_missing_vocabulary_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Vocabulary::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_garbled_json_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        fs::write(&path, "{\n  \"example_count\": oops\n}").unwrap();

        match CorpusMeta::load(&path).unwrap_err() {
            PipelineError::MalformedRow { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_save_corpus_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = CorpusArtifacts::new(dir.path().join("corpus"));
        let corpus = built_corpus();

        let meta = artifacts
            .save_corpus(&corpus, LabelLengthPolicy::OwnMaximum, 1)
            .unwrap();

        assert_eq!(meta.example_count, 2);
        assert_eq!(meta.header_rows, 1);
        assert_eq!(artifacts.load_meta().unwrap(), meta);
        assert_eq!(&artifacts.load_vocabulary().unwrap(), corpus.vocabulary());

        let features = read_id_rows(&artifacts.features_path(), 1).unwrap();
        let labels = read_id_rows(&artifacts.labels_path(), 1).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(labels[1].len(), 2);
    }

    fn three_pair_corpus() -> Corpus {
        let pairs = vec![
            RawPair::new("how are you", "fine"),
            RawPair::new("hello", "hi there"),
            RawPair::new("bye", "see you"),
        ];
        CorpusBuilder::new(Vocabulary::new())
            .build(pairs, &WhitespaceSegmenter)
            .unwrap()
    }

    #[test]
    fn test_failed_save_leaves_previous_corpus_intact() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = CorpusArtifacts::new(dir.path().join("corpus"));
        artifacts
            .save_corpus(&built_corpus(), LabelLengthPolicy::OwnMaximum, 0)
            .unwrap();
        let features_before = fs::read_to_string(artifacts.features_path()).unwrap();

        let err = artifacts
            .replace_with(|staged| {
                fs::write(staged.features_path(), "9,9,9\n").unwrap();
                Err(PipelineError::io(
                    staged.labels_path(),
                    io::Error::new(io::ErrorKind::Other, "disk full"),
                ))
            })
            .unwrap_err();

        assert!(matches!(err, PipelineError::Io { .. }));
        assert_eq!(fs::read_to_string(artifacts.features_path()).unwrap(), features_before);
        assert_eq!(artifacts.load_meta().unwrap().example_count, 2);
        assert!(!dir.path().join("corpus.staging").exists());
    }

    #[test]
    fn test_resave_replaces_every_artifact_together() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = CorpusArtifacts::new(dir.path().join("corpus"));
        artifacts
            .save_corpus(&built_corpus(), LabelLengthPolicy::OwnMaximum, 0)
            .unwrap();

        // a stray directory where labels.csv used to be
        fs::remove_file(artifacts.labels_path()).unwrap();
        fs::create_dir(artifacts.labels_path()).unwrap();

        let corpus = three_pair_corpus();
        let meta = artifacts
            .save_corpus(&corpus, LabelLengthPolicy::OwnMaximum, 0)
            .unwrap();

        assert_eq!(meta.example_count, 3);
        assert_eq!(artifacts.load_meta().unwrap().example_count, 3);
        assert_eq!(read_id_rows(&artifacts.features_path(), 0).unwrap().len(), 3);
        assert_eq!(read_id_rows(&artifacts.labels_path(), 0).unwrap().len(), 3);
        assert_eq!(&artifacts.load_vocabulary().unwrap(), corpus.vocabulary());
        assert!(!dir.path().join("corpus.old").exists());
    }

    #[test]
    fn test_leftover_staging_dir_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("corpus.staging");
        fs::create_dir(&staging).unwrap();
        fs::write(staging.join("features.csv"), "1,2,3\n").unwrap();

        let artifacts = CorpusArtifacts::new(dir.path().join("corpus"));
        artifacts
            .save_corpus(&built_corpus(), LabelLengthPolicy::OwnMaximum, 0)
            .unwrap();

        assert!(!staging.exists());
        assert_eq!(read_id_rows(&artifacts.features_path(), 0).unwrap().len(), 2);
    }

    #[test]
    fn test_unserialisable_value_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        // serde_json only accepts string-like map keys
        let value: HashMap<(u32, u32), u32> = [((1, 2), 3)].into_iter().collect();

        let err = write_json(&path, &value).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
        assert!(!path.exists());
    }
}
