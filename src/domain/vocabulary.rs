// ============================================================
// Layer 3 — Vocabulary (word ↔ id store)
// ============================================================
// A dense, insertion-ordered, bidirectional mapping between
// words and integer IDs. The first word added gets ID 0, the
// next ID 1, and so on: the ID of a word is the vocabulary
// size at the moment it was inserted.
//
// Reserved sentinels:
//   <unk> = 0   stands in for words the vocabulary never saw
//   <eos> = 1   appended to every target sequence
//   <go>  = 2   first decoder input at time step 0
//
// These three are declared in RESERVED_TOKENS and registered
// by every constructor, so their IDs are stable across runs.
// A loaded vocabulary that moves any of them is rejected.
//
// The vocabulary only grows through add_word(). Lookups never
// mutate it; mapping unknown words to <unk> is the encoder's
// job, not this store's. Persistence lives in infra::artifacts.
//
// Reference: Rust Book §8 (HashMap), §5 (Structs)

use std::collections::HashMap;

use crate::domain::error::{PipelineError, Result};

pub const UNK: &str = "<unk>";
pub const EOS: &str = "<eos>";
pub const GO: &str = "<go>";

pub const UNK_ID: u32 = 0;
pub const EOS_ID: u32 = 1;
pub const GO_ID: u32 = 2;

/// Sentinels in registration order, with the ID each must receive.
pub const RESERVED_TOKENS: [(&str, u32); 3] = [(UNK, UNK_ID), (EOS, EOS_ID), (GO, GO_ID)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    word_to_id: HashMap<String, u32>,
    id_to_word: Vec<String>,
}

impl Vocabulary {
    /// A fresh vocabulary holding only the three sentinels.
    pub fn new() -> Self {
        let mut vocab = Self {
            word_to_id: HashMap::new(),
            id_to_word: Vec::new(),
        };
        for (word, _) in RESERVED_TOKENS {
            vocab.add_word(word);
        }
        debug_assert!(vocab.check_reserved().is_ok());
        vocab
    }

    /// Rebuild a vocabulary from a persisted word→id map.
    pub fn from_word_ids(word_to_id: HashMap<String, u32>) -> Result<Self> {
        let id_to_word = word_to_id
            .iter()
            .map(|(word, &id)| (id, word.clone()))
            .collect();
        let mut vocab = Self::new();
        vocab.set_dictionaries(word_to_id, id_to_word)?;
        Ok(vocab)
    }

    /// Insert `word` if absent and return its ID either way.
    pub fn add_word(&mut self, word: &str) -> u32 {
        if let Some(&id) = self.word_to_id.get(word) {
            return id;
        }
        let id = self.id_to_word.len() as u32;
        self.word_to_id.insert(word.to_string(), id);
        self.id_to_word.push(word.to_string());
        id
    }

    pub fn id_of(&self, word: &str) -> Option<u32> {
        self.word_to_id.get(word).copied()
    }

    pub fn word_of(&self, id: u32) -> Option<&str> {
        self.id_to_word.get(id as usize).map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.word_to_id.contains_key(word)
    }

    /// Number of distinct words, sentinels included. Becomes dictSize.
    pub fn size(&self) -> usize {
        self.id_to_word.len()
    }

    pub fn word_ids(&self) -> &HashMap<String, u32> {
        &self.word_to_id
    }

    /// Words in ID order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.id_to_word.iter().map(String::as_str)
    }

    /// Replace both dictionaries with a previously persisted pair.
    ///
    /// The maps must agree with each other, cover every ID in
    /// `[0, size)` exactly once, and keep the sentinels at their
    /// reserved IDs. On success later `add_word` calls continue
    /// numbering from the loaded size. On failure `self` is untouched.
    pub fn set_dictionaries(
        &mut self,
        word_to_id: HashMap<String, u32>,
        id_to_word: HashMap<u32, String>,
    ) -> Result<()> {
        if word_to_id.len() != id_to_word.len() {
            return Err(PipelineError::VocabularyInconsistency(format!(
                "{} words but {} ids",
                word_to_id.len(),
                id_to_word.len()
            )));
        }

        let size = word_to_id.len();
        let mut dense = vec![None; size];
        for (id, word) in &id_to_word {
            let slot = dense.get_mut(*id as usize).ok_or_else(|| {
                PipelineError::VocabularyInconsistency(format!(
                    "id {id} ({word:?}) is outside [0, {size})"
                ))
            })?;
            if word_to_id.get(word) != Some(id) {
                return Err(PipelineError::VocabularyInconsistency(format!(
                    "id {id} maps to {word:?} but {word:?} maps to {:?}",
                    word_to_id.get(word)
                )));
            }
            *slot = Some(word.clone());
        }

        // Equal sizes plus agreement means every slot was filled.
        let id_to_word: Vec<String> = dense.into_iter().flatten().collect();
        let candidate = Self { word_to_id, id_to_word };
        candidate.check_reserved()?;

        *self = candidate;
        Ok(())
    }

    fn check_reserved(&self) -> Result<()> {
        for (word, expected) in RESERVED_TOKENS {
            match self.id_of(word) {
                Some(id) if id == expected => {}
                found => {
                    return Err(PipelineError::VocabularyInconsistency(format!(
                        "sentinel {word} must have id {expected}, found {found:?}"
                    )))
                }
            }
        }
        Ok(())
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sentinels_are_reserved() {
        let v = Vocabulary::new();
        assert_eq!(v.id_of("<unk>"), Some(0));
        assert_eq!(v.id_of("<eos>"), Some(1));
        assert_eq!(v.id_of("<go>"), Some(2));
        assert_eq!(v.size(), 3);
    }

    #[test]
    fn test_first_word_after_sentinels() {
        let mut v = Vocabulary::new();
        v.add_word("hello");
        assert_eq!(v.id_of("hello"), Some(3));
        v.add_word("hello");
        assert_eq!(v.size(), 4);
        assert_eq!(v.word_of(3), Some("hello"));
    }

    #[test]
    fn test_unknown_word_is_not_mapped() {
        let v = Vocabulary::new();
        assert_eq!(v.id_of("missing"), None);
        assert_eq!(v.word_of(99), None);
    }

    #[test]
    fn test_set_dictionaries_continues_numbering() {
        let mut source = Vocabulary::new();
        source.add_word("こんにちは");
        source.add_word("です");

        let word_to_id = source.word_ids().clone();
        let id_to_word = word_to_id.iter().map(|(w, &i)| (i, w.clone())).collect();

        let mut v = Vocabulary::new();
        v.set_dictionaries(word_to_id, id_to_word).unwrap();
        assert_eq!(v.size(), 5);
        assert_eq!(v.add_word("新しい"), 5);
        assert_eq!(v.id_of("です"), source.id_of("です"));
    }

    #[test]
    fn test_set_dictionaries_rejects_divergent_maps() {
        let mut word_to_id: HashMap<String, u32> = Vocabulary::new().word_ids().clone();
        word_to_id.insert("a".to_string(), 3);
        let mut id_to_word: HashMap<u32, String> =
            word_to_id.iter().map(|(w, &i)| (i, w.clone())).collect();
        id_to_word.insert(3, "b".to_string());

        let mut v = Vocabulary::new();
        let err = v.set_dictionaries(word_to_id, id_to_word).unwrap_err();
        assert!(matches!(err, PipelineError::VocabularyInconsistency(_)));
        // Untouched on failure
        assert_eq!(v, Vocabulary::new());
    }

    #[test]
    fn test_set_dictionaries_rejects_gaps() {
        let mut word_to_id: HashMap<String, u32> = Vocabulary::new().word_ids().clone();
        word_to_id.insert("far".to_string(), 10);
        let err = Vocabulary::from_word_ids(word_to_id).unwrap_err();
        assert!(matches!(err, PipelineError::VocabularyInconsistency(_)));
    }

    #[test]
    fn test_set_dictionaries_rejects_moved_sentinel() {
        let mut word_to_id = HashMap::new();
        word_to_id.insert("<eos>".to_string(), 0);
        word_to_id.insert("<unk>".to_string(), 1);
        word_to_id.insert("<go>".to_string(), 2);
        let err = Vocabulary::from_word_ids(word_to_id).unwrap_err();
        assert!(err.to_string().contains("sentinel"));
    }

    proptest! {
        #[test]
        fn prop_adding_twice_grows_once(words in proptest::collection::vec("[a-z]{1,6}", 1..40)) {
            let mut v = Vocabulary::new();
            for w in &words {
                v.add_word(w);
            }
            let size = v.size();
            let ids: Vec<_> = words.iter().map(|w| v.id_of(w)).collect();
            for w in &words {
                v.add_word(w);
            }
            prop_assert_eq!(v.size(), size);
            let again: Vec<_> = words.iter().map(|w| v.id_of(w)).collect();
            prop_assert_eq!(ids, again);
        }

        #[test]
        fn prop_ids_are_dense(words in proptest::collection::vec("[a-z]{1,6}", 0..40)) {
            let mut v = Vocabulary::new();
            for w in &words {
                v.add_word(w);
            }
            for id in 0..v.size() as u32 {
                let word = v.word_of(id).unwrap();
                prop_assert_eq!(v.id_of(word), Some(id));
            }
        }
    }
}
