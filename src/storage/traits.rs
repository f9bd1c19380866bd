//! Data-access contract for per-user vocabulary documents.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{NewWord, QuizAttempt, WordEntry, WordList};
use crate::error::Result;

/// The document-store collaborator.
///
/// Data is keyed by user id and split into three collections: words, word
/// lists and quiz attempts. Every call returns a typed result; callers
/// decide how to surface failures.
pub trait VocabularyStore: Send + Sync {
    /// All words owned by the user.
    fn fetch_words(&self, uid: &str) -> Result<Vec<WordEntry>>;

    /// Add a word. Input is trimmed and validated; the store assigns the id.
    fn add_word(&self, uid: &str, word: NewWord) -> Result<WordEntry>;

    /// Set `learned = true` on a word.
    ///
    /// Returns `NotFound` if the word doesn't exist.
    fn update_word_learned(&self, uid: &str, word_id: &str) -> Result<()>;

    /// All lists owned by the user, with `word_count` recomputed from the
    /// words that reference each list.
    fn fetch_lists(&self, uid: &str) -> Result<Vec<WordList>>;

    /// Create an empty list.
    ///
    /// Returns `ValidationFailure` without writing if the trimmed name is
    /// empty.
    fn create_list(&self, uid: &str, name: &str, description: &str) -> Result<WordList>;

    /// Delete a list. Words referencing it are left in place.
    ///
    /// Returns `Ok(())` even if the list doesn't exist.
    fn delete_list(&self, uid: &str, list_id: &str) -> Result<()>;

    /// The user's quiz log, oldest first.
    fn fetch_quiz_attempts(&self, uid: &str) -> Result<Vec<QuizAttempt>>;

    /// Append a finished quiz to the user's log.
    fn record_quiz_attempt(&self, uid: &str, attempt: &QuizAttempt) -> Result<()>;
}

/// Blanket implementation so `Arc<T>` can be shared between flows and tests.
impl<T: VocabularyStore + ?Sized> VocabularyStore for Arc<T> {
    fn fetch_words(&self, uid: &str) -> Result<Vec<WordEntry>> {
        (**self).fetch_words(uid)
    }

    fn add_word(&self, uid: &str, word: NewWord) -> Result<WordEntry> {
        (**self).add_word(uid, word)
    }

    fn update_word_learned(&self, uid: &str, word_id: &str) -> Result<()> {
        (**self).update_word_learned(uid, word_id)
    }

    fn fetch_lists(&self, uid: &str) -> Result<Vec<WordList>> {
        (**self).fetch_lists(uid)
    }

    fn create_list(&self, uid: &str, name: &str, description: &str) -> Result<WordList> {
        (**self).create_list(uid, name, description)
    }

    fn delete_list(&self, uid: &str, list_id: &str) -> Result<()> {
        (**self).delete_list(uid, list_id)
    }

    fn fetch_quiz_attempts(&self, uid: &str) -> Result<Vec<QuizAttempt>> {
        (**self).fetch_quiz_attempts(uid)
    }

    fn record_quiz_attempt(&self, uid: &str, attempt: &QuizAttempt) -> Result<()> {
        (**self).record_quiz_attempt(uid, attempt)
    }
}

/// Fill in `word_count` for each list from the words that reference it.
pub fn recount_words(mut lists: Vec<WordList>, words: &[WordEntry]) -> Vec<WordList> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for list_id in words.iter().filter_map(|w| w.list_id.as_deref()) {
        *counts.entry(list_id).or_default() += 1;
    }
    for list in &mut lists {
        list.word_count = counts.get(list.id.as_str()).copied().unwrap_or(0);
    }
    lists
}

/// Generate a document id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
