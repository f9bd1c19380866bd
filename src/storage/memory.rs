//! In-memory vocabulary store for testing.
//!
//! Thread-safe implementation of [`VocabularyStore`] that can also simulate
//! a backend outage, so callers' failure paths can be exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::core::{validate_list_input, NewWord, QuizAttempt, WordEntry, WordList};
use crate::error::{KelimeError, Result};
use crate::storage::traits::{generate_id, recount_words};
use crate::storage::VocabularyStore;

/// All documents of one user.
#[derive(Debug, Clone, Default)]
struct UserDocuments {
    words: Vec<WordEntry>,
    lists: Vec<WordList>,
    quizzes: Vec<QuizAttempt>,
}

/// In-memory store keyed by user id.
#[derive(Debug)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserDocuments>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty, available store.
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the backend going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Seed words for a user, keeping their ids.
    pub fn insert_words(&self, uid: &str, words: Vec<WordEntry>) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.entry(uid.to_string()).or_default().words.extend(words);
    }

    /// Seed lists for a user, keeping their ids.
    pub fn insert_lists(&self, uid: &str, lists: Vec<WordList>) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.entry(uid.to_string()).or_default().lists.extend(lists);
    }

    /// Number of users with any documents.
    pub fn user_count(&self) -> usize {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(KelimeError::store_unavailable("memory store is offline"))
        }
    }

    fn read<T>(&self, uid: &str, f: impl FnOnce(&UserDocuments) -> T) -> Result<T> {
        self.check_available()?;
        let users = self
            .users
            .read()
            .map_err(|_| KelimeError::store_unavailable("memory store lock poisoned"))?;
        Ok(match users.get(uid) {
            Some(docs) => f(docs),
            None => f(&UserDocuments::default()),
        })
    }

    fn write<T>(&self, uid: &str, f: impl FnOnce(&mut UserDocuments) -> Result<T>) -> Result<T> {
        self.check_available()?;
        let mut users = self
            .users
            .write()
            .map_err(|_| KelimeError::store_unavailable("memory store lock poisoned"))?;
        f(users.entry(uid.to_string()).or_default())
    }
}

impl VocabularyStore for MemoryStore {
    fn fetch_words(&self, uid: &str) -> Result<Vec<WordEntry>> {
        self.read(uid, |docs| docs.words.clone())
    }

    fn add_word(&self, uid: &str, word: NewWord) -> Result<WordEntry> {
        let word = word.validated()?;
        self.write(uid, |docs| {
            let entry = WordEntry {
                id: generate_id(),
                term: word.term,
                definition: word.definition,
                example: word.example,
                learned: false,
                list_id: word.list_id,
            };
            docs.words.push(entry.clone());
            Ok(entry)
        })
    }

    fn update_word_learned(&self, uid: &str, word_id: &str) -> Result<()> {
        self.write(uid, |docs| {
            let word = docs
                .words
                .iter_mut()
                .find(|w| w.id == word_id)
                .ok_or_else(|| KelimeError::not_found("word", word_id))?;
            word.learned = true;
            Ok(())
        })
    }

    fn fetch_lists(&self, uid: &str) -> Result<Vec<WordList>> {
        self.read(uid, |docs| recount_words(docs.lists.clone(), &docs.words))
    }

    fn create_list(&self, uid: &str, name: &str, description: &str) -> Result<WordList> {
        let (name, description) = validate_list_input(name, description)?;
        self.write(uid, |docs| {
            let list = WordList::new(generate_id(), name, description);
            docs.lists.push(list.clone());
            Ok(list)
        })
    }

    fn delete_list(&self, uid: &str, list_id: &str) -> Result<()> {
        self.write(uid, |docs| {
            docs.lists.retain(|l| l.id != list_id);
            Ok(())
        })
    }

    fn fetch_quiz_attempts(&self, uid: &str) -> Result<Vec<QuizAttempt>> {
        self.read(uid, |docs| docs.quizzes.clone())
    }

    fn record_quiz_attempt(&self, uid: &str, attempt: &QuizAttempt) -> Result<()> {
        self.write(uid, |docs| {
            docs.quizzes.push(*attempt);
            Ok(())
        })
    }
}
