//! File-based vocabulary store.
//!
//! Documents are stored as JSON arrays, one file per collection:
//!
//! ```text
//! <data_dir>/users/<uid>/words.json
//! <data_dir>/users/<uid>/wordLists.json
//! <data_dir>/users/<uid>/quizzes.json
//! ```
//!
//! Atomic writes are achieved via temp file + rename pattern.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::data_dir;
use crate::core::{validate_list_input, NewWord, QuizAttempt, WordEntry, WordList};
use crate::error::{KelimeError, Result};
use crate::storage::traits::{generate_id, recount_words};
use crate::storage::VocabularyStore;

const WORDS_FILE: &str = "words.json";
const LISTS_FILE: &str = "wordLists.json";
const QUIZZES_FILE: &str = "quizzes.json";

/// File-based store rooted at a data directory.
#[derive(Debug)]
pub struct FileStore {
    /// Root directory holding `users/`.
    root: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store in the default data directory.
    ///
    /// Uses `~/.kelime/data/`, `$KELIME_HOME/data/` or `$KELIME_DATA_DIR`.
    pub fn new() -> Result<Self> {
        let dir = data_dir().ok_or_else(|| {
            KelimeError::config("Could not determine data directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a store rooted at a custom directory.
    pub fn with_dir(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| KelimeError::storage(&root, e))?;
        }

        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding one user's documents.
    fn user_dir(&self, uid: &str) -> Result<PathBuf> {
        let valid = !uid.is_empty()
            && !uid.starts_with('.')
            && uid
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
        if !valid {
            return Err(KelimeError::validation("uid", format!("unsupported user id '{uid}'")));
        }
        Ok(self.root.join("users").join(uid))
    }

    fn collection_path(&self, uid: &str, file: &str) -> Result<PathBuf> {
        Ok(self.user_dir(uid)?.join(file))
    }

    /// Read a collection; a missing file is an empty collection.
    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).map_err(|e| KelimeError::storage(path, e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Write a collection atomically using temp file + rename.
    fn save<T: Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| KelimeError::config(format!("invalid path {}", path.display())))?;
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| KelimeError::storage(dir, e))?;
        }

        let json = serde_json::to_string_pretty(items)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = dir.join(format!(".{file_name}.tmp"));

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| KelimeError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| KelimeError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| KelimeError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, path).map_err(|e| KelimeError::storage(path, e))?;

        Ok(())
    }

    /// Load, modify and save one collection under the write lock.
    fn update<T, R>(
        &self,
        uid: &str,
        file: &str,
        f: impl FnOnce(&mut Vec<T>) -> Result<R>,
    ) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
    {
        let path = self.collection_path(uid, file)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| KelimeError::store_unavailable("file store lock poisoned"))?;
        let mut items: Vec<T> = self.load(&path)?;
        let result = f(&mut items)?;
        self.save(&path, &items)?;
        Ok(result)
    }
}

impl VocabularyStore for FileStore {
    fn fetch_words(&self, uid: &str) -> Result<Vec<WordEntry>> {
        self.load(&self.collection_path(uid, WORDS_FILE)?)
    }

    fn add_word(&self, uid: &str, word: NewWord) -> Result<WordEntry> {
        let word = word.validated()?;
        self.update(uid, WORDS_FILE, |words: &mut Vec<WordEntry>| {
            let entry = WordEntry {
                id: generate_id(),
                term: word.term,
                definition: word.definition,
                example: word.example,
                learned: false,
                list_id: word.list_id,
            };
            words.push(entry.clone());
            Ok(entry)
        })
    }

    fn update_word_learned(&self, uid: &str, word_id: &str) -> Result<()> {
        self.update(uid, WORDS_FILE, |words: &mut Vec<WordEntry>| {
            let word = words
                .iter_mut()
                .find(|w| w.id == word_id)
                .ok_or_else(|| KelimeError::not_found("word", word_id))?;
            word.learned = true;
            Ok(())
        })
    }

    fn fetch_lists(&self, uid: &str) -> Result<Vec<WordList>> {
        let lists = self.load(&self.collection_path(uid, LISTS_FILE)?)?;
        let words: Vec<WordEntry> = self.fetch_words(uid)?;
        Ok(recount_words(lists, &words))
    }

    fn create_list(&self, uid: &str, name: &str, description: &str) -> Result<WordList> {
        let (name, description) = validate_list_input(name, description)?;
        self.update(uid, LISTS_FILE, |lists: &mut Vec<WordList>| {
            let list = WordList::new(generate_id(), name, description);
            lists.push(list.clone());
            Ok(list)
        })
    }

    fn delete_list(&self, uid: &str, list_id: &str) -> Result<()> {
        let path = self.collection_path(uid, LISTS_FILE)?;
        if !path.exists() {
            return Ok(());
        }
        self.update(uid, LISTS_FILE, |lists: &mut Vec<WordList>| {
            lists.retain(|l| l.id != list_id);
            Ok(())
        })
    }

    fn fetch_quiz_attempts(&self, uid: &str) -> Result<Vec<QuizAttempt>> {
        self.load(&self.collection_path(uid, QUIZZES_FILE)?)
    }

    fn record_quiz_attempt(&self, uid: &str, attempt: &QuizAttempt) -> Result<()> {
        self.update(uid, QUIZZES_FILE, |quizzes: &mut Vec<QuizAttempt>| {
            quizzes.push(*attempt);
            Ok(())
        })
    }
}
