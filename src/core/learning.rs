//! Flashcard learning session.
//!
//! A linear cursor over a fixed sequence of words. The cursor clamps at both
//! ends, the "meaning shown" facet resets whenever the cursor moves, and
//! marking a word as learned is a two-phase update: the local flag is applied
//! as pending, then either confirmed (and the cursor advances) or rolled back
//! if the store rejects the write.

use crate::core::word::WordEntry;
use crate::error::{KelimeError, Result};
use crate::session::UserSession;
use crate::storage::VocabularyStore;

/// A local `learned = true` awaiting confirmation from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending update must be confirmed or rolled back"]
pub struct PendingLearned {
    index: usize,
    word_id: String,
    was_learned: bool,
}

impl PendingLearned {
    /// Id of the word being marked.
    pub fn word_id(&self) -> &str {
        &self.word_id
    }
}

/// One learning pass over a user's words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearningSession {
    words: Vec<WordEntry>,
    index: usize,
    meaning_shown: bool,
    pending: Option<usize>,
}

impl LearningSession {
    /// Start a session at the first word with the meaning hidden.
    pub fn new(words: Vec<WordEntry>) -> Self {
        Self {
            words,
            index: 0,
            meaning_shown: false,
            pending: None,
        }
    }

    /// Fetch the user's words and start a session over them.
    pub fn load<S: VocabularyStore + ?Sized>(store: &S, user: &UserSession) -> Result<Self> {
        let words = store.fetch_words(user.uid())?;
        tracing::debug!(uid = user.uid(), words = words.len(), "learning session loaded");
        Ok(Self::new(words))
    }

    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether there is nothing to learn; callers show an empty state.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Cursor position. Always a valid index unless the session is empty.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The word under the cursor.
    pub fn current(&self) -> Option<&WordEntry> {
        self.words.get(self.index)
    }

    pub fn meaning_shown(&self) -> bool {
        self.meaning_shown
    }

    /// Whether a learned update is awaiting confirmation.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Move to the next word; no-op on the last word or while a learned
    /// update is pending.
    pub fn next(&mut self) {
        if self.pending.is_none() && self.index + 1 < self.words.len() {
            self.index += 1;
            self.meaning_shown = false;
        }
    }

    /// Move to the previous word; no-op on the first word or while a
    /// learned update is pending.
    pub fn previous(&mut self) {
        if self.pending.is_none() && self.index > 0 {
            self.index -= 1;
            self.meaning_shown = false;
        }
    }

    /// Show or hide the meaning of the current word.
    pub fn toggle_meaning(&mut self) {
        self.meaning_shown = !self.meaning_shown;
    }

    /// Phase one: apply `learned = true` locally and remember how to undo it.
    pub fn begin_mark_learned(&mut self) -> Result<PendingLearned> {
        if self.pending.is_some() {
            return Err(KelimeError::invalid_state(
                "a learned update is already pending",
            ));
        }
        let index = self.index;
        let word = self
            .words
            .get_mut(index)
            .ok_or_else(|| KelimeError::invalid_state("no word to mark as learned"))?;

        let pending = PendingLearned {
            index,
            word_id: word.id.clone(),
            was_learned: word.learned,
        };
        word.learned = true;
        self.pending = Some(index);
        Ok(pending)
    }

    /// Phase two, success: keep the local flag and advance past the marked
    /// word.
    pub fn confirm(&mut self, pending: PendingLearned) {
        if self.pending == Some(pending.index) {
            self.pending = None;
            self.index = pending.index;
            self.next();
        }
    }

    /// Phase two, failure: restore the previous flag; the cursor stays put.
    pub fn rollback(&mut self, pending: PendingLearned) {
        if self.pending == Some(pending.index) {
            if let Some(word) = self.words.get_mut(pending.index) {
                word.learned = pending.was_learned;
            }
            self.pending = None;
        }
    }

    /// Mark the current word as learned, persist it, then advance.
    ///
    /// Idempotent for words that are already learned. On store failure the
    /// local state is rolled back and the error is returned.
    pub fn mark_learned<S: VocabularyStore + ?Sized>(
        &mut self,
        store: &S,
        user: &UserSession,
    ) -> Result<()> {
        let pending = self.begin_mark_learned()?;

        match store.update_word_learned(user.uid(), pending.word_id()) {
            Ok(()) => {
                tracing::info!(uid = user.uid(), word_id = pending.word_id(), "word marked learned");
                self.confirm(pending);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    uid = user.uid(),
                    word_id = pending.word_id(),
                    error = %err,
                    "marking word learned failed, rolling back"
                );
                self.rollback(pending);
                Err(err)
            }
        }
    }

    /// Fraction of the session reached, counting the word on screen:
    /// `(index + 1) / len`, or `0.0` for an empty session.
    pub fn progress(&self) -> f64 {
        if self.words.is_empty() {
            0.0
        } else {
            (self.index + 1) as f64 / self.words.len() as f64
        }
    }

    /// Number of learned words in this session.
    pub fn learned_count(&self) -> usize {
        self.words.iter().filter(|w| w.learned).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{StaticAuth, UserSession};
    use crate::storage::{MemoryStore, VocabularyStore};

    fn words(n: usize) -> Vec<WordEntry> {
        (0..n)
            .map(|i| WordEntry::new(format!("w{i}"), format!("term{i}"), format!("def{i}")))
            .collect()
    }

    fn user() -> UserSession {
        UserSession::begin(&StaticAuth::signed_in("u1")).unwrap()
    }

    #[test]
    fn test_previous_clamps_at_start() {
        let mut session = LearningSession::new(words(5));
        session.previous();
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn test_next_clamps_at_end() {
        let mut session = LearningSession::new(words(5));
        for _ in 0..4 {
            session.next();
        }
        assert_eq!(session.index(), 4);
        session.next();
        assert_eq!(session.index(), 4);
        assert_eq!(session.current().unwrap().id, "w4");
    }

    #[test]
    fn test_meaning_resets_on_move_only() {
        let mut session = LearningSession::new(words(3));
        session.toggle_meaning();
        assert!(session.meaning_shown());

        // Clamped move keeps the meaning visible
        session.previous();
        assert!(session.meaning_shown());

        session.next();
        assert!(!session.meaning_shown());

        session.toggle_meaning();
        session.toggle_meaning();
        assert!(!session.meaning_shown());
    }

    #[test]
    fn test_progress_post_move() {
        let mut session = LearningSession::new(words(4));
        assert!((session.progress() - 0.25).abs() < f64::EPSILON);
        session.next();
        assert!((session.progress() - 0.5).abs() < f64::EPSILON);
        session.next();
        session.next();
        assert_eq!(session.progress(), 1.0);
        session.previous();
        assert!((session.progress() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_session() {
        let mut session = LearningSession::new(Vec::new());
        assert!(session.is_empty());
        assert!(session.current().is_none());
        assert_eq!(session.progress(), 0.0);
        session.next();
        session.previous();
        assert_eq!(session.index(), 0);
        assert!(session.begin_mark_learned().is_err());
    }

    #[test]
    fn test_mark_learned_persists_and_advances() {
        let store = MemoryStore::new();
        let user = user();
        store.insert_words(user.uid(), words(3));

        let mut session = LearningSession::load(&store, &user).unwrap();
        session.toggle_meaning();
        session.mark_learned(&store, &user).unwrap();

        assert_eq!(session.index(), 1);
        assert!(!session.meaning_shown());
        assert!(session.words()[0].learned);
        assert!(!session.is_pending());
        assert_eq!(session.learned_count(), 1);

        let stored = store.fetch_words(user.uid()).unwrap();
        assert!(stored.iter().find(|w| w.id == "w0").unwrap().learned);
    }

    #[test]
    fn test_mark_learned_on_last_word_stays() {
        let store = MemoryStore::new();
        let user = user();
        store.insert_words(user.uid(), words(2));

        let mut session = LearningSession::load(&store, &user).unwrap();
        session.next();
        session.mark_learned(&store, &user).unwrap();
        assert_eq!(session.index(), 1);
        assert!(session.words()[1].learned);
    }

    #[test]
    fn test_mark_learned_is_idempotent() {
        let store = MemoryStore::new();
        let user = user();
        store.insert_words(user.uid(), vec![WordEntry::new("w0", "a", "b").learned()]);

        let mut session = LearningSession::load(&store, &user).unwrap();
        session.mark_learned(&store, &user).unwrap();
        session.mark_learned(&store, &user).unwrap();
        assert!(session.words()[0].learned);
        assert_eq!(session.learned_count(), 1);
    }

    #[test]
    fn test_mark_learned_rolls_back_on_failure() {
        let store = MemoryStore::new();
        let user = user();
        store.insert_words(user.uid(), words(3));

        let mut session = LearningSession::load(&store, &user).unwrap();
        store.set_available(false);

        let err = session.mark_learned(&store, &user).unwrap_err();
        assert!(matches!(err, KelimeError::StoreUnavailable { .. }));
        assert_eq!(session.index(), 0);
        assert!(!session.words()[0].learned);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_mark_learned_unknown_word_rolls_back() {
        let store = MemoryStore::new();
        let user = user();

        // Session built from words the store never saw
        let mut session = LearningSession::new(words(2));
        let err = session.mark_learned(&store, &user).unwrap_err();
        assert!(matches!(err, KelimeError::NotFound { .. }));
        assert!(!session.words()[0].learned);
    }

    #[test]
    fn test_navigation_frozen_while_pending() {
        let mut session = LearningSession::new(words(4));
        session.next();
        let pending = session.begin_mark_learned().unwrap();

        session.next();
        session.next();
        assert_eq!(session.index(), 1);
        session.previous();
        assert_eq!(session.index(), 1);

        session.confirm(pending);
        assert!(session.words()[1].learned);
        assert_eq!(session.index(), 2);
        assert!(!session.is_pending());

        session.previous();
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn test_two_phase_manual() {
        let mut session = LearningSession::new(words(3));
        let pending = session.begin_mark_learned().unwrap();
        assert_eq!(pending.word_id(), "w0");
        assert!(session.is_pending());
        assert!(session.words()[0].learned);

        // Second begin while pending is rejected
        assert!(matches!(
            session.begin_mark_learned(),
            Err(KelimeError::InvalidState { .. })
        ));

        session.rollback(pending);
        assert!(!session.words()[0].learned);
        assert_eq!(session.index(), 0);

        let pending = session.begin_mark_learned().unwrap();
        session.confirm(pending);
        assert!(session.words()[0].learned);
        assert_eq!(session.index(), 1);
    }
}
