//! Aggregate progress statistics for the profile view.

use serde::{Deserialize, Serialize};

use crate::core::{QuizAttempt, WordEntry, WordList};
use crate::error::Result;
use crate::session::UserSession;
use crate::storage::VocabularyStore;

/// Aggregate counts and the average quiz score.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_words: u32,
    pub learned_words: u32,
    pub total_lists: u32,
    pub quizzes_taken: u32,
    /// Mean of `score / total` over all attempts, in `[0, 1]`.
    pub average_score: f64,
}

impl Stats {
    /// Fraction of words learned; `0.0` without words.
    pub fn learned_ratio(&self) -> f64 {
        if self.total_words == 0 {
            0.0
        } else {
            self.learned_words as f64 / self.total_words as f64
        }
    }
}

/// Compute statistics from already fetched collections. Pure.
pub fn compute_stats(words: &[WordEntry], lists: &[WordList], attempts: &[QuizAttempt]) -> Stats {
    let quizzes_taken = attempts.len();
    let average_score = if quizzes_taken > 0 {
        attempts.iter().map(QuizAttempt::ratio).sum::<f64>() / quizzes_taken as f64
    } else {
        0.0
    };

    Stats {
        total_words: words.len() as u32,
        learned_words: words.iter().filter(|w| w.learned).count() as u32,
        total_lists: lists.len() as u32,
        quizzes_taken: quizzes_taken as u32,
        average_score,
    }
}

/// Fetch the user's collections and compute their statistics.
pub fn load_stats<S: VocabularyStore + ?Sized>(store: &S, user: &UserSession) -> Result<Stats> {
    let words = store.fetch_words(user.uid())?;
    let lists = store.fetch_lists(user.uid())?;
    let attempts = store.fetch_quiz_attempts(user.uid())?;
    let stats = compute_stats(&words, &lists, &attempts);
    tracing::debug!(
        uid = user.uid(),
        total_words = stats.total_words,
        quizzes_taken = stats.quizzes_taken,
        "stats computed"
    );
    Ok(stats)
}
