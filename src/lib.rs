//! Kelime - vocabulary practice core
//!
//! Kelime keeps a user's words and word lists, generates multiple-choice
//! quizzes with distractors drawn from the user's own vocabulary, runs
//! flashcard learning sessions, and summarizes progress. Storage and
//! identity are collaborators behind traits so the same flows run against
//! a JSON file store, an in-memory store, or anything else.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod session;
pub mod stats;
pub mod storage;

pub use config::Config;
pub use core::{
    generate_questions, generate_questions_with, AnswerOutcome, LearningSession, NewWord,
    Question, QuizAttempt, QuizSession, QuizState, RandomSource, SeededRandom, ThreadRandom,
    WordEntry, WordList,
};
pub use error::{KelimeError, Result};
pub use session::{AuthProvider, StaticAuth, UserIdentity, UserSession};
pub use stats::{compute_stats, load_stats, Stats};
pub use storage::{FileStore, MemoryStore, VocabularyStore};

// CLI commands
pub use cli::{LearnCommand, ListsCommand, QuizCommand, StatsCommand, WordsCommand};
