//! Core types and logic for kelime.
//!
//! Vocabulary records, the quiz generator and quiz state machine, the
//! flashcard learning session, and the random source they share.

pub mod learning;
pub mod quiz;
pub mod random;
pub mod word;

pub use learning::{LearningSession, PendingLearned};
pub use quiz::{
    generate_questions, generate_questions_with, AnswerOutcome, Question, QuizSession, QuizState,
    DEFAULT_DISTRACTORS,
};
pub use random::{NoShuffle, RandomSource, SeededRandom, ThreadRandom};
pub use word::{validate_list_input, NewWord, QuizAttempt, WordEntry, WordList};
