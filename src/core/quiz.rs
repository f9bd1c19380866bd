//! Multiple-choice question generation and the quiz state machine.
//!
//! Each question asks for the definition of one word. Wrong options
//! (distractors) are sampled from the definitions of the *other* words in
//! the vocabulary, then shuffled together with the correct definition.
//!
//! ```text
//! InProgress(0, 0) --answer--> InProgress(i+1, s') --answer--> ... --> Finished(s, n)
//!        ^                                                                 |
//!        +-------------------------------restart---------------------------+
//! ```

use serde::{Deserialize, Serialize};

use crate::core::random::RandomSource;
use crate::core::word::{QuizAttempt, WordEntry};
use crate::error::{KelimeError, Result};

/// Number of distractors per question when not configured otherwise.
pub const DEFAULT_DISTRACTORS: usize = 3;

/// A generated multiple-choice question. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// The word being asked about.
    pub source: WordEntry,
    /// Shuffled options; exactly one of them is `correct_answer`
    /// (unless another word shares the same definition text).
    pub options: Vec<String>,
    /// The source word's definition.
    pub correct_answer: String,
}

impl Question {
    /// Whether `answer` matches the correct definition.
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    /// Position of the correct answer within `options`.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }
}

/// Generate one question per word with the default distractor count.
///
/// Returns an empty vector for an empty vocabulary; callers render an empty
/// state instead of a quiz.
pub fn generate_questions<R: RandomSource + ?Sized>(
    words: &[WordEntry],
    rng: &mut R,
) -> Vec<Question> {
    generate_questions_with(words, DEFAULT_DISTRACTORS, rng)
}

/// Generate one question per word with up to `distractors` wrong options.
///
/// Questions follow the input order. Distractors are distinct definition
/// strings. With fewer than `distractors` other definitions, all of them
/// are used and the question simply has fewer options.
pub fn generate_questions_with<R: RandomSource + ?Sized>(
    words: &[WordEntry],
    distractors: usize,
    rng: &mut R,
) -> Vec<Question> {
    let questions: Vec<Question> = words
        .iter()
        .map(|word| build_question(word, words, distractors, rng))
        .collect();

    tracing::debug!(
        words = words.len(),
        distractors,
        "generated quiz questions"
    );

    questions
}

fn build_question<R: RandomSource + ?Sized>(
    word: &WordEntry,
    words: &[WordEntry],
    distractors: usize,
    rng: &mut R,
) -> Question {
    // Distinct definitions of the other words, in first-seen order.
    let mut pool: Vec<&str> = Vec::new();
    for other in words.iter().filter(|other| other.id != word.id) {
        if !pool.contains(&other.definition.as_str()) {
            pool.push(other.definition.as_str());
        }
    }

    let mut options: Vec<String> = rng
        .sample_indices(pool.len(), distractors)
        .into_iter()
        .map(|i| pool[i].to_string())
        .collect();
    options.push(word.definition.clone());
    rng.shuffle(&mut options);

    Question {
        source: word.clone(),
        options,
        correct_answer: word.definition.clone(),
    }
}

/// Quiz progression state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuizState {
    /// Answering question `index` with `score` correct so far.
    InProgress { index: usize, score: u32 },
    /// All questions answered. Display-only until restarted.
    Finished { score: u32, total: u32 },
}

impl Default for QuizState {
    fn default() -> Self {
        Self::InProgress { index: 0, score: 0 }
    }
}

impl QuizState {
    /// Check if the quiz is finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    /// Correct answers so far.
    pub fn score(&self) -> u32 {
        match *self {
            Self::InProgress { score, .. } | Self::Finished { score, .. } => score,
        }
    }
}

/// Result of submitting the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Nothing was selected; state unchanged.
    NoSelection,
    /// The selection was the correct answer.
    Correct,
    /// The selection was wrong.
    Incorrect,
    /// The quiz is finished or has no questions; state unchanged.
    NotInProgress,
}

/// One pass through a set of generated questions.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    questions: Vec<Question>,
    state: QuizState,
    selected: Option<String>,
    distractors: usize,
}

impl QuizSession {
    /// Start a session over already generated questions.
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            state: QuizState::default(),
            selected: None,
            distractors: DEFAULT_DISTRACTORS,
        }
    }

    /// Generate questions for `words` and start a session over them.
    pub fn start<R: RandomSource + ?Sized>(
        words: &[WordEntry],
        distractors: usize,
        rng: &mut R,
    ) -> Self {
        Self {
            questions: generate_questions_with(words, distractors, rng),
            state: QuizState::default(),
            selected: None,
            distractors,
        }
    }

    /// Current state.
    pub fn state(&self) -> QuizState {
        self.state
    }

    /// All questions of this pass.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Whether there is nothing to ask (empty vocabulary).
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Number of questions.
    pub fn total(&self) -> u32 {
        self.questions.len() as u32
    }

    /// Correct answers so far.
    pub fn score(&self) -> u32 {
        self.state.score()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// The question being asked, if the quiz is in progress.
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            QuizState::InProgress { index, .. } => self.questions.get(index),
            QuizState::Finished { .. } => None,
        }
    }

    /// The pending selection.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Choose an option for the current question. An empty string clears
    /// the selection.
    pub fn select(&mut self, option: impl Into<String>) {
        let option = option.into();
        self.selected = if option.is_empty() { None } else { Some(option) };
    }

    /// Submit the pending selection and advance.
    pub fn answer(&mut self) -> AnswerOutcome {
        let QuizState::InProgress { index, score } = self.state else {
            return AnswerOutcome::NotInProgress;
        };
        let Some(question) = self.questions.get(index) else {
            return AnswerOutcome::NotInProgress;
        };
        let Some(selected) = self.selected.take() else {
            return AnswerOutcome::NoSelection;
        };

        let correct = question.is_correct(&selected);
        let score = if correct { score + 1 } else { score };

        self.state = if index + 1 < self.questions.len() {
            QuizState::InProgress {
                index: index + 1,
                score,
            }
        } else {
            QuizState::Finished {
                score,
                total: self.total(),
            }
        };

        if correct {
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect
        }
    }

    /// Select `option` and submit it in one step.
    pub fn answer_with(&mut self, option: impl Into<String>) -> AnswerOutcome {
        self.select(option);
        self.answer()
    }

    /// Regenerate questions from `words` and start over.
    ///
    /// Only allowed once the quiz is finished.
    pub fn restart<R: RandomSource + ?Sized>(
        &mut self,
        words: &[WordEntry],
        rng: &mut R,
    ) -> Result<()> {
        if !self.state.is_terminal() {
            return Err(KelimeError::invalid_state(format!(
                "cannot restart a quiz that is not finished: {:?}",
                self.state
            )));
        }
        self.questions = generate_questions_with(words, self.distractors, rng);
        self.state = QuizState::default();
        self.selected = None;
        Ok(())
    }

    /// Fraction complete for display: `(index + 1) / total` for the question
    /// on screen, `1.0` once finished, `0.0` without questions.
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        match self.state {
            QuizState::InProgress { index, .. } => (index + 1) as f64 / self.questions.len() as f64,
            QuizState::Finished { .. } => 1.0,
        }
    }

    /// The attempt to append to the user's quiz log, once finished.
    pub fn attempt(&self) -> Option<QuizAttempt> {
        match self.state {
            QuizState::Finished { score, total } => Some(QuizAttempt::new(score, total)),
            QuizState::InProgress { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::{NoShuffle, SeededRandom, ThreadRandom};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn vocabulary(n: usize) -> Vec<WordEntry> {
        (0..n)
            .map(|i| WordEntry::new(format!("w{i}"), format!("term{i}"), format!("def{i}")))
            .collect()
    }

    #[test]
    fn test_empty_input_yields_no_questions() {
        let mut rng = ThreadRandom::new();
        assert!(generate_questions(&[], &mut rng).is_empty());
    }

    #[test]
    fn test_question_count_and_option_count() {
        let mut rng = SeededRandom::new(1);
        for n in 1..=7 {
            let words = vocabulary(n);
            let questions = generate_questions(&words, &mut rng);
            assert_eq!(questions.len(), n);
            for q in &questions {
                assert_eq!(q.options.len(), n.min(4), "n = {n}");
            }
        }
    }

    #[test]
    fn test_correct_answer_is_source_definition_and_included() {
        let mut rng = SeededRandom::new(2);
        let words = vocabulary(6);
        for q in generate_questions(&words, &mut rng) {
            assert_eq!(q.correct_answer, q.source.definition);
            assert!(q.options.contains(&q.correct_answer));
            assert!(q.correct_index().is_some());
        }
    }

    #[test]
    fn test_distractors_come_from_other_words() {
        let mut rng = SeededRandom::new(3);
        let words = vocabulary(8);
        for q in generate_questions(&words, &mut rng) {
            let others: HashSet<&str> = words
                .iter()
                .filter(|w| w.id != q.source.id)
                .map(|w| w.definition.as_str())
                .collect();
            let distractors: Vec<&String> =
                q.options.iter().filter(|o| **o != q.correct_answer).collect();
            assert_eq!(distractors.len(), 3);
            assert!(distractors.iter().all(|d| others.contains(d.as_str())));
            let unique: HashSet<_> = q.options.iter().collect();
            assert_eq!(unique.len(), q.options.len());
        }
    }

    #[test]
    fn test_single_word_has_only_correct_option() {
        let mut rng = ThreadRandom::new();
        let questions = generate_questions(&vocabulary(1), &mut rng);
        assert_eq!(questions[0].options, vec!["def0".to_string()]);
    }

    #[test]
    fn test_shared_definition_may_duplicate_correct_answer() {
        let words = vec![
            WordEntry::new("a", "büyük", "big"),
            WordEntry::new("b", "iri", "big"),
        ];
        let questions = generate_questions(&words, &mut NoShuffle);
        assert_eq!(questions[0].options, vec!["big".to_string(), "big".to_string()]);
    }

    #[test]
    fn test_shared_definition_among_others_is_offered_once() {
        let words = vec![
            WordEntry::new("a", "büyük", "big"),
            WordEntry::new("b", "iri", "big"),
            WordEntry::new("c", "kırmızı", "red"),
            WordEntry::new("d", "küçük", "small"),
        ];
        let questions = generate_questions(&words, &mut NoShuffle);
        assert_eq!(questions[3].options, vec!["big", "red", "small"]);

        // "big" may still meet itself as the correct answer for a and b.
        for q in generate_questions(&words, &mut SeededRandom::new(3)).iter().skip(2) {
            let unique: std::collections::HashSet<&String> = q.options.iter().collect();
            assert_eq!(unique.len(), q.options.len(), "repeated option in {:?}", q.options);
        }
    }

    #[test]
    fn test_no_shuffle_puts_correct_answer_last() {
        let words = vocabulary(5);
        let questions = generate_questions(&words, &mut NoShuffle);
        assert_eq!(questions[0].options, vec!["def1", "def2", "def3", "def0"]);
        assert_eq!(questions[4].options, vec!["def0", "def1", "def2", "def4"]);
        assert_eq!(questions[0].correct_index(), Some(3));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let words = vocabulary(10);
        let a = generate_questions(&words, &mut SeededRandom::new(99));
        let b = generate_questions(&words, &mut SeededRandom::new(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_correct_position_varies() {
        let words = vocabulary(6);
        let mut rng = SeededRandom::new(5);
        let positions: HashSet<usize> = (0..30)
            .flat_map(|_| generate_questions(&words, &mut rng))
            .filter_map(|q| q.correct_index())
            .collect();
        assert!(positions.len() > 1);
    }

    #[test]
    fn test_custom_distractor_count() {
        let words = vocabulary(10);
        let questions = generate_questions_with(&words, 5, &mut SeededRandom::new(4));
        assert!(questions.iter().all(|q| q.options.len() == 6));
    }

    fn three_question_session() -> QuizSession {
        QuizSession::start(&vocabulary(3), DEFAULT_DISTRACTORS, &mut NoShuffle)
    }

    fn wrong_option(q: &Question) -> String {
        q.options
            .iter()
            .find(|o| **o != q.correct_answer)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_scoring_two_of_three() {
        let mut quiz = three_question_session();
        assert_eq!(quiz.state(), QuizState::InProgress { index: 0, score: 0 });

        let first = quiz.current_question().unwrap().correct_answer.clone();
        assert_eq!(quiz.answer_with(first), AnswerOutcome::Correct);

        let wrong = wrong_option(quiz.current_question().unwrap());
        assert_eq!(quiz.answer_with(wrong), AnswerOutcome::Incorrect);

        let third = quiz.current_question().unwrap().correct_answer.clone();
        assert_eq!(quiz.answer_with(third), AnswerOutcome::Correct);

        assert_eq!(quiz.state(), QuizState::Finished { score: 2, total: 3 });
        assert!(quiz.current_question().is_none());
        let attempt = quiz.attempt().unwrap();
        assert_eq!((attempt.score, attempt.total), (2, 3));
    }

    #[test]
    fn test_answer_without_selection_is_noop() {
        let mut quiz = three_question_session();
        assert_eq!(quiz.answer(), AnswerOutcome::NoSelection);
        assert_eq!(quiz.state(), QuizState::InProgress { index: 0, score: 0 });

        quiz.select("");
        assert!(quiz.selected().is_none());
        assert_eq!(quiz.answer(), AnswerOutcome::NoSelection);
    }

    #[test]
    fn test_selection_cleared_after_answer() {
        let mut quiz = three_question_session();
        quiz.select("def0");
        assert_eq!(quiz.selected(), Some("def0"));
        quiz.answer();
        assert!(quiz.selected().is_none());
    }

    #[test]
    fn test_finished_ignores_answers() {
        let mut quiz = QuizSession::start(&vocabulary(1), 3, &mut NoShuffle);
        quiz.answer_with("def0");
        assert!(quiz.is_finished());
        assert_eq!(quiz.answer_with("def0"), AnswerOutcome::NotInProgress);
        assert_eq!(quiz.score(), 1);
    }

    #[test]
    fn test_empty_session() {
        let mut quiz = QuizSession::start(&[], 3, &mut NoShuffle);
        assert!(quiz.is_empty());
        assert!(quiz.current_question().is_none());
        assert_eq!(quiz.answer_with("anything"), AnswerOutcome::NotInProgress);
        assert_eq!(quiz.progress(), 0.0);
        assert!(quiz.attempt().is_none());
    }

    #[test]
    fn test_progress_counts_question_on_screen() {
        let mut quiz = QuizSession::start(&vocabulary(4), 3, &mut NoShuffle);
        assert!((quiz.progress() - 0.25).abs() < f64::EPSILON);
        quiz.answer_with("def0");
        assert!((quiz.progress() - 0.5).abs() < f64::EPSILON);
        for i in 1..4 {
            quiz.answer_with(format!("def{i}"));
        }
        assert_eq!(quiz.progress(), 1.0);
    }

    #[test]
    fn test_restart_only_from_finished() {
        let words = vocabulary(2);
        let mut quiz = QuizSession::start(&words, 3, &mut NoShuffle);
        assert!(matches!(
            quiz.restart(&words, &mut NoShuffle),
            Err(KelimeError::InvalidState { .. })
        ));

        quiz.answer_with("def0");
        quiz.answer_with("nope");
        assert_eq!(quiz.state(), QuizState::Finished { score: 1, total: 2 });

        let more = vocabulary(5);
        quiz.restart(&more, &mut NoShuffle).unwrap();
        assert_eq!(quiz.state(), QuizState::InProgress { index: 0, score: 0 });
        assert_eq!(quiz.total(), 5);
        assert!(quiz.selected().is_none());
    }

    #[test]
    fn test_state_serializes_with_status_tag() {
        let json = serde_json::to_string(&QuizState::Finished { score: 2, total: 3 }).unwrap();
        assert_eq!(json, r#"{"status":"finished","score":2,"total":3}"#);
    }

    proptest! {
        #[test]
        fn prop_structure_holds_for_any_size(n in 0usize..30, seed in any::<u64>()) {
            let words = vocabulary(n);
            let questions = generate_questions(&words, &mut SeededRandom::new(seed));
            prop_assert_eq!(questions.len(), n);
            for q in &questions {
                prop_assert_eq!(q.options.len(), n.min(4));
                prop_assert!(q.options.contains(&q.source.definition));
            }
        }

        #[test]
        fn prop_score_never_decreases(answers in proptest::collection::vec(any::<bool>(), 1..12)) {
            let words = vocabulary(answers.len());
            let mut quiz = QuizSession::start(&words, 3, &mut SeededRandom::new(0));
            let mut last = 0;
            for correct in &answers {
                let q = quiz.current_question().unwrap().clone();
                let pick = if *correct { q.correct_answer.clone() } else { "wrong".to_string() };
                quiz.answer_with(pick);
                prop_assert!(quiz.score() >= last);
                last = quiz.score();
            }
            prop_assert_eq!(
                quiz.state(),
                QuizState::Finished {
                    score: answers.iter().filter(|c| **c).count() as u32,
                    total: answers.len() as u32,
                }
            );
        }
    }
}
