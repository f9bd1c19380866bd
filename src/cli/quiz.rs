//! Quiz command for kelime.
//!
//! Generates a multiple-choice quiz over the user's words, applies the given
//! answers in order, and records the attempt once every question has been
//! answered.
//!
//! Without answers the command only previews the questions. Pass `--seed`
//! to get the same questions and option order across invocations, so a quiz
//! can be previewed first and answered in a second run.

use serde::Serialize;

use crate::cli::{percent, to_json, ErrorInfo};
use crate::config::Config;
use crate::core::{
    AnswerOutcome, Question, QuizSession, QuizState, RandomSource, SeededRandom, ThreadRandom,
};
use crate::error::KelimeError;
use crate::session::UserSession;
use crate::storage::VocabularyStore;

/// Options for the quiz command.
#[derive(Debug, Clone, Default)]
pub struct QuizOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Seed for question and option order.
    pub seed: Option<u64>,
    /// One-based option numbers, one per question, in question order.
    pub answers: Vec<usize>,
}

/// A question as shown to the user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    /// The term being asked about.
    pub term: String,
    pub options: Vec<String>,
    /// Only revealed once the quiz is finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answered: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
}

/// Output format for the quiz command.
#[derive(Debug, Clone, Serialize)]
pub struct QuizOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<QuizState>,
    pub score: u32,
    pub total: u32,
    pub progress: f64,
    pub questions: Vec<QuestionView>,
    /// Whether the finished attempt was written to the quiz log.
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl QuizOutput {
    /// Create a failed output.
    pub fn failure(err: &KelimeError) -> Self {
        Self {
            success: false,
            state: None,
            score: 0,
            total: 0,
            progress: 0.0,
            questions: Vec::new(),
            recorded: false,
            error: Some(ErrorInfo::from(err)),
        }
    }
}

/// The quiz command implementation.
pub struct QuizCommand<S: VocabularyStore> {
    store: S,
    config: Config,
}

impl<S: VocabularyStore> QuizCommand<S> {
    /// Create a new quiz command.
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// Run a quiz for the signed-in user.
    pub fn run(&self, user: Option<&UserSession>, options: &QuizOptions) -> QuizOutput {
        let Some(user) = user else {
            return QuizOutput::failure(&KelimeError::NotAuthenticated);
        };

        let words = match self.store.fetch_words(user.uid()) {
            Ok(words) => words,
            Err(err) => {
                tracing::warn!(uid = user.uid(), error = %err, "fetching words failed");
                return QuizOutput::failure(&err);
            }
        };

        let mut rng: Box<dyn RandomSource> = match options.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(ThreadRandom::new()),
        };
        let mut session = QuizSession::start(&words, self.config.distractors(), rng.as_mut());

        if options.answers.len() > session.questions().len() {
            return QuizOutput::failure(&KelimeError::validation(
                "answers",
                format!(
                    "got {} answers for {} questions",
                    options.answers.len(),
                    session.questions().len()
                ),
            ));
        }

        let mut answered = Vec::with_capacity(options.answers.len());
        for &number in &options.answers {
            let Some(question) = session.current_question() else {
                break;
            };
            let Some(option) = number
                .checked_sub(1)
                .and_then(|i| question.options.get(i))
                .cloned()
            else {
                return QuizOutput::failure(&KelimeError::validation(
                    "answers",
                    format!(
                        "option {} is out of range 1..={}",
                        number,
                        question.options.len()
                    ),
                ));
            };
            let outcome = session.answer_with(option.clone());
            answered.push((option, outcome == AnswerOutcome::Correct));
        }

        let recorded = self.record(user, &session);
        QuizOutput {
            success: true,
            state: Some(session.state()),
            score: session.score(),
            total: session.total(),
            progress: session.progress(),
            questions: question_views(session.questions(), &answered, session.is_finished()),
            recorded,
            error: None,
        }
    }

    /// Append the finished attempt to the user's log. A failed write is
    /// logged and reported, the quiz result still stands.
    fn record(&self, user: &UserSession, session: &QuizSession) -> bool {
        let Some(attempt) = session.attempt() else {
            return false;
        };
        if attempt.total == 0 {
            return false;
        }

        match self.store.record_quiz_attempt(user.uid(), &attempt) {
            Ok(()) => {
                tracing::info!(
                    uid = user.uid(),
                    score = attempt.score,
                    total = attempt.total,
                    "quiz attempt recorded"
                );
                true
            }
            Err(err) => {
                tracing::warn!(uid = user.uid(), error = %err, "recording quiz attempt failed");
                false
            }
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &QuizOutput, options: &QuizOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &QuizOutput) -> String {
        let mut out = String::new();

        if let Some(error) = &output.error {
            out.push_str(&format!("Error: {}\n", error.message));
            return out;
        }
        if output.questions.is_empty() {
            out.push_str("No words to quiz on yet. Add some first.\n");
            return out;
        }

        for (i, question) in output.questions.iter().enumerate() {
            let mark = match question.correct {
                Some(true) => " [correct]",
                Some(false) => " [wrong]",
                None => "",
            };
            out.push_str(&format!("{}. {}{}\n", i + 1, question.term, mark));
            for (j, option) in question.options.iter().enumerate() {
                out.push_str(&format!("   {}) {}\n", j + 1, option));
            }
            if question.correct == Some(false) {
                if let Some(answer) = &question.correct_answer {
                    out.push_str(&format!("   answer: {}\n", answer));
                }
            }
        }

        out.push('\n');
        match output.state {
            Some(QuizState::Finished { score, total }) => {
                let ratio = if total == 0 {
                    0.0
                } else {
                    score as f64 / total as f64
                };
                out.push_str(&format!(
                    "Finished: {}/{} ({})\n",
                    score,
                    total,
                    percent(ratio)
                ));
                if !output.recorded {
                    out.push_str("Warning: the result could not be saved.\n");
                }
            }
            _ => {
                out.push_str(&format!(
                    "Score so far: {}/{} ({} through)\n",
                    output.score,
                    output.total,
                    percent(output.progress)
                ));
            }
        }
        out
    }
}

fn question_views(
    questions: &[Question],
    answered: &[(String, bool)],
    finished: bool,
) -> Vec<QuestionView> {
    questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let given = answered.get(i);
            QuestionView {
                term: question.source.term.clone(),
                options: question.options.clone(),
                correct_answer: finished.then(|| question.correct_answer.clone()),
                answered: given.map(|(option, _)| option.clone()),
                correct: given.map(|(_, correct)| *correct),
            }
        })
        .collect()
}
