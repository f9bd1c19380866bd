//! Learn command for kelime.
//!
//! Steps through the user's words as flashcards and optionally marks the
//! card on screen as learned.

use serde::Serialize;

use crate::cli::{percent, to_json, ErrorInfo};
use crate::core::{LearningSession, WordEntry};
use crate::error::KelimeError;
use crate::session::UserSession;
use crate::storage::VocabularyStore;

/// Options for the learn command.
#[derive(Debug, Clone, Default)]
pub struct LearnOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Zero-based card to open, clamped to the last card.
    pub start: usize,
    /// Open the card of this word id instead of `start`.
    pub word: Option<String>,
    /// Show the meaning of the card.
    pub reveal: bool,
    /// Mark the card as learned and move to the next one.
    pub mark: bool,
}

/// The card on screen. The meaning is only present once revealed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub learned: bool,
}

impl Card {
    fn from_word(word: &WordEntry, meaning_shown: bool) -> Self {
        let example = (meaning_shown && !word.example.is_empty()).then(|| word.example.clone());
        Self {
            id: word.id.clone(),
            term: word.term.clone(),
            definition: meaning_shown.then(|| word.definition.clone()),
            example,
            learned: word.learned,
        }
    }
}

/// Output format for the learn command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    pub index: usize,
    pub total: usize,
    pub progress: f64,
    pub learned_count: usize,
    /// Word marked learned by this run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marked: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl LearnOutput {
    fn from_session(session: &LearningSession) -> Self {
        Self {
            success: true,
            card: session
                .current()
                .map(|word| Card::from_word(word, session.meaning_shown())),
            index: session.index(),
            total: session.len(),
            progress: session.progress(),
            learned_count: session.learned_count(),
            marked: None,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(err: &KelimeError) -> Self {
        Self {
            success: false,
            card: None,
            index: 0,
            total: 0,
            progress: 0.0,
            learned_count: 0,
            marked: None,
            error: Some(ErrorInfo::from(err)),
        }
    }
}

/// The learn command implementation.
pub struct LearnCommand<S: VocabularyStore> {
    store: S,
}

impl<S: VocabularyStore> LearnCommand<S> {
    /// Create a new learn command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Open a learning session and apply the requested card actions.
    pub fn run(&self, user: Option<&UserSession>, options: &LearnOptions) -> LearnOutput {
        let Some(user) = user else {
            return LearnOutput::failure(&KelimeError::NotAuthenticated);
        };

        let mut session = match LearningSession::load(&self.store, user) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(uid = user.uid(), error = %err, "loading words failed");
                return LearnOutput::failure(&err);
            }
        };

        let target = match &options.word {
            Some(word_id) => match session.words().iter().position(|w| &w.id == word_id) {
                Some(position) => position,
                None => return LearnOutput::failure(&KelimeError::not_found("word", word_id)),
            },
            None => options.start,
        };
        for _ in 0..target.min(session.len().saturating_sub(1)) {
            session.next();
        }
        if options.reveal {
            session.toggle_meaning();
        }

        if !options.mark || session.is_empty() {
            return LearnOutput::from_session(&session);
        }

        let word_id = session.current().map(|w| w.id.clone());
        match session.mark_learned(&self.store, user) {
            Ok(()) => {
                let mut output = LearnOutput::from_session(&session);
                output.marked = word_id;
                output
            }
            Err(err) => {
                let mut output = LearnOutput::from_session(&session);
                output.success = false;
                output.error = Some(ErrorInfo::from(&err));
                output
            }
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &LearnOutput, options: &LearnOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &LearnOutput) -> String {
        let mut out = String::new();

        if let Some(error) = &output.error {
            out.push_str(&format!("Error: {}\n", error.message));
            if error.is_not_authenticated() {
                return out;
            }
        }
        if let Some(marked) = &output.marked {
            out.push_str(&format!("Marked {} as learned\n", marked));
        }

        let Some(card) = &output.card else {
            if output.success {
                out.push_str("No words to learn yet. Add some first.\n");
            }
            return out;
        };

        out.push_str(&format!(
            "Card {}/{} ({})\n\n",
            output.index + 1,
            output.total,
            percent(output.progress)
        ));
        out.push_str(&format!("  {}", card.term));
        if card.learned {
            out.push_str("  [learned]");
        }
        out.push('\n');

        match &card.definition {
            Some(definition) => {
                out.push_str(&format!("  {}\n", definition));
                if let Some(example) = &card.example {
                    out.push_str(&format!("  e.g. {}\n", example));
                }
            }
            None => out.push_str("  (use --reveal to show the meaning)\n"),
        }

        out.push_str(&format!(
            "\nLearned: {}/{}\n",
            output.learned_count, output.total
        ));
        out
    }
}
