//! CLI commands for kelime.
//!
//! Each command drives one flow against a [`VocabularyStore`] for a signed-in
//! [`UserSession`], and returns a serializable output that can be rendered as
//! JSON or as human-readable text:
//! - **Authoring**: lists, words
//! - **Practice**: learn, quiz
//! - **Profile**: stats
//!
//! [`VocabularyStore`]: crate::storage::VocabularyStore
//! [`UserSession`]: crate::session::UserSession

pub mod learn;
pub mod lists;
pub mod quiz;
pub mod stats;
pub mod words;

pub use learn::LearnCommand;
pub use lists::ListsCommand;
pub use quiz::QuizCommand;
pub use stats::StatsCommand;
pub use words::WordsCommand;

use serde::{Deserialize, Serialize};

use crate::error::KelimeError;

/// Error details carried in command outputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Machine-readable kind, e.g. `validation_failure`.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Whether running the command again may succeed.
    pub retryable: bool,
}

impl From<&KelimeError> for ErrorInfo {
    fn from(err: &KelimeError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

impl ErrorInfo {
    /// Whether this error means nobody is signed in.
    pub fn is_not_authenticated(&self) -> bool {
        self.kind == KelimeError::NotAuthenticated.kind()
    }
}

/// Render an output as pretty JSON.
pub(crate) fn to_json<T: Serialize>(output: &T) -> String {
    serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
}

/// Render a fraction as a whole percentage.
pub(crate) fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}
