//! Vocabulary records as stored per user.
//!
//! Field names serialize in camelCase to match the document layout under
//! `users/{uid}/words`, `users/{uid}/wordLists` and `users/{uid}/quizzes`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single vocabulary entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    /// Document identifier.
    pub id: String,
    /// The word being learned.
    pub term: String,
    /// Its meaning; doubles as the correct quiz answer.
    pub definition: String,
    /// Example sentence.
    #[serde(default)]
    pub example: String,
    /// Whether the user marked the word as learned. Never reverts.
    #[serde(default)]
    pub learned: bool,
    /// Owning list, by convention only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
}

impl WordEntry {
    /// Create a new, unlearned entry.
    pub fn new(
        id: impl Into<String>,
        term: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            term: term.into(),
            definition: definition.into(),
            example: String::new(),
            learned: false,
            list_id: None,
        }
    }

    /// Set the example sentence.
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    /// Assign the entry to a list.
    pub fn in_list(mut self, list_id: impl Into<String>) -> Self {
        self.list_id = Some(list_id.into());
        self
    }

    /// Mark the entry as learned.
    pub fn learned(mut self) -> Self {
        self.learned = true;
        self
    }
}

/// Input for creating a word; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewWord {
    pub term: String,
    pub definition: String,
    pub example: String,
    pub list_id: Option<String>,
}

impl NewWord {
    /// Trim all fields and reject empty terms or definitions.
    pub fn validated(self) -> crate::error::Result<Self> {
        let term = self.term.trim().to_string();
        let definition = self.definition.trim().to_string();
        if term.is_empty() {
            return Err(crate::error::KelimeError::validation(
                "term",
                "must not be empty",
            ));
        }
        if definition.is_empty() {
            return Err(crate::error::KelimeError::validation(
                "definition",
                "must not be empty",
            ));
        }
        Ok(Self {
            term,
            definition,
            example: self.example.trim().to_string(),
            list_id: self
                .list_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
        })
    }
}

/// A named collection of words.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordList {
    /// Document identifier.
    pub id: String,
    /// Display name (never empty after trimming).
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Number of words in the list. Recomputed by the store on read.
    #[serde(default)]
    pub word_count: u32,
    /// When the list was created.
    pub created_at: DateTime<Utc>,
}

impl WordList {
    /// Create an empty list stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            word_count: 0,
            created_at: Utc::now(),
        }
    }
}

/// Validate list input, returning the trimmed `(name, description)`.
pub fn validate_list_input(name: &str, description: &str) -> crate::error::Result<(String, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(crate::error::KelimeError::validation(
            "name",
            "list name must not be empty",
        ));
    }
    Ok((name.to_string(), description.trim().to_string()))
}

/// One completed quiz session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    /// Number of correct answers.
    pub score: u32,
    /// Number of questions asked.
    pub total: u32,
    /// When the quiz finished.
    pub timestamp: DateTime<Utc>,
}

impl QuizAttempt {
    /// Create an attempt stamped with the current time.
    pub fn new(score: u32, total: u32) -> Self {
        Self::with_timestamp(score, total, Utc::now())
    }

    /// Create an attempt with a specific timestamp.
    pub fn with_timestamp(score: u32, total: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            score,
            total,
            timestamp,
        }
    }

    /// Fraction of questions answered correctly; `0.0` for an empty quiz.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.score as f64 / self.total as f64
        }
    }
}
