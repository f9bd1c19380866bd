//! Stats command for kelime.
//!
//! Displays the profile dashboard: word, list and quiz totals.

use serde::Serialize;

use crate::cli::{percent, to_json, ErrorInfo};
use crate::core::{QuizAttempt, WordEntry};
use crate::error::{FailOpen, KelimeError};
use crate::session::UserSession;
use crate::stats::{load_stats, Stats};
use crate::storage::VocabularyStore;

/// Number of recent attempts shown in detailed mode.
const RECENT_ATTEMPTS: usize = 5;

/// Options for the stats command.
#[derive(Debug, Clone, Default)]
pub struct StatsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Add per-list progress and recent quizzes.
    pub detailed: bool,
}

/// Learned progress within one list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProgress {
    pub list_id: String,
    pub name: String,
    pub word_count: u32,
    pub learned: u32,
}

/// Output format for the stats command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOutput {
    pub success: bool,
    pub stats: Stats,
    /// `learned_words / total_words`.
    pub learned_ratio: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lists: Vec<ListProgress>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recent_quizzes: Vec<QuizAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl StatsOutput {
    /// Create a successful output.
    pub fn success(stats: Stats) -> Self {
        Self {
            success: true,
            stats,
            learned_ratio: stats.learned_ratio(),
            lists: Vec::new(),
            recent_quizzes: Vec::new(),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(err: &KelimeError) -> Self {
        Self {
            success: false,
            stats: Stats::default(),
            learned_ratio: 0.0,
            lists: Vec::new(),
            recent_quizzes: Vec::new(),
            error: Some(ErrorInfo::from(err)),
        }
    }
}

/// The stats command implementation.
pub struct StatsCommand<S: VocabularyStore> {
    store: S,
}

impl<S: VocabularyStore> StatsCommand<S> {
    /// Create a new stats command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the stats command.
    pub fn run(&self, user: Option<&UserSession>, options: &StatsOptions) -> StatsOutput {
        let Some(user) = user else {
            return StatsOutput::failure(&KelimeError::NotAuthenticated);
        };

        let stats = match load_stats(&self.store, user) {
            Ok(stats) => stats,
            Err(err) => {
                tracing::warn!(uid = user.uid(), error = %err, "loading stats failed");
                return StatsOutput::failure(&err);
            }
        };

        let mut output = StatsOutput::success(stats);
        if options.detailed {
            output.lists = self.list_progress(user);
            output.recent_quizzes = self.recent_quizzes(user);
        }
        output
    }

    // Details are best effort: the totals above already loaded.
    fn list_progress(&self, user: &UserSession) -> Vec<ListProgress> {
        let words: Vec<WordEntry> = self
            .store
            .fetch_words(user.uid())
            .fail_open_default("fetching words for list progress");
        self.store
            .fetch_lists(user.uid())
            .fail_open_default("fetching lists for list progress")
            .into_iter()
            .map(|list| {
                let learned = words
                    .iter()
                    .filter(|w| w.learned && w.list_id.as_deref() == Some(list.id.as_str()))
                    .count() as u32;
                ListProgress {
                    list_id: list.id,
                    name: list.name,
                    word_count: list.word_count,
                    learned,
                }
            })
            .collect()
    }

    fn recent_quizzes(&self, user: &UserSession) -> Vec<QuizAttempt> {
        let mut attempts = self
            .store
            .fetch_quiz_attempts(user.uid())
            .fail_open_default("fetching recent quizzes");
        attempts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        attempts.truncate(RECENT_ATTEMPTS);
        attempts
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatsOutput, options: &StatsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output, options)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &StatsOutput, options: &StatsOptions) -> String {
        if let Some(error) = &output.error {
            return format!("Stats failed: {}\n", error.message);
        }

        let stats = &output.stats;
        let mut lines = Vec::new();
        lines.push("=== Progress ===\n".to_string());

        lines.push("Words".to_string());
        lines.push(format!(
            "   Learned: {} of {} ({})",
            stats.learned_words,
            stats.total_words,
            percent(output.learned_ratio)
        ));
        lines.push(format!("   Lists: {}\n", stats.total_lists));

        lines.push("Quizzes".to_string());
        lines.push(format!("   Taken: {}", stats.quizzes_taken));
        lines.push(format!(
            "   Average score: {}\n",
            percent(stats.average_score)
        ));

        if options.detailed && !output.lists.is_empty() {
            lines.push("By list".to_string());
            for list in &output.lists {
                lines.push(format!(
                    "   {}: {}/{} learned",
                    list.name, list.learned, list.word_count
                ));
            }
            lines.push(String::new());
        }

        if options.detailed && !output.recent_quizzes.is_empty() {
            lines.push("Recent quizzes".to_string());
            for attempt in &output.recent_quizzes {
                lines.push(format!(
                    "   {}  {}/{} ({})",
                    attempt.timestamp.format("%Y-%m-%d %H:%M"),
                    attempt.score,
                    attempt.total,
                    percent(attempt.ratio())
                ));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}
