//! Words command for kelime.
//!
//! Shows and adds vocabulary entries.

use serde::Serialize;

use crate::cli::{to_json, ErrorInfo};
use crate::core::{NewWord, WordEntry};
use crate::error::KelimeError;
use crate::session::UserSession;
use crate::storage::VocabularyStore;

/// Options for the words command.
#[derive(Debug, Clone, Default)]
pub struct WordsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Only show words of this list.
    pub list_id: Option<String>,
    /// Only show words not yet learned.
    pub unlearned: bool,
}

/// Output format for the words command.
#[derive(Debug, Clone, Serialize)]
pub struct WordsOutput {
    pub success: bool,
    pub words: Vec<WordEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<WordEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl WordsOutput {
    fn success(words: Vec<WordEntry>) -> Self {
        Self {
            success: true,
            words,
            added: None,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(err: &KelimeError) -> Self {
        Self {
            success: false,
            words: Vec::new(),
            added: None,
            error: Some(ErrorInfo::from(err)),
        }
    }
}

/// The words command implementation.
pub struct WordsCommand<S: VocabularyStore> {
    store: S,
}

impl<S: VocabularyStore> WordsCommand<S> {
    /// Create a new words command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Show the user's words, filtered by the options.
    pub fn run(&self, user: Option<&UserSession>, options: &WordsOptions) -> WordsOutput {
        let Some(user) = user else {
            return WordsOutput::failure(&KelimeError::NotAuthenticated);
        };

        match self.store.fetch_words(user.uid()) {
            Ok(words) => WordsOutput::success(filter_words(words, options)),
            Err(err) => {
                tracing::warn!(uid = user.uid(), error = %err, "fetching words failed");
                WordsOutput::failure(&err)
            }
        }
    }

    /// Add a word for the user.
    pub fn add(&self, user: Option<&UserSession>, word: NewWord) -> WordsOutput {
        let Some(user) = user else {
            return WordsOutput::failure(&KelimeError::NotAuthenticated);
        };

        let word = match word.validated() {
            Ok(word) => word,
            Err(err) => return WordsOutput::failure(&err),
        };

        if let Some(list_id) = word.list_id.as_deref() {
            match self.store.fetch_lists(user.uid()) {
                Ok(lists) if lists.iter().any(|l| l.id == list_id) => {}
                Ok(_) => return WordsOutput::failure(&KelimeError::not_found("list", list_id)),
                Err(err) => return WordsOutput::failure(&err),
            }
        }

        match self.store.add_word(user.uid(), word) {
            Ok(added) => {
                tracing::info!(uid = user.uid(), word_id = %added.id, "word added");
                let mut output = WordsOutput::success(vec![added.clone()]);
                output.added = Some(added);
                output
            }
            Err(err) => WordsOutput::failure(&err),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &WordsOutput, options: &WordsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &WordsOutput) -> String {
        let mut out = String::new();

        if let Some(error) = &output.error {
            out.push_str(&format!("Error: {}\n", error.message));
            return out;
        }
        if let Some(added) = &output.added {
            out.push_str(&format!("Added '{}' ({})\n", added.term, added.id));
            return out;
        }
        if output.words.is_empty() {
            out.push_str("No words yet.\n");
            return out;
        }

        for word in &output.words {
            let mark = if word.learned { "x" } else { " " };
            out.push_str(&format!(
                "[{}] {}  {} - {}\n",
                mark, word.id, word.term, word.definition
            ));
        }
        out
    }
}

fn filter_words(words: Vec<WordEntry>, options: &WordsOptions) -> Vec<WordEntry> {
    words
        .into_iter()
        .filter(|w| match &options.list_id {
            Some(list_id) => w.list_id.as_deref() == Some(list_id.as_str()),
            None => true,
        })
        .filter(|w| !options.unlearned || !w.learned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticAuth;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryStore>, WordsCommand<Arc<MemoryStore>>, UserSession) {
        let store = Arc::new(MemoryStore::new());
        let cmd = WordsCommand::new(Arc::clone(&store));
        let user = UserSession::begin(&StaticAuth::signed_in("u1")).unwrap();
        (store, cmd, user)
    }

    fn new_word(term: &str, definition: &str) -> NewWord {
        NewWord {
            term: term.into(),
            definition: definition.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_and_show() {
        let (_store, cmd, user) = setup();
        let output = cmd.add(Some(&user), new_word("kitap", "book"));
        assert!(output.success);
        assert_eq!(output.added.unwrap().term, "kitap");

        let output = cmd.run(Some(&user), &WordsOptions::default());
        assert_eq!(output.words.len(), 1);
    }

    #[test]
    fn test_add_validation() {
        let (store, cmd, user) = setup();
        let output = cmd.add(Some(&user), new_word(" ", "book"));
        assert!(!output.success);
        assert_eq!(output.error.unwrap().kind, "validation_failure");
        assert!(store.fetch_words("u1").unwrap().is_empty());
    }

    #[test]
    fn test_add_validates_before_checking_list() {
        let (store, cmd, user) = setup();
        store.set_available(false);
        let mut word = new_word("", "pen");
        word.list_id = Some("missing".into());
        let output = cmd.add(Some(&user), word);
        assert_eq!(output.error.unwrap().kind, "validation_failure");
    }

    #[test]
    fn test_add_to_unknown_list() {
        let (_store, cmd, user) = setup();
        let mut word = new_word("kalem", "pen");
        word.list_id = Some("missing".into());
        let output = cmd.add(Some(&user), word);
        assert_eq!(output.error.unwrap().kind, "not_found");
    }

    #[test]
    fn test_filters() {
        let (store, cmd, user) = setup();
        store.insert_words(
            "u1",
            vec![
                WordEntry::new("a", "bir", "one").in_list("nums").learned(),
                WordEntry::new("b", "iki", "two").in_list("nums"),
                WordEntry::new("c", "mavi", "blue"),
            ],
        );

        let by_list = cmd.run(
            Some(&user),
            &WordsOptions {
                list_id: Some("nums".into()),
                ..Default::default()
            },
        );
        assert_eq!(by_list.words.len(), 2);

        let unlearned = cmd.run(
            Some(&user),
            &WordsOptions {
                unlearned: true,
                ..Default::default()
            },
        );
        let ids: Vec<&str> = unlearned.words.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_not_authenticated() {
        let (_store, cmd, _user) = setup();
        assert!(!cmd.run(None, &WordsOptions::default()).success);
        assert!(!cmd.add(None, new_word("a", "b")).success);
    }

    #[test]
    fn test_format_human_readable() {
        let (store, cmd, user) = setup();
        store.insert_words("u1", vec![WordEntry::new("a", "bir", "one").learned()]);
        let output = cmd.run(Some(&user), &WordsOptions::default());
        let text = cmd.format_output(&output, &WordsOptions::default());
        assert!(text.contains("[x] a  bir - one"));
    }
}
