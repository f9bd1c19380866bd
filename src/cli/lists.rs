//! Lists command for kelime.
//!
//! Shows, creates and deletes word lists.

use serde::Serialize;

use crate::cli::{to_json, ErrorInfo};
use crate::core::WordList;
use crate::error::{FailOpen, KelimeError};
use crate::session::UserSession;
use crate::storage::VocabularyStore;

/// Options for the lists command.
#[derive(Debug, Clone, Default)]
pub struct ListsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// What to do with the user's lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListsAction {
    Show,
    Create { name: String, description: String },
    Delete { list_id: String },
}

/// Output format for the lists command.
#[derive(Debug, Clone, Serialize)]
pub struct ListsOutput {
    /// Whether the action succeeded.
    pub success: bool,
    /// The user's lists after the action.
    pub lists: Vec<WordList>,
    /// The list created by this action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<WordList>,
    /// The list deleted by this action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<String>,
    /// Error details if the action failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl ListsOutput {
    fn success(lists: Vec<WordList>) -> Self {
        Self {
            success: true,
            lists,
            created: None,
            deleted: None,
            error: None,
        }
    }

    /// Create a failed output. Lists known before the failure are kept.
    pub fn failure(err: &KelimeError, lists: Vec<WordList>) -> Self {
        Self {
            success: false,
            lists,
            created: None,
            deleted: None,
            error: Some(ErrorInfo::from(err)),
        }
    }
}

/// The lists command implementation.
pub struct ListsCommand<S: VocabularyStore> {
    store: S,
}

impl<S: VocabularyStore> ListsCommand<S> {
    /// Create a new lists command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the given action for the signed-in user.
    pub fn run(&self, user: Option<&UserSession>, action: &ListsAction) -> ListsOutput {
        let Some(user) = user else {
            return ListsOutput::failure(&KelimeError::NotAuthenticated, Vec::new());
        };

        match action {
            ListsAction::Show => match self.store.fetch_lists(user.uid()) {
                Ok(lists) => ListsOutput::success(lists),
                Err(err) => {
                    tracing::warn!(uid = user.uid(), error = %err, "fetching lists failed");
                    ListsOutput::failure(&err, Vec::new())
                }
            },
            ListsAction::Create { name, description } => {
                self.create(user, name, description)
            }
            ListsAction::Delete { list_id } => self.delete(user, list_id),
        }
    }

    fn create(&self, user: &UserSession, name: &str, description: &str) -> ListsOutput {
        match self.store.create_list(user.uid(), name, description) {
            Ok(list) => {
                tracing::info!(uid = user.uid(), list_id = %list.id, "list created");
                let mut output = self.refreshed(user, vec![list.clone()]);
                output.created = Some(list);
                output
            }
            Err(err) => ListsOutput::failure(&err, self.current(user)),
        }
    }

    fn delete(&self, user: &UserSession, list_id: &str) -> ListsOutput {
        match self.store.delete_list(user.uid(), list_id) {
            Ok(()) => {
                tracing::info!(uid = user.uid(), list_id, "list deleted");
                let mut output = self.refreshed(user, Vec::new());
                output.deleted = Some(list_id.to_string());
                output
            }
            Err(err) => ListsOutput::failure(&err, self.current(user)),
        }
    }

    /// Re-read lists after a write, falling back to what the write returned.
    fn refreshed(&self, user: &UserSession, fallback: Vec<WordList>) -> ListsOutput {
        let lists = self
            .store
            .fetch_lists(user.uid())
            .fail_open_with("refreshing lists", fallback);
        ListsOutput::success(lists)
    }

    fn current(&self, user: &UserSession) -> Vec<WordList> {
        self.store
            .fetch_lists(user.uid())
            .fail_open_default("fetching lists")
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ListsOutput, options: &ListsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &ListsOutput) -> String {
        let mut out = String::new();

        if let Some(error) = &output.error {
            out.push_str(&format!("Error: {}\n", error.message));
        }
        if let Some(created) = &output.created {
            out.push_str(&format!("Created list '{}' ({})\n", created.name, created.id));
        }
        if let Some(deleted) = &output.deleted {
            out.push_str(&format!("Deleted list {}\n", deleted));
        }

        if output.lists.is_empty() {
            if output.success {
                out.push_str("No word lists yet.\n");
            }
            return out;
        }

        for list in &output.lists {
            out.push_str(&format!(
                "{}  {} ({} words)\n",
                list.id, list.name, list.word_count
            ));
            if !list.description.is_empty() {
                out.push_str(&format!("    {}\n", list.description));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WordEntry;
    use crate::session::StaticAuth;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryStore>, ListsCommand<Arc<MemoryStore>>, UserSession) {
        let store = Arc::new(MemoryStore::new());
        let cmd = ListsCommand::new(Arc::clone(&store));
        let user = UserSession::begin(&StaticAuth::signed_in("u1")).unwrap();
        (store, cmd, user)
    }

    fn create(name: &str) -> ListsAction {
        ListsAction::Create {
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_show_empty() {
        let (_store, cmd, user) = setup();
        let output = cmd.run(Some(&user), &ListsAction::Show);
        assert!(output.success);
        assert!(output.lists.is_empty());
        assert!(cmd
            .format_output(&output, &ListsOptions::default())
            .contains("No word lists yet"));
    }

    #[test]
    fn test_create_and_show() {
        let (store, cmd, user) = setup();
        let output = cmd.run(Some(&user), &create("  Fruits "));
        assert!(output.success);
        let created = output.created.unwrap();
        assert_eq!(created.name, "Fruits");
        assert_eq!(output.lists.len(), 1);

        store.insert_words(
            "u1",
            vec![WordEntry::new("w", "armut", "pear").in_list(created.id.clone())],
        );
        let output = cmd.run(Some(&user), &ListsAction::Show);
        assert_eq!(output.lists[0].word_count, 1);
    }

    #[test]
    fn test_create_blank_name_blocks_write() {
        let (store, cmd, user) = setup();
        let output = cmd.run(Some(&user), &create("   "));
        assert!(!output.success);
        assert_eq!(output.error.unwrap().kind, "validation_failure");
        assert!(store.fetch_lists("u1").unwrap().is_empty());
    }

    #[test]
    fn test_delete() {
        let (_store, cmd, user) = setup();
        let id = cmd.run(Some(&user), &create("Old")).created.unwrap().id;
        cmd.run(Some(&user), &create("Keep"));

        let output = cmd.run(
            Some(&user),
            &ListsAction::Delete {
                list_id: id.clone(),
            },
        );
        assert!(output.success);
        assert_eq!(output.deleted, Some(id));
        assert_eq!(output.lists.len(), 1);
        assert_eq!(output.lists[0].name, "Keep");
    }

    #[test]
    fn test_not_authenticated() {
        let (_store, cmd, _user) = setup();
        let output = cmd.run(None, &ListsAction::Show);
        assert!(!output.success);
        assert!(output.error.unwrap().is_not_authenticated());
    }

    #[test]
    fn test_store_unavailable() {
        let (store, cmd, user) = setup();
        store.set_available(false);
        let output = cmd.run(Some(&user), &ListsAction::Show);
        assert!(!output.success);
        assert_eq!(output.error.unwrap().kind, "store_unavailable");
    }

    #[test]
    fn test_format_output_json_and_quiet() {
        let (_store, cmd, user) = setup();
        let output = cmd.run(Some(&user), &create("Colors"));

        let json = cmd.format_output(
            &output,
            &ListsOptions {
                json: true,
                ..Default::default()
            },
        );
        assert!(json.contains("\"success\": true"));
        assert!(json.contains("\"wordCount\": 0"));

        let quiet = cmd.format_output(
            &output,
            &ListsOptions {
                quiet: true,
                ..Default::default()
            },
        );
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_format_human_readable() {
        let (_store, cmd, user) = setup();
        let output = cmd.run(
            Some(&user),
            &ListsAction::Create {
                name: "Colors".into(),
                description: "basic colors".into(),
            },
        );
        let text = cmd.format_output(&output, &ListsOptions::default());
        assert!(text.contains("Created list 'Colors'"));
        assert!(text.contains("(0 words)"));
        assert!(text.contains("basic colors"));
    }
}
