//! Kelime - vocabulary practice from the command line
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kelime::cli::lists::ListsAction;
use kelime::cli::ErrorInfo;
use kelime::config::{kelime_home, Config};
use kelime::core::NewWord;
use kelime::error::{exit_codes, KelimeError};
use kelime::session::{StaticAuth, UserSession};
use kelime::storage::FileStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// Kelime - vocabulary practice with word lists, flashcards and quizzes
#[derive(Parser)]
#[command(name = "kelime")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Act as this user instead of the configured default
    #[arg(long, short, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show word lists with their word counts
    Lists {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Create a word list
    CreateList {
        /// List name
        name: String,
        /// Optional description
        #[arg(long, short, default_value = "")]
        description: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Delete a word list (its words are kept)
    DeleteList {
        /// List id
        list_id: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show words
    Words {
        /// Only words in this list
        #[arg(long, short)]
        list: Option<String>,
        /// Only words not yet learned
        #[arg(long)]
        unlearned: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Add a word
    AddWord {
        /// The word or phrase
        term: String,
        /// Its meaning
        definition: String,
        /// An example sentence
        #[arg(long, short, default_value = "")]
        example: String,
        /// Put the word into this list
        #[arg(long, short)]
        list: Option<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show a flashcard, optionally revealing it or marking it learned
    Learn {
        /// Zero-based card to open
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Open the card of this word id
        #[arg(long, short, conflicts_with = "start")]
        word: Option<String>,
        /// Show the meaning
        #[arg(long, short)]
        reveal: bool,
        /// Mark the card as learned
        #[arg(long, short)]
        mark: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Take a multiple-choice quiz
    Quiz {
        /// Option numbers (1-based), one per question in order
        answers: Vec<usize>,
        /// Seed for question and option order
        #[arg(long, short)]
        seed: Option<u64>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Display progress statistics
    Stats {
        /// Show per-list progress and recent quizzes
        #[arg(long, short)]
        detailed: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    setup_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("kelime error: {}", e);
            ExitCode::from(exit_codes::FAILURE as u8)
        }
    }
}

/// Install the stderr subscriber. `KELIME_LOG` takes an `EnvFilter`
/// directive; the default is `warn`.
fn setup_tracing() {
    let filter = EnvFilter::try_from_env("KELIME_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.kelime/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("kelime panic: {}", info);

        if let Some(home) = kelime_home() {
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load();

    let data_dir = config
        .data_dir()
        .ok_or_else(|| KelimeError::config("could not determine data directory"))?;
    let store = Arc::new(FileStore::with_dir(data_dir)?);
    let user = sign_in(cli.user.as_deref(), &config);

    match cli.command {
        Commands::Lists { json, quiet } => {
            run_lists(&store, user.as_ref(), ListsAction::Show, json, quiet)
        }
        Commands::CreateList {
            name,
            description,
            json,
            quiet,
        } => run_lists(
            &store,
            user.as_ref(),
            ListsAction::Create { name, description },
            json,
            quiet,
        ),
        Commands::DeleteList {
            list_id,
            json,
            quiet,
        } => run_lists(
            &store,
            user.as_ref(),
            ListsAction::Delete { list_id },
            json,
            quiet,
        ),
        Commands::Words {
            list,
            unlearned,
            json,
            quiet,
        } => run_words(&store, user.as_ref(), list, unlearned, json, quiet),
        Commands::AddWord {
            term,
            definition,
            example,
            list,
            json,
            quiet,
        } => {
            let word = NewWord {
                term,
                definition,
                example,
                list_id: list,
            };
            run_add_word(&store, user.as_ref(), word, json, quiet)
        }
        Commands::Learn {
            start,
            word,
            reveal,
            mark,
            json,
            quiet,
        } => {
            use kelime::cli::learn::LearnOptions;
            let options = LearnOptions {
                json,
                quiet,
                start,
                word,
                reveal,
                mark,
            };
            run_learn(&store, user.as_ref(), &options)
        }
        Commands::Quiz {
            answers,
            seed,
            json,
            quiet,
        } => {
            use kelime::cli::quiz::QuizOptions;
            let options = QuizOptions {
                json,
                quiet,
                seed,
                answers,
            };
            run_quiz(&store, config, user.as_ref(), &options)
        }
        Commands::Stats {
            detailed,
            json,
            quiet,
        } => run_stats(&store, user.as_ref(), detailed, json, quiet),
    }
}

/// Resolve the acting user: `--user`, then `user.default_uid` from config.
fn sign_in(flag: Option<&str>, config: &Config) -> Option<UserSession> {
    let uid = flag
        .map(str::to_string)
        .or_else(|| config.user.default_uid.clone());
    let auth = match uid {
        Some(uid) => StaticAuth::signed_in(uid),
        None => StaticAuth::signed_out(),
    };

    match UserSession::begin(&auth) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::debug!(error = %e, "no signed-in user");
            None
        }
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Map a command outcome to an exit code.
fn exit_code(success: bool, error: Option<&ErrorInfo>) -> i32 {
    match error {
        Some(error) if error.is_not_authenticated() => exit_codes::NOT_AUTHENTICATED,
        _ if success => exit_codes::SUCCESS,
        _ => exit_codes::FAILURE,
    }
}

fn print(formatted: &str) {
    if !formatted.is_empty() {
        println!("{}", formatted.trim_end());
    }
}

fn run_lists(
    store: &Arc<FileStore>,
    user: Option<&UserSession>,
    action: ListsAction,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use kelime::cli::lists::{ListsCommand, ListsOptions};

    let cmd = ListsCommand::new(Arc::clone(store));
    let options = ListsOptions { json, quiet };

    let output = cmd.run(user, &action);
    print(&cmd.format_output(&output, &options));

    Ok(ExitCode::from(
        exit_code(output.success, output.error.as_ref()) as u8,
    ))
}

fn run_words(
    store: &Arc<FileStore>,
    user: Option<&UserSession>,
    list_id: Option<String>,
    unlearned: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use kelime::cli::words::{WordsCommand, WordsOptions};

    let cmd = WordsCommand::new(Arc::clone(store));
    let options = WordsOptions {
        json,
        quiet,
        list_id,
        unlearned,
    };

    let output = cmd.run(user, &options);
    print(&cmd.format_output(&output, &options));

    Ok(ExitCode::from(
        exit_code(output.success, output.error.as_ref()) as u8,
    ))
}

fn run_add_word(
    store: &Arc<FileStore>,
    user: Option<&UserSession>,
    word: NewWord,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use kelime::cli::words::{WordsCommand, WordsOptions};

    let cmd = WordsCommand::new(Arc::clone(store));
    let options = WordsOptions {
        json,
        quiet,
        ..Default::default()
    };

    let output = cmd.add(user, word);
    print(&cmd.format_output(&output, &options));

    Ok(ExitCode::from(
        exit_code(output.success, output.error.as_ref()) as u8,
    ))
}

fn run_learn(
    store: &Arc<FileStore>,
    user: Option<&UserSession>,
    options: &kelime::cli::learn::LearnOptions,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use kelime::cli::learn::LearnCommand;

    let cmd = LearnCommand::new(Arc::clone(store));
    let output = cmd.run(user, options);
    print(&cmd.format_output(&output, options));

    Ok(ExitCode::from(
        exit_code(output.success, output.error.as_ref()) as u8,
    ))
}

fn run_quiz(
    store: &Arc<FileStore>,
    config: Config,
    user: Option<&UserSession>,
    options: &kelime::cli::quiz::QuizOptions,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use kelime::cli::quiz::QuizCommand;

    let cmd = QuizCommand::new(Arc::clone(store), config);
    let output = cmd.run(user, options);
    print(&cmd.format_output(&output, options));

    Ok(ExitCode::from(
        exit_code(output.success, output.error.as_ref()) as u8,
    ))
}

fn run_stats(
    store: &Arc<FileStore>,
    user: Option<&UserSession>,
    detailed: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use kelime::cli::stats::{StatsCommand, StatsOptions};

    let cmd = StatsCommand::new(Arc::clone(store));
    let options = StatsOptions {
        json,
        quiet,
        detailed,
    };

    let output = cmd.run(user, &options);
    print(&cmd.format_output(&output, &options));

    Ok(ExitCode::from(
        exit_code(output.success, output.error.as_ref()) as u8,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_create_list() {
        let cli = Cli::parse_from([
            "kelime",
            "--user",
            "u1",
            "create-list",
            "Fruits",
            "--description",
            "things to eat",
        ]);
        assert_eq!(cli.user.as_deref(), Some("u1"));
        match cli.command {
            Commands::CreateList {
                name, description, ..
            } => {
                assert_eq!(name, "Fruits");
                assert_eq!(description, "things to eat");
            }
            _ => panic!("Expected CreateList command"),
        }
    }

    #[test]
    fn test_cli_parse_quiz_answers() {
        let cli = Cli::parse_from(["kelime", "quiz", "2", "1", "4", "--seed", "7", "--json"]);
        match cli.command {
            Commands::Quiz {
                answers,
                seed,
                json,
                ..
            } => {
                assert_eq!(answers, vec![2, 1, 4]);
                assert_eq!(seed, Some(7));
                assert!(json);
            }
            _ => panic!("Expected Quiz command"),
        }
    }

    #[test]
    fn test_cli_parse_learn() {
        let cli = Cli::parse_from(["kelime", "learn", "--word", "w1", "--mark"]);
        match cli.command {
            Commands::Learn { word, mark, .. } => {
                assert_eq!(word.as_deref(), Some("w1"));
                assert!(mark);
            }
            _ => panic!("Expected Learn command"),
        }
    }

    #[test]
    fn test_cli_parse_user_after_subcommand() {
        let cli = Cli::parse_from(["kelime", "stats", "--detailed", "--user", "u2"]);
        assert_eq!(cli.user.as_deref(), Some("u2"));
        assert!(matches!(cli.command, Commands::Stats { detailed: true, .. }));
    }

    #[test]
    fn test_sign_in_precedence() {
        let mut config = Config::default();
        assert!(sign_in(None, &config).is_none());

        config.user.default_uid = Some("from-config".to_string());
        assert_eq!(sign_in(None, &config).unwrap().uid(), "from-config");
        assert_eq!(sign_in(Some("flag"), &config).unwrap().uid(), "flag");
        assert!(sign_in(Some("  "), &Config::default()).is_none());
    }

    #[test]
    fn test_exit_code() {
        let auth = ErrorInfo::from(&KelimeError::NotAuthenticated);
        let other = ErrorInfo::from(&KelimeError::store_unavailable("down"));
        assert_eq!(exit_code(true, None), exit_codes::SUCCESS);
        assert_eq!(exit_code(false, Some(&auth)), exit_codes::NOT_AUTHENTICATED);
        assert_eq!(exit_code(false, Some(&other)), exit_codes::FAILURE);
    }
}
