//! Configuration loading for kelime.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.kelime/config.toml`)
//! 3. User config (`~/.kelime/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::DEFAULT_DISTRACTORS;
use crate::error::{KelimeError, Result};

/// Smallest accepted distractor count.
pub const MIN_DISTRACTORS: usize = 1;

/// Largest accepted distractor count.
pub const MAX_DISTRACTORS: usize = 10;

/// Main configuration struct for kelime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Quiz generation settings.
    pub quiz: QuizConfig,
    /// Where documents are stored.
    pub storage: StorageConfig,
    /// Signed-in user for the command line.
    pub user: UserConfig,
}

/// Quiz generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuizConfig {
    /// Wrong options per question; unset means the default of 3.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distractors: Option<usize>,
}

impl QuizConfig {
    /// Check if a distractor count is within bounds.
    pub fn is_valid_distractors(value: usize) -> bool {
        (MIN_DISTRACTORS..=MAX_DISTRACTORS).contains(&value)
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the default data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// User settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    /// User id reported as signed in when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_uid: Option<String>,
}

impl Config {
    /// Load configuration with full precedence chain from the current directory.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.kelime/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = kelime_home()?;
        Self::load_optional(&home.join("config.toml"))
    }

    /// Load project config from `.kelime/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_optional(&cwd.join(".kelime").join("config.toml"))
    }

    /// Load a config file if present, warning about files that fail to parse.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(mut config) => {
                if let Some(n) = config.quiz.distractors {
                    if !QuizConfig::is_valid_distractors(n) {
                        tracing::warn!(
                            path = %path.display(),
                            value = n,
                            "invalid quiz.distractors, expected {}..={}",
                            MIN_DISTRACTORS,
                            MAX_DISTRACTORS
                        );
                        config.quiz.distractors = None;
                    }
                }
                Some(config)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring config file");
                None
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| KelimeError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| KelimeError::config(e.to_string()))
    }

    /// Apply environment variable overrides. Invalid values are ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("KELIME_DISTRACTORS") {
            match val.parse::<usize>() {
                Ok(n) if QuizConfig::is_valid_distractors(n) => self.quiz.distractors = Some(n),
                _ => tracing::warn!(
                    value = %val,
                    current = self.distractors(),
                    "invalid KELIME_DISTRACTORS, expected {}..={}",
                    MIN_DISTRACTORS,
                    MAX_DISTRACTORS
                ),
            }
        }

        if let Ok(val) = env::var("KELIME_DATA_DIR") {
            if val.trim().is_empty() {
                tracing::warn!("KELIME_DATA_DIR is empty, ignoring");
            } else {
                self.storage.data_dir = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = env::var("KELIME_USER") {
            if !val.trim().is_empty() {
                self.user.default_uid = Some(val.trim().to_string());
            }
        }
    }

    /// Merge `other` on top of `self`.
    ///
    /// A value in `other` wins whenever it is set, so a file that leaves a
    /// field out does not clobber a lower layer.
    fn merge(mut self, other: Config) -> Self {
        if other.quiz.distractors.is_some() {
            self.quiz.distractors = other.quiz.distractors;
        }
        if other.storage.data_dir.is_some() {
            self.storage.data_dir = other.storage.data_dir;
        }
        if other.user.default_uid.is_some() {
            self.user.default_uid = other.user.default_uid;
        }
        self
    }

    /// Distractor count, clamped into the accepted range.
    pub fn distractors(&self) -> usize {
        self.quiz
            .distractors
            .unwrap_or(DEFAULT_DISTRACTORS)
            .clamp(MIN_DISTRACTORS, MAX_DISTRACTORS)
    }

    /// Data directory: the configured override or the default location.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage.data_dir.clone().or_else(data_dir)
    }
}

/// Get the kelime home directory.
///
/// Uses `$KELIME_HOME` if set and non-empty, otherwise `~/.kelime`.
pub fn kelime_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("KELIME_HOME") {
        if home.is_empty() {
            tracing::warn!("KELIME_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("KELIME_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".kelime"));
    }

    let fallback = env::temp_dir().join("kelime");
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback.display()
    );
    Some(fallback)
}

/// Get the default data directory.
///
/// Returns `$KELIME_DATA_DIR` if set, otherwise `<kelime_home>/data/`.
pub fn data_dir() -> Option<PathBuf> {
    match env::var("KELIME_DATA_DIR") {
        Ok(dir) if !dir.trim().is_empty() => Some(PathBuf::from(dir)),
        _ => kelime_home().map(|h| h.join("data")),
    }
}
