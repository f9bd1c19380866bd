//! Unified error types for kelime.
//!
//! Every collaborator call returns a typed [`Result`] so the caller can decide
//! whether to retry, show an inline error, or silently keep its prior state.
//! Nothing in the core is fatal to the process: failures are scoped to a
//! single flow or session.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for kelime operations.
#[derive(Error, Debug)]
pub enum KelimeError {
    /// No user is signed in.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The document store could not be reached or rejected the request.
    #[error("store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// User input failed validation; nothing was written.
    #[error("invalid {field}: {message}")]
    ValidationFailure { field: String, message: String },

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// State machine violations (invalid transitions).
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// I/O errors from the file-backed store.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML (de)serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for kelime operations.
pub type Result<T> = std::result::Result<T, KelimeError>;

impl KelimeError {
    /// Create a store-unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Create a validation error for the given input field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailure {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether retrying the same call might succeed.
    ///
    /// Backend and I/O failures are transient; validation, auth and
    /// state errors will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. } | Self::Storage { .. })
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "not_authenticated",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::ValidationFailure { .. } => "validation_failure",
            Self::NotFound { .. } => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::Storage { .. } => "storage",
            Self::Serde { .. } => "serde",
            Self::Config { .. } => "config",
        }
    }
}

impl From<io::Error> for KelimeError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for KelimeError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

/// Log-and-fall-back handling for failures that must not disturb the caller.
///
/// Used where a failed fetch should leave the previous state in place: the
/// error is logged as a warning and a default or fallback value is returned.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "{} failed, using default", context);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "{} failed, using fallback", context);
                fallback
            }
        }
    }
}

/// Exit codes for the kelime CLI.
pub mod exit_codes {
    /// The command completed.
    pub const SUCCESS: i32 = 0;

    /// The command ran but reported a failure (validation, store, ...).
    pub const FAILURE: i32 = 1;

    /// No user is signed in.
    pub const NOT_AUTHENTICATED: i32 = 2;

    /// The binary panicked.
    pub const CRASH: i32 = 3;
}
