//! Error taxonomy for a reconciliation run and the process exit codes derived from it.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitopsError>;

/// Exit code when the wrong number of arguments was supplied.
pub const EXIT_USAGE: i32 = 1;
/// Exit code when the manifest file does not exist.
pub const EXIT_CONFIG_NOT_FOUND: i32 = 2;
/// Exit code for every failure during validation or reconciliation.
pub const EXIT_FAILURE: i32 = 3;

#[derive(Error, Debug)]
pub enum GitopsError {
    #[error("Unexpected file type: {0}")]
    UnexpectedFileType(String),

    #[error("Configuration Error: {0}")]
    Configuration(String),

    #[error("Pingdom API returned non-success status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Update completed with {failed_updates} failed update(s), please review log messages")]
    Aggregate { failed_updates: usize },

    #[error("Configuration file ({}) not found", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML{location}: {source}")]
    Yaml {
        location: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl GitopsError {
    pub fn configuration(message: impl Into<String>) -> Self {
        GitopsError::Configuration(message.into())
    }

    pub fn unexpected_file_type(message: impl Into<String>) -> Self {
        GitopsError::UnexpectedFileType(message.into())
    }

    /// True for schema and structural problems in the manifest.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GitopsError::Configuration(_) | GitopsError::UnexpectedFileType(_)
        )
    }

    /// True when a remote call failed, with or without a status code.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GitopsError::Transport { .. } | GitopsError::Network(_) | GitopsError::InvalidResponse(_)
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            GitopsError::ConfigNotFound(_) => EXIT_CONFIG_NOT_FOUND,
            _ => EXIT_FAILURE,
        }
    }
}

impl From<serde_yaml::Error> for GitopsError {
    fn from(source: serde_yaml::Error) -> Self {
        let location = match source.location() {
            Some(loc) => format!(" at line {}, column {}", loc.line(), loc.column()),
            None => String::new(),
        };
        GitopsError::Yaml { location, source }
    }
}

impl From<serde_json::Error> for GitopsError {
    fn from(err: serde_json::Error) -> Self {
        GitopsError::InvalidResponse(err.to_string())
    }
}
