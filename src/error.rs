//! Error types for `pr_agent`.

use std::path::PathBuf;

/// Errors that can occur in the PR agent tools and the webhook receiver.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regex error occurred.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// An inbound webhook body was not well-formed JSON.
    #[error("JSON Decode Error: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    /// The events file exists but does not hold a valid event log.
    #[error("Failed to read or parse events file {}: {source}", path.display())]
    CorruptStore {
        /// Location of the events file.
        path: PathBuf,
        /// The underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A command execution failed.
    #[error("Command '{command}' failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        /// The command that was run.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// The stderr output.
        stderr: String,
    },

    /// Git is not available or not in a git repository.
    #[error("Git error: {0}")]
    Git(String),

    /// A template error occurred.
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration could not be resolved.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The log subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
