//! Error types for the mouselab crate

use thiserror::Error;

/// Main error type for the mouselab crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid distribution: {message}")]
    InvalidDistribution { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("environment '{name}' is already registered")]
    DuplicateEnvironment { name: String },

    #[error("unknown environment '{name}'")]
    UnknownEnvironment { name: String },

    #[error("action {action} is not valid in state {state}")]
    InvalidAction { action: usize, state: String },

    #[error("episode already terminated")]
    EpisodeOver,

    #[error(
        "dedup sentinel {sentinel} collides with a real outcome value at node {node}; \
         choose a value no distribution can produce"
    )]
    SentinelCollision { sentinel: f64, node: usize },

    #[error("node {node} is missing the '{attribute}' attribute required by {context}")]
    MissingNodeAttribute {
        node: usize,
        attribute: String,
        context: String,
    },

    #[error("invalid {option} '{input}'. Expected one of: {expected}")]
    ParseOption {
        option: String,
        input: String,
        expected: String,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("invalid progress bar template: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
