//! Error types for configuration loading and request dispatch.

use std::path::PathBuf;

/// Reasons a configuration cannot become a usable catalog
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration has no personas")]
    NoPersonas,

    #[error("Configuration has no commands")]
    NoCommands,

    #[error("Default persona '{0}' is not defined")]
    UnknownDefaultPersona(String),

    #[error("Persona '{0}' is defined more than once")]
    DuplicatePersona(String),

    #[error("Command '{0}' is defined more than once")]
    DuplicateCommand(String),

    #[error("Command '{0}' has an empty trigger")]
    EmptyTrigger(String),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid persona file {path:?}: {message}")]
    Frontmatter { path: PathBuf, message: String },
}

/// Failures surfaced by the dispatcher boundary
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Configuration is invalid: {0}")]
    NotInitialized(#[from] ConfigError),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}
