//! Typed failures for the reading session and its collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No book reference was handed to the session.
    #[error("No book URL provided")]
    MissingSource,

    /// The command has no effect in the current mode. Shown to the reader as
    /// an advisory, nothing was changed.
    #[error("{0}")]
    UnsupportedOperation(String),

    #[error("Could not persist highlights: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Failed to start TTS engine `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TTS engine command is empty")]
    EmptyCommand,
}
