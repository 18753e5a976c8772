//! Error types for the autopost pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Queue and archive file errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record in {path:?} at line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Queue is locked by another run ({path:?}). Remove the lock file if no other run is active.")]
    Locked { path: PathBuf },
}

impl StorageError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Write {
            path: path.into(),
            source,
        }
    }
}

/// Top-level errors surfaced by the publish loop and CLI
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Generation service returned {status}: {body}")]
    Generation { status: u16, body: String },

    #[error("Generation request failed: {0}")]
    GenerationRequest(String),

    #[error("Publishing API returned {status_code}: {body}")]
    Publish { status_code: u16, body: String },

    #[error("Publish request failed: {0}")]
    PublishRequest(String),

    #[error("Failed to resolve publishing identity: {0}")]
    ActorResolution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
