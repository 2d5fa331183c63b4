//! Error types
//!
//! Everything here is either a transient I/O failure (logged and dropped at the
//! session boundary) or a rejected request. Collisions are not errors.

use thiserror::Error;

use crate::session::SessionPhase;

/// Failure to store a finished session
#[derive(Error, Debug)]
pub enum PersistError {
    /// Summary could not be encoded
    #[error("failed to encode session record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Local storage (file, LocalStorage) refused the write
    #[error("storage write failed: {0}")]
    Storage(String),

    /// Remote endpoint answered with a non-success status
    #[error("session upload rejected with HTTP {status}")]
    Rejected { status: u16 },
}

impl From<std::io::Error> for PersistError {
    fn from(err: std::io::Error) -> Self {
        PersistError::Storage(err.to_string())
    }
}

/// Failure to produce a sound. Always best-effort.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No audio device/context could be created
    #[error("audio output unavailable")]
    Unavailable,

    /// The backend failed while building or starting a node
    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Invalid configuration input
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Zero breaths per minute has no cycle duration
    #[error("breathing rate must be positive, got {0}")]
    InvalidRate(u32),

    #[error("unknown volume level: {0}")]
    UnknownVolume(String),

    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
}

/// Lifecycle request that is not valid from the current phase
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        from: SessionPhase,
        action: &'static str,
    },
}
