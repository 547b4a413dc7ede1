use std::io;

use thiserror::Error;

/// One terminal outcome per run: retrieval failures (git unreachable, not a
/// repository, command failure) and parse failures (malformed timestamp,
/// unreadable stream) are both fatal and never retried.
#[derive(Debug, Error)]
pub enum RoastError {
    #[error("not a git repository")]
    NotARepo,
    #[error("git executable not found in PATH")]
    GitMissing,
    #[error("git {command} failed: {detail}")]
    GitCommand { command: String, detail: String },
    #[error("malformed commit timestamp {value:?}")]
    BadTimestamp {
        value: String,
        #[source]
        source: chrono::format::ParseError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RoastError {
    /// Process exit code for this failure. Usage errors exit 2 via clap
    /// before any of these can occur.
    pub fn exit_code(&self) -> i32 {
        match self {
            RoastError::NotARepo => 3,
            _ => 4,
        }
    }
}

pub type RoastResult<T> = Result<T, RoastError>;
