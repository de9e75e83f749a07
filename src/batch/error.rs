//! Chunk engine error types.

use std::fmt;

use thiserror::Error;

/// How the engine should treat a failed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Counted against the step's skip limit; the item is dropped.
    Skippable,
    /// Aborts the step regardless of the skip budget.
    Fatal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Skippable => "skippable",
            ErrorKind::Fatal => "fatal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to transform a single item.
#[derive(Debug, Clone, Error)]
#[error("{message} ({kind})")]
pub struct ItemError {
    kind: ErrorKind,
    message: String,
}

impl ItemError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn skippable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Skippable, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_skippable(&self) -> bool {
        self.kind == ErrorKind::Skippable
    }
}

/// Step-level failure. Any of these ends the step as `Failed`.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Reader failed: {0}")]
    Read(String),
    #[error("Writer failed: {0}")]
    Write(String),
    #[error("Item failed: {0}")]
    Item(ItemError),
    #[error("Skip limit of {limit} exceeded: {cause}")]
    SkipLimitExceeded { limit: usize, cause: ItemError },
}
