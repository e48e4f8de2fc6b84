use crate::schema::FieldKind;
use std::{fmt, path::PathBuf};
use thiserror::Error;

/// Expected/found pair carried by type errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch<T> {
    pub expected: T,
    pub found: T,
}

impl<T> Mismatch<T> {
    pub fn new(expected: T, found: T) -> Self {
        Self { expected, found }
    }
}

impl<T: fmt::Display> fmt::Display for Mismatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.found)
    }
}

/// Problem reported by a validation or post-processing hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Schema construction failures. Reported before any parsing takes place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field \"{0}\" is declared more than once")]
    DuplicateField(String),
    #[error("argument \"--{0}\" is registered more than once")]
    DuplicateArgument(String),
    #[error("argument \"--{0}\" matches no declared field and carries no explicit kind")]
    UnknownKind(String),
    #[error("default value for \"{field}\": {mismatch}")]
    DefaultKindMismatch {
        field: String,
        mismatch: Mismatch<FieldKind>,
    },
}

/// Parse-time and save-time failures. Nothing here is retried; every variant
/// propagates to the caller as-is.
#[derive(Debug, Error)]
pub enum Error {
    #[error("field \"{0}\" is bound on the command line but not declared in the schema")]
    UndeclaredField(String),
    #[error("field \"{field}\": {mismatch}")]
    TypeMismatch {
        field: String,
        mismatch: Mismatch<String>,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Parse(#[from] clap::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("failed to write argument log to {path}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
