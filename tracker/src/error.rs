//! Error types for the tracker.

use std::path::PathBuf;

use driftbook::{Symbol, ValidationError};
use driftbook_prices::PriceError;

/// All errors that can occur during tracker operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("portfolio spec error: {0}")]
    Spec(String),

    #[error("failed to read portfolio spec {path}: {source}")]
    SpecRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid asset search: {0}")]
    Search(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("no price available for {0}")]
    PriceUnavailable(Symbol),

    #[error("a user with email {0} already exists")]
    DuplicateUser(String),

    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    #[error("failed to read store file {path}: {source}")]
    StoreRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write store file {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("store file {path} is corrupt: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },

    #[error("price source error: {0}")]
    Price(#[from] PriceError),

    #[error("aborted: {0}")]
    Aborted(String),

    #[error("confirmation prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Process exit code for the CLI: 0 when the user declined, 2 for a
    /// missing record, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Aborted(_) => 0,
            Error::NotFound { .. } => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
