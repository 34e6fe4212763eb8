/// Error types for the admin client
///
/// Each layer has its own enum; `AppError` is what startup and the
/// session flow report upward.
use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the ERP back end
///
/// Carried inside UI messages, so every variant holds plain data and the
/// enum is `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The base URL in the configuration cannot carry API paths
    #[error("invalid API base URL `{0}`")]
    InvalidBaseUrl(String),

    /// Connection refused, DNS failure, reset, etc.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    /// The body could not be turned into what we expected
    #[error("unreadable response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ApiError {
    pub fn transport(url: &reqwest::Url, err: reqwest::Error) -> Self {
        ApiError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn decode(url: &reqwest::Url, message: impl ToString) -> Self {
        ApiError::Decode {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// HTTP status if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the local key/value storage file
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot create storage directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot serialize session entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One required field left blank on an unsaved row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    /// 1-based position of the row in the grid
    pub row: usize,
    pub header: &'static str,
}

/// Client-side check that blocks a bulk save
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("필수 항목 누락: {}", describe_missing(.missing))]
pub struct ValidationError {
    pub missing: Vec<MissingField>,
}

fn describe_missing(missing: &[MissingField]) -> String {
    missing
        .iter()
        .map(|m| format!("{}행 {}", m.row, m.header))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Operations the page controller refuses in its current state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("a request is still in flight")]
    Busy,

    #[error("no record selected")]
    NothingSelected,

    #[error("record is not in edit mode")]
    NotEditing,

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("field `{0}` is read-only")]
    ReadOnlyField(&'static str),

    #[error("the key of a saved record cannot be changed")]
    KeyLocked,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failures reading the TOML configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Application-level error
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
