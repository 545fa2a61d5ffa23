use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication failed for {path}: check the hub secret")]
    Authentication { path: String },

    /// Connection failures are reported here too; the hub is on the LAN and
    /// a refused connection is indistinguishable from a hub that is asleep.
    #[error("timed out talking to hub ({path}): {source}")]
    Timeout {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid request to {path} (HTTP {status}): check endpoint and payload")]
    Request { path: String, status: u16 },

    #[error("hub returned HTTP {status} for {path}: {body}")]
    Protocol {
        path: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error for {path}: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid JSON from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("no {0} found in hub data")]
    NoneFound(&'static str),

    #[error("hub data unavailable even after refresh")]
    DataUnavailable,

    #[error("schedule file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// HTTP status behind the error, when the hub answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication { .. } => Some(401),
            Error::Request { status, .. } | Error::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for both a missing entity and a missing entity list.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::NoneFound(_))
    }

    /// `true` if retrying the same call later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Protocol { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
