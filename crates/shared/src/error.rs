use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoFileSelected,
    TransportError,
    BackendRejected,
    EmptyAnswer,
}

/// Failure to obtain a usable response from the document service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Network response was not ok: {status}")]
    Status { status: u16, body: String },
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Request(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("could not read document: {0}")]
    Io(String),
    #[error("document is {size} bytes; the upload limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

impl TransportError {
    /// Response body captured for diagnostics, when the service sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("Please select a file to upload.")]
    NoFileSelected,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{0}")]
    BackendRejected(String),
    #[error("No answer received from server")]
    EmptyAnswer,
}

impl ControllerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ControllerError::NoFileSelected => ErrorKind::NoFileSelected,
            ControllerError::Transport(_) => ErrorKind::TransportError,
            ControllerError::BackendRejected(_) => ErrorKind::BackendRejected,
            ControllerError::EmptyAnswer => ErrorKind::EmptyAnswer,
        }
    }
}
