// src/error.rs
use thiserror::Error;

/// Failures reported by an analysis backend, before they are mapped onto the
/// operation that issued the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The service answered with a non-2xx status.
    #[error("{status} {status_text}")]
    Status { status: u16, status_text: String },

    /// Connection refused, reset, timed out and the like.
    #[error("network error: {0}")]
    Transport(String),

    /// A 2xx answer whose body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

impl BackendError {
    pub fn status(status: u16, status_text: impl Into<String>) -> Self {
        Self::Status {
            status,
            status_text: status_text.into(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<url::ParseError> for BackendError {
    fn from(err: url::ParseError) -> Self {
        Self::Endpoint(err.to_string())
    }
}

/// Why an upload did not produce a dataset. The display text is what the
/// user sees in the error banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Please select a file to upload.")]
    NoFile,

    #[error("Could not read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Upload failed: {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Upload failed: {0}")]
    Transport(String),

    #[error("Upload failed: the server sent an unreadable response ({0})")]
    Malformed(String),

    /// 2xx answer without a usable `dataset_id`.
    #[error("Upload finished but the server did not return a dataset id.")]
    MissingDatasetId,
}

impl From<BackendError> for UploadError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status {
                status,
                status_text,
            } => Self::Http {
                status,
                status_text,
            },
            BackendError::Decode(reason) => Self::Malformed(reason),
            BackendError::Transport(reason) | BackendError::Endpoint(reason) => {
                Self::Transport(reason)
            }
        }
    }
}

/// Why a chat message was rejected or went unanswered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Please enter a message.")]
    EmptyInput,

    #[error("Please upload a dataset before asking for an analysis.")]
    UploadRequired,

    #[error("Analysis failed")]
    Analysis { status: u16 },

    #[error("Analysis failed: {0}")]
    Transport(String),
}

impl ChatError {
    /// Validation failures are raised before any request goes out.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::UploadRequired)
    }
}

impl From<BackendError> for ChatError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Status { status, .. } => Self::Analysis { status },
            other => Self::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}
