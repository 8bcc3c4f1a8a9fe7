use std::fmt;

/// Raw print endpoint reply. The status is kept because error pages arrive
/// with non-success codes and still have to be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextReply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportFailure,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    InvalidResponse,
    Rpc,
    Network,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::InvalidUrl => write!(f, "invalid url"),
            TransportFailure::HttpStatus(code) => write!(f, "http status {code}"),
            TransportFailure::Timeout => write!(f, "timeout"),
            TransportFailure::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            TransportFailure::InvalidResponse => write!(f, "invalid response"),
            TransportFailure::Rpc => write!(f, "rpc error"),
            TransportFailure::Network => write!(f, "network error"),
        }
    }
}

/// A print submission the server refused or failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobFailure {
    #[error("{}", display_message(.message))]
    User {
        message: String,
        traceback: Option<String>,
    },
    #[error("{message}")]
    Unclassified { message: String, debug_text: String },
}

fn display_message(message: &str) -> &str {
    if message.is_empty() {
        "The print request failed"
    } else {
        message
    }
}

impl JobFailure {
    pub fn message(&self) -> &str {
        match self {
            JobFailure::User { message, .. } => display_message(message),
            JobFailure::Unclassified { message, .. } => message,
        }
    }

    /// Technical detail suitable for an error dialog.
    pub fn details(&self) -> Option<&str> {
        match self {
            JobFailure::User { traceback, .. } => traceback.as_deref(),
            JobFailure::Unclassified { debug_text, .. } => Some(debug_text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("print job failed: {0}")]
    Job(#[from] JobFailure),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
