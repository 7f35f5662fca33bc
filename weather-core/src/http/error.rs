use thiserror::Error;

/// Failure outcome of executing a [`RequestDescriptor`](super::RequestDescriptor).
///
/// Every variant is terminal for the request that produced it; nothing is retried.
/// Status-class variants keep the raw response body for diagnostics.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The descriptor could not be turned into a request (bad header, unsupported method).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("response contained no data")]
    EmptyBody,

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("informational response (HTTP {status})")]
    Informational { status: u16, body: String },

    #[error("redirection response (HTTP {status})")]
    Redirection { status: u16, body: String },

    #[error("client error (HTTP {status})")]
    ClientError { status: u16, body: String },

    #[error("server error (HTTP {status})")]
    ServerError { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The pending request was dropped before it reported an outcome.
    #[error("request was abandoned before it completed")]
    Abandoned,
}

/// Flat classification of [`ApiError`], for callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidEndpoint,
    InvalidRequest,
    EmptyBody,
    DecodeFailure,
    InformationalStatus,
    RedirectStatus,
    ClientErrorStatus,
    ServerErrorStatus,
    TransportFailure,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidEndpoint(_) => ErrorKind::InvalidEndpoint,
            ApiError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ApiError::EmptyBody => ErrorKind::EmptyBody,
            ApiError::Decode(_) => ErrorKind::DecodeFailure,
            ApiError::Informational { .. } => ErrorKind::InformationalStatus,
            ApiError::Redirection { .. } => ErrorKind::RedirectStatus,
            ApiError::ClientError { .. } => ErrorKind::ClientErrorStatus,
            ApiError::ServerError { .. } => ErrorKind::ServerErrorStatus,
            ApiError::Transport(_) | ApiError::Abandoned => ErrorKind::TransportFailure,
        }
    }

    /// HTTP status code, for the status-class variants.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Informational { status, .. }
            | ApiError::Redirection { status, .. }
            | ApiError::ClientError { status, .. }
            | ApiError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, for the status-class variants.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Informational { body, .. }
            | ApiError::Redirection { body, .. }
            | ApiError::ClientError { body, .. }
            | ApiError::ServerError { body, .. } => Some(body),
            _ => None,
        }
    }
}
