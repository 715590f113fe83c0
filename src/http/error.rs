//! Per-connection failures and their status codes.
//!
//! Every error a connection task can hit is one of these. The server turns
//! it into a best-effort response and still closes the connection, so no
//! error ever reaches the accept loop.

use http::StatusCode;
use thiserror::Error;

use crate::http::request::ParseError;
use crate::http::response::Response;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("bad request: {0}")]
    Parse(#[from] ParseError),
    #[error("method {0} is not implemented")]
    UnsupportedMethod(String),
    #[error("extension of {0:?} is not allowed")]
    InvalidExtension(String),
    #[error("path {0:?} escapes the base directory")]
    PathTraversal(String),
    #[error("path {0:?} could not be decoded")]
    InvalidPath(String),
    #[error("file {0:?} not found")]
    NotFound(String),
    #[error("body of {0} bytes exceeds the limit of {1}")]
    PayloadTooLarge(u64, u64),
    #[error("timed out reading the request")]
    Timeout,
    #[error("cannot relay target {0:?}")]
    InvalidTarget(String),
    #[error("scheme {0:?} cannot be relayed")]
    UnsupportedScheme(String),
    #[error("request names no host to relay to")]
    MissingHost,
    #[error("failed to reach {authority}: {source}")]
    Dial {
        authority: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::Parse(_)
            | RequestError::InvalidExtension(_)
            | RequestError::PathTraversal(_)
            | RequestError::InvalidPath(_)
            | RequestError::InvalidTarget(_)
            | RequestError::UnsupportedScheme(_)
            | RequestError::MissingHost => StatusCode::BAD_REQUEST,
            RequestError::UnsupportedMethod(_) => StatusCode::NOT_IMPLEMENTED,
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::PayloadTooLarge(..) => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::Timeout => StatusCode::REQUEST_TIMEOUT,
            RequestError::Dial { .. } => StatusCode::BAD_GATEWAY,
            RequestError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response {
        Response::status_only(self.status())
    }
}

impl From<RequestError> for Response {
    fn from(err: RequestError) -> Self {
        err.into_response()
    }
}
