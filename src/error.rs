//! Error types for the Resend client.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Short tag identifying a wrapped response-handling failure.
///
/// The tag is also the prefix of the matching [`Error`] message, so callers
/// holding only the rendered string can still tell the failures apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The response body could not be parsed as the expected JSON shape.
    Deserialize,
    /// The response body parsed to `null` or an empty object.
    NullPayload,
    /// Converting the parsed body into the returned value failed.
    Mapping,
}

impl ErrorCode {
    /// The tag as it appears in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Deserialize => "RC001",
            ErrorCode::NullPayload => "RC002",
            ErrorCode::Mapping => "RC003",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when talking to the Resend API.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP request could not be completed (connection, TLS, body read).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The configured API URL is not a valid base URL.
    #[error("invalid API url: {0}")]
    Url(#[from] url::ParseError),

    /// A configured value cannot be sent as an HTTP header.
    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    /// The client was built without an API token.
    #[error("an API token is required")]
    MissingToken,

    /// The request payload could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Status returned by the API.
        status: StatusCode,
        /// Error message reported by the API, or the canonical reason.
        message: String,
    },

    /// RC001: the body did not parse as the expected shape.
    #[error("RC001: Failed to deserialize response: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// RC002: the body was `null` or empty where content is mandatory.
    #[error("RC002: Received null response")]
    NullPayload,

    /// RC003: the parsed body could not be mapped into the returned value.
    #[error("RC003: Mapping from {from} to {to} failed: {reason}")]
    Mapping {
        from: &'static str,
        to: &'static str,
        reason: String,
    },

    /// An argument failed local validation; no request was sent.
    #[error("invalid argument `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The caller cancelled the operation before a response arrived.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Request(err) => err.status(),
            _ => None,
        }
    }

    /// Distinguishing code for response-handling failures.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Deserialize(_) => Some(ErrorCode::Deserialize),
            Error::NullPayload => Some(ErrorCode::NullPayload),
            Error::Mapping { .. } => Some(ErrorCode::Mapping),
            _ => None,
        }
    }

    /// Whether the caller aborted the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
