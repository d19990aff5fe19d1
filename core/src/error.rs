//! Error types for the SDK.
//!
//! # Design
//! HTTP failures are classified by [`Operation`](crate::status::Operation)
//! tables into an [`ErrorKind`] that carries the fixed human-readable
//! message. Status codes a table does not list become [`ErrorKind::Unknown`],
//! whose envelope message is empty. Everything that never reached the
//! status-code stage (network, encoding, missing headers) gets its own
//! variant.

use std::fmt;

use thiserror::Error;

use crate::status::Operation;

/// Classification of a failed HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedJson,
    MalformedChannelId,
    MalformedThingId,
    MalformedQuery,
    Unauthorized,
    ChannelNotFound,
    ThingNotFound,
    EntityNotFound,
    ChannelOrThingNotFound,
    AlreadyExists,
    UnsupportedContentType,
    Unprocessable,
    ServerError,
    /// The operation's table has no entry for the status code.
    Unknown,
}

impl ErrorKind {
    /// Fixed message reported to callers. Empty for `Unknown`.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::MalformedJson => "Failed due to malformed JSON",
            ErrorKind::MalformedChannelId => "Failed due to malformed channel's ID",
            ErrorKind::MalformedThingId => "Failed due to malformed thing's ID",
            ErrorKind::MalformedQuery => "Failed due to malformed query parameters",
            ErrorKind::Unauthorized => "Missing or invalid access token provided",
            ErrorKind::ChannelNotFound => "Channel does not exist",
            ErrorKind::ThingNotFound => "Thing does not exist",
            ErrorKind::EntityNotFound => "A non-existent entity request",
            ErrorKind::ChannelOrThingNotFound => "Channel or thing does not exist",
            ErrorKind::AlreadyExists => "Entity already exist",
            ErrorKind::UnsupportedContentType => "Missing or invalid content type",
            ErrorKind::Unprocessable => "Database can't process request",
            ErrorKind::ServerError => "Unexpected server-side error occurred",
            ErrorKind::Unknown => "",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unknown => f.write_str("unmapped status code"),
            kind => f.write_str(kind.message()),
        }
    }
}

/// Errors returned by every SDK operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with something other than the expected status.
    #[error("{operation}: HTTP {status}: {kind}")]
    Status {
        operation: Operation,
        status: u16,
        kind: ErrorKind,
    },

    /// A create call succeeded but the `Location` header was absent or had
    /// no identifier segment.
    #[error("response has no usable Location header")]
    MissingLocation,

    /// An update payload carried no `id` to address.
    #[error("entity has no id")]
    MissingId,

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request never produced an HTTP response (refused, DNS, I/O).
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Message as carried by the response envelope: the table entry for
    /// status failures (possibly empty), the display text otherwise.
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { kind, .. } => kind.message().to_string(),
            other => other.to_string(),
        }
    }

    /// HTTP status code, when the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Status { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_has_empty_message() {
        assert_eq!(ErrorKind::Unknown.message(), "");
    }

    #[test]
    fn status_error_message_is_table_text() {
        let err = ApiError::Status {
            operation: Operation::CreateGroup,
            status: 409,
            kind: ErrorKind::AlreadyExists,
        };
        assert_eq!(err.message(), "Entity already exist");
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "create group: HTTP 409: Entity already exist");
    }

    #[test]
    fn unknown_status_displays_code() {
        let err = ApiError::Status {
            operation: Operation::DeleteThing,
            status: 404,
            kind: ErrorKind::Unknown,
        };
        assert_eq!(err.message(), "");
        assert_eq!(err.to_string(), "delete thing: HTTP 404: unmapped status code");
    }

    #[test]
    fn transport_error_message_is_display_text() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.message(), "transport error: connection refused");
        assert_eq!(err.status(), None);
        assert_eq!(err.kind(), None);
    }
}
