//! Flat value/status/message view of an operation's outcome.
//!
//! Rust callers work with `Result<T, ApiError>`. Callers that expect the
//! flat envelope (the C ABI, scripting bridges) convert with
//! [`Response::from_result`]: exactly one of `value` or a failing
//! `error.status` is populated.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

pub const STATUS_OK: u8 = 0;
pub const STATUS_FAILED: u8 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseError {
    /// `0` on success, `1` on failure.
    pub status: u8,
    /// Empty on success and for unmapped status codes.
    pub message: String,
    /// HTTP status of a failed exchange, when there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    pub value: Option<Value>,
    pub error: ResponseError,
}

impl Response {
    pub fn ok(value: Option<Value>) -> Self {
        Self {
            value,
            error: ResponseError::default(),
        }
    }

    pub fn failed(err: &ApiError) -> Self {
        Self {
            value: None,
            error: ResponseError {
                status: STATUS_FAILED,
                message: err.message(),
                http_status: err.status(),
            },
        }
    }

    /// Unit payloads (`()`) become `value: None`.
    pub fn from_result<T: Serialize>(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(payload) => match serde_json::to_value(payload) {
                Ok(Value::Null) => Self::ok(None),
                Ok(value) => Self::ok(Some(value)),
                Err(e) => Self::failed(&ApiError::Serialization(e.to_string())),
            },
            Err(err) => Self::failed(&err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.status == STATUS_OK
    }
}
