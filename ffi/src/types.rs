//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! The C surface speaks the flat envelope: a 0/1 status, a message that is
//! never null, and an optional value. Ids are handed over as plain strings,
//! decoded bodies as JSON text.

use std::ffi::CString;
use std::os::raw::c_char;

use mfsdk_core::envelope::{Response, STATUS_FAILED};
use mfsdk_core::{GroupsClient, ThingsClient};
use serde_json::Value;

/// Opaque handle to both clients. C callers receive a pointer to this and
/// pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) groups: GroupsClient,
    pub(crate) things: ThingsClient,
}

/// Result envelope for every operation.
///
/// On success `status` is 0, `message` is an empty string and `value` is
/// either null or the payload. On failure `status` is 1, `message` holds the
/// mapped text (empty for unmapped HTTP codes), `http_status` is the code or
/// 0 when no response arrived, and `value` is null.
#[repr(C)]
pub struct FfiResponse {
    pub status: u8,
    pub http_status: u16,
    pub message: *mut c_char,
    pub value: *mut c_char,
}

impl FfiResponse {
    pub(crate) fn from_envelope(response: Response) -> *mut Self {
        let value = match response.value {
            None => std::ptr::null_mut(),
            Some(Value::String(s)) => into_c_string(s),
            Some(other) => into_c_string(other.to_string()),
        };
        Box::into_raw(Box::new(FfiResponse {
            status: response.error.status,
            http_status: response.error.http_status.unwrap_or(0),
            message: into_c_string(response.error.message),
            value,
        }))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(format!("null argument: {name}"))
    }

    pub(crate) fn invalid_utf8(name: &str) -> *mut Self {
        Self::failure(format!("invalid utf-8 argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(msg.to_string())
    }

    fn failure(message: String) -> *mut Self {
        Box::into_raw(Box::new(FfiResponse {
            status: STATUS_FAILED,
            http_status: 0,
            message: into_c_string(message),
            value: std::ptr::null_mut(),
        }))
    }
}

/// Interior NUL bytes cannot be represented; such strings become empty.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}
