//! C-ABI wrapper around `mfsdk-core`.
//!
//! # Overview
//! Exposes every groups and things operation through `extern "C"`
//! functions. Each call performs the HTTP round-trip with the core's
//! blocking transport and returns an `FfiResponse` envelope.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Entities travel as JSON text; the core decodes them.
//! - Optional numeric filters use `-1` for "absent"; `connected` is
//!   tri-state: -1 = absent, 0 = false, 1 = true.
//! - The C caller owns all returned pointers and must release them with
//!   `mf_client_free` / `mf_response_free`.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use mfsdk_core::envelope::Response;
use mfsdk_core::{
    ApiError, ChannelThingsQuery, ClientConfig, GroupQuery, GroupsClient, RouteStyle, Thing,
    ThingQuery, ThingsClient,
};
use serde::de::DeserializeOwned;

use types::*;

/// An argument that could not be turned into a Rust value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgError {
    Null(&'static str),
    InvalidUtf8(&'static str),
}

type Call = Result<Response, ArgError>;

/// Run `f`, translating bad arguments and panics into error envelopes.
fn call(op: &str, f: impl FnOnce() -> Call) -> *mut FfiResponse {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(response)) => FfiResponse::from_envelope(response),
        Ok(Err(ArgError::Null(arg))) => FfiResponse::null_arg(arg),
        Ok(Err(ArgError::InvalidUtf8(arg))) => FfiResponse::invalid_utf8(arg),
        Err(_) => FfiResponse::panic(&format!("panic in {op}")),
    }
}

fn client<'a>(ptr: *const FfiClient) -> Result<&'a FfiClient, ArgError> {
    if ptr.is_null() {
        return Err(ArgError::Null("client"));
    }
    Ok(unsafe { &*ptr })
}

fn c_str<'a>(ptr: *const c_char, name: &'static str) -> Result<&'a str, ArgError> {
    opt_c_str(ptr, name)?.ok_or(ArgError::Null(name))
}

/// Null means absent.
fn opt_c_str<'a>(ptr: *const c_char, name: &'static str) -> Result<Option<&'a str>, ArgError> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(Some)
        .map_err(|_| ArgError::InvalidUtf8(name))
}

fn decode<T: DeserializeOwned>(json: &str) -> Result<T, ApiError> {
    serde_json::from_str(json).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn opt_count(n: i64) -> Option<u64> {
    u64::try_from(n).ok()
}

fn opt_flag(flag: i32) -> Option<bool> {
    match flag {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url`. `encoded_routes` selects
/// percent-encoded URL construction instead of the literal one.
///
/// Returns null if `base_url` is null or not UTF-8, or if an internal
/// panic occurs.
/// The caller must free the returned pointer with `mf_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_client_new(base_url: *const c_char, encoded_routes: bool) -> *mut FfiClient {
    catch_unwind(AssertUnwindSafe(|| {
        let Ok(url) = c_str(base_url, "base_url") else {
            return std::ptr::null_mut();
        };
        let style = if encoded_routes {
            RouteStyle::Encoded
        } else {
            RouteStyle::Literal
        };
        let config = ClientConfig::new(url).with_route_style(style);
        Box::into_raw(Box::new(FfiClient {
            groups: GroupsClient::from_config(&config),
            things: ThingsClient::from_config(&config),
        }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `mf_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// Create a group from JSON. `value` is the new group's id.
#[unsafe(no_mangle)]
pub extern "C" fn mf_groups_create(
    client_ptr: *const FfiClient,
    group_json: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_groups_create", || {
        let c = client(client_ptr)?;
        let json = c_str(group_json, "group_json")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(
            decode(json).and_then(|group| c.groups.create(&group, token)),
        ))
    })
}

/// Fetch a group. `value` is the group as JSON.
#[unsafe(no_mangle)]
pub extern "C" fn mf_groups_get(
    client_ptr: *const FfiClient,
    group_id: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_groups_get", || {
        let c = client(client_ptr)?;
        let id = c_str(group_id, "group_id")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(c.groups.get(id, token)))
    })
}

/// List groups. `value` is the page as JSON.
#[unsafe(no_mangle)]
pub extern "C" fn mf_groups_get_all(
    client_ptr: *const FfiClient,
    offset: i64,
    limit: i64,
    connected: i32,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_groups_get_all", || {
        let c = client(client_ptr)?;
        let token = c_str(token, "token")?;
        let query = GroupQuery {
            offset: opt_count(offset),
            limit: opt_count(limit),
            connected: opt_flag(connected),
        };
        Ok(Response::from_result(c.groups.get_all(&query, token)))
    })
}

/// Update a group from JSON; the JSON must carry `id`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_groups_update(
    client_ptr: *const FfiClient,
    group_json: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_groups_update", || {
        let c = client(client_ptr)?;
        let json = c_str(group_json, "group_json")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(
            decode(json).and_then(|group| c.groups.update(&group, token)),
        ))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_groups_delete(
    client_ptr: *const FfiClient,
    group_id: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_groups_delete", || {
        let c = client(client_ptr)?;
        let id = c_str(group_id, "group_id")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(c.groups.delete(id, token)))
    })
}

// ---------------------------------------------------------------------------
// Things
// ---------------------------------------------------------------------------

/// Create a thing from JSON. `value` is the new thing's id.
#[unsafe(no_mangle)]
pub extern "C" fn mf_things_create(
    client_ptr: *const FfiClient,
    thing_json: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_things_create", || {
        let c = client(client_ptr)?;
        let json = c_str(thing_json, "thing_json")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(
            decode(json).and_then(|thing| c.things.create(&thing, token)),
        ))
    })
}

/// Create things from a JSON array.
#[unsafe(no_mangle)]
pub extern "C" fn mf_things_create_bulk(
    client_ptr: *const FfiClient,
    things_json: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_things_create_bulk", || {
        let c = client(client_ptr)?;
        let json = c_str(things_json, "things_json")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(
            decode::<Vec<Thing>>(json).and_then(|things| c.things.create_bulk(&things, token)),
        ))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_things_get(
    client_ptr: *const FfiClient,
    thing_id: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_things_get", || {
        let c = client(client_ptr)?;
        let id = c_str(thing_id, "thing_id")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(c.things.get(id, token)))
    })
}

/// List things. `name` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_things_get_all(
    client_ptr: *const FfiClient,
    offset: i64,
    limit: i64,
    name: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_things_get_all", || {
        let c = client(client_ptr)?;
        let token = c_str(token, "token")?;
        let query = ThingQuery {
            offset: opt_count(offset),
            limit: opt_count(limit),
            name: opt_c_str(name, "name")?.map(str::to_string),
        };
        Ok(Response::from_result(c.things.get_all(&query, token)))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_things_get_by_channel(
    client_ptr: *const FfiClient,
    chan_id: *const c_char,
    offset: i64,
    limit: i64,
    connected: i32,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_things_get_by_channel", || {
        let c = client(client_ptr)?;
        let chan = c_str(chan_id, "chan_id")?;
        let token = c_str(token, "token")?;
        let query = ChannelThingsQuery {
            offset: opt_count(offset),
            limit: opt_count(limit),
            connected: opt_flag(connected),
        };
        Ok(Response::from_result(c.things.get_by_channel(chan, &query, token)))
    })
}

/// Update a thing from JSON; the JSON must carry `id`.
#[unsafe(no_mangle)]
pub extern "C" fn mf_things_update(
    client_ptr: *const FfiClient,
    thing_json: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_things_update", || {
        let c = client(client_ptr)?;
        let json = c_str(thing_json, "thing_json")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(
            decode(json).and_then(|thing| c.things.update(&thing, token)),
        ))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_things_delete(
    client_ptr: *const FfiClient,
    thing_id: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_things_delete", || {
        let c = client(client_ptr)?;
        let id = c_str(thing_id, "thing_id")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(c.things.delete(id, token)))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn mf_things_connect(
    client_ptr: *const FfiClient,
    thing_id: *const c_char,
    chan_id: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_things_connect", || {
        let c = client(client_ptr)?;
        let thing = c_str(thing_id, "thing_id")?;
        let chan = c_str(chan_id, "chan_id")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(c.things.connect(thing, chan, token)))
    })
}

/// Channel first, then thing.
#[unsafe(no_mangle)]
pub extern "C" fn mf_things_disconnect(
    client_ptr: *const FfiClient,
    chan_id: *const c_char,
    thing_id: *const c_char,
    token: *const c_char,
) -> *mut FfiResponse {
    call("mf_things_disconnect", || {
        let c = client(client_ptr)?;
        let chan = c_str(chan_id, "chan_id")?;
        let thing = c_str(thing_id, "thing_id")?;
        let token = c_str(token, "token")?;
        Ok(Response::from_result(c.things.disconnect(chan, thing, token)))
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiResponse` returned by any operation. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mf_response_free(response: *mut FfiResponse) {
    if response.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let response = unsafe { Box::from_raw(response) };
        if !response.message.is_null() {
            drop(unsafe { std::ffi::CString::from_raw(response.message) });
        }
        if !response.value.is_null() {
            drop(unsafe { std::ffi::CString::from_raw(response.value) });
        }
    }));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    const TOKEN: &str = "ffi-token";

    fn start_server() -> String {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener, TOKEN).await
            })
            .unwrap();
        });
        format!("http://{addr}")
    }

    fn new_client(url: &str) -> *mut FfiClient {
        let url = CString::new(url).unwrap();
        let client = mf_client_new(url.as_ptr(), false);
        assert!(!client.is_null());
        client
    }

    fn message(r: &FfiResponse) -> &str {
        unsafe { CStr::from_ptr(r.message) }.to_str().unwrap()
    }

    fn value(r: &FfiResponse) -> Option<&str> {
        if r.value.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(r.value) }.to_str().unwrap())
    }

    #[test]
    fn client_new_null_returns_null() {
        assert!(mf_client_new(std::ptr::null(), false).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        mf_client_free(std::ptr::null_mut());
    }

    #[test]
    fn response_free_null_is_safe() {
        mf_response_free(std::ptr::null_mut());
    }

    #[test]
    fn null_client_is_reported() {
        let token = CString::new(TOKEN).unwrap();
        let id = CString::new("g1").unwrap();
        let result = mf_groups_get(std::ptr::null(), id.as_ptr(), token.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, 1);
        assert_eq!(message(r), "null argument: client");
        assert!(r.value.is_null());
        mf_response_free(result);
    }

    #[test]
    fn null_token_is_reported() {
        let client = new_client("http://localhost:9");
        let id = CString::new("t1").unwrap();
        let result = mf_things_delete(client, id.as_ptr(), std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.status, 1);
        assert_eq!(message(r), "null argument: token");
        mf_response_free(result);
        mf_client_free(client);
    }

    #[test]
    fn invalid_json_never_reaches_the_network() {
        let client = new_client("http://localhost:9");
        let token = CString::new(TOKEN).unwrap();
        let json = CString::new("{not json").unwrap();
        let result = mf_groups_create(client, json.as_ptr(), token.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, 1);
        assert_eq!(r.http_status, 0);
        assert!(message(r).starts_with("deserialization failed"));
        mf_response_free(result);
        mf_client_free(client);
    }

    #[test]
    fn invalid_utf8_never_reaches_the_network() {
        let client = new_client("http://localhost:9");
        let token = CString::new(TOKEN).unwrap();
        let id = CString::new(vec![0xff, 0xfe]).unwrap();
        let result = mf_things_delete(client, id.as_ptr(), token.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, 1);
        assert_eq!(r.http_status, 0);
        assert_eq!(message(r), "invalid utf-8 argument: thing_id");
        mf_response_free(result);

        let result = mf_things_get_all(client, -1, -1, id.as_ptr(), token.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, 1);
        assert_eq!(message(r), "invalid utf-8 argument: name");
        mf_response_free(result);
        mf_client_free(client);
    }

    #[test]
    fn client_new_rejects_invalid_utf8_url() {
        let url = CString::new(vec![b'h', 0xff]).unwrap();
        assert!(mf_client_new(url.as_ptr(), false).is_null());
    }

    #[test]
    fn group_roundtrip_over_http() {
        let client = new_client(&start_server());
        let token = CString::new(TOKEN).unwrap();

        let json = CString::new(r#"{"name":"floor"}"#).unwrap();
        let result = mf_groups_create(client, json.as_ptr(), token.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, 0);
        assert_eq!(message(r), "");
        let id = CString::new(value(r).unwrap()).unwrap();
        mf_response_free(result);

        let result = mf_groups_get(client, id.as_ptr(), token.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, 0);
        let group: serde_json::Value = serde_json::from_str(value(r).unwrap()).unwrap();
        assert_eq!(group["name"], "floor");
        mf_response_free(result);

        let result = mf_groups_get_all(client, 0, 10, -1, token.as_ptr());
        let r = unsafe { &*result };
        let page: serde_json::Value = serde_json::from_str(value(r).unwrap()).unwrap();
        assert_eq!(page["total"], 1);
        mf_response_free(result);

        let result = mf_groups_delete(client, id.as_ptr(), token.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, 0);
        assert!(r.value.is_null());
        mf_response_free(result);

        mf_client_free(client);
    }

    #[test]
    fn things_relationships_over_http() {
        let client = new_client(&start_server());
        let token = CString::new(TOKEN).unwrap();

        let json = CString::new(r#"{"name":"lamp"}"#).unwrap();
        let result = mf_things_create(client, json.as_ptr(), token.as_ptr());
        let thing = CString::new(value(unsafe { &*result }).unwrap()).unwrap();
        mf_response_free(result);

        let chan = CString::new("c1").unwrap();
        let result = mf_things_connect(client, thing.as_ptr(), chan.as_ptr(), token.as_ptr());
        assert_eq!(unsafe { &*result }.status, 0);
        mf_response_free(result);

        let result = mf_things_get_by_channel(client, chan.as_ptr(), 0, 10, -1, token.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, 0);
        let page: serde_json::Value = serde_json::from_str(value(r).unwrap()).unwrap();
        assert_eq!(page["total"], 1);
        mf_response_free(result);

        let result = mf_things_disconnect(client, chan.as_ptr(), thing.as_ptr(), token.as_ptr());
        assert_eq!(unsafe { &*result }.status, 0);
        mf_response_free(result);

        let result = mf_things_disconnect(client, chan.as_ptr(), thing.as_ptr(), token.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, 1);
        assert_eq!(r.http_status, 404);
        assert_eq!(message(r), "Channel or thing does not exist");
        mf_response_free(result);

        mf_client_free(client);
    }

    #[test]
    fn wrong_token_maps_to_table_message() {
        let client = new_client(&start_server());
        let token = CString::new("wrong").unwrap();
        let result = mf_things_get_all(client, -1, -1, std::ptr::null(), token.as_ptr());
        let r = unsafe { &*result };
        assert_eq!(r.status, 1);
        assert_eq!(r.http_status, 401);
        assert_eq!(message(r), "Missing or invalid access token provided");
        mf_response_free(result);
        mf_client_free(client);
    }
}
