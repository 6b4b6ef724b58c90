//! C-ABI wrapper around `restjson-core`.
//!
//! # Overview
//! Exposes the client lifecycle, certificate refresh, session logging and
//! the JSON request call through `extern "C"` functions so C and C++ hosts
//! can use the client without linking against Rust types.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - JSON crosses the boundary as text: the query map is a JSON object and
//!   the request body any JSON document. The response comes back as JSON
//!   text owned by the caller.
//! - The C caller owns all returned pointers and must call the matching
//!   `restjson_*_free` function to release them.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use restjson_core::{ClientConfig, SecureJsonClient, Value};
use tracing::error;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client using `cacert.pem` and `logs/` in the working directory.
///
/// With `secure` the certificate bundle is refreshed before returning; with
/// `logging` a session log is opened. Returns null only on an internal panic.
/// The caller must free the returned pointer with `restjson_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn restjson_client_new(secure: bool, logging: bool) -> *mut FfiClient {
    catch_unwind(|| {
        let inner = SecureJsonClient::new(secure, logging);
        Box::into_raw(Box::new(FfiClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client that keeps its bundle and logs under `dir`.
///
/// Returns null if `dir` is null or not valid UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn restjson_client_new_in_dir(
    dir: *const c_char,
    secure: bool,
    logging: bool,
) -> *mut FfiClient {
    catch_unwind(|| {
        let Some(dir) = (unsafe { str_arg(dir) }) else {
            return std::ptr::null_mut();
        };
        let inner = SecureJsonClient::with_config(ClientConfig::in_dir(dir), secure, logging);
        Box::into_raw(Box::new(FfiClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `restjson_client_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn restjson_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Download and install a fresh certificate bundle.
#[unsafe(no_mangle)]
pub extern "C" fn restjson_refresh_certificates(client: *mut FfiClient) -> FfiStatus {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiStatus::NullArg;
        }
        let client = unsafe { &mut *client };
        match client.inner.refresh_certificates() {
            Ok(()) => FfiStatus::Ok,
            Err(e) => {
                error!(error = %e, "certificate refresh failed");
                FfiStatus::from(&e)
            }
        }
    }))
    .unwrap_or(FfiStatus::Panic)
}

/// Start the session log. A second call while logging is a no-op.
#[unsafe(no_mangle)]
pub extern "C" fn restjson_start_logging(client: *mut FfiClient) -> FfiStatus {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiStatus::NullArg;
        }
        let client = unsafe { &mut *client };
        match client.inner.start_logging() {
            Ok(()) => FfiStatus::Ok,
            Err(e) => {
                error!(error = %e, "failed to start session log");
                FfiStatus::Io
            }
        }
    }))
    .unwrap_or(FfiStatus::Panic)
}

/// Issue one request and return the response as JSON text.
///
/// `query_json` may be null (no query parameters) or a JSON object; string
/// values are used verbatim, other values as their JSON text. `body_json`
/// may be null (sent as `null`) or any JSON document.
///
/// Returns `"null"` when the request or response parsing fails, and a null
/// pointer when an argument is null or malformed.
/// The caller must free the returned string with `restjson_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn restjson_make_request(
    client: *mut FfiClient,
    url: *const c_char,
    method: *const c_char,
    query_json: *const c_char,
    body_json: *const c_char,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let (Some(url), Some(method)) = (unsafe { str_arg(url) }, unsafe { str_arg(method) })
        else {
            return std::ptr::null_mut();
        };
        let Some(query) = parse_query(query_json) else {
            return std::ptr::null_mut();
        };
        let body = if body_json.is_null() {
            Value::Null
        } else {
            match unsafe { str_arg(body_json) }.map(serde_json::from_str::<Value>) {
                Some(Ok(body)) => body,
                _ => return std::ptr::null_mut(),
            }
        };

        let client = unsafe { &mut *client };
        let response = client.inner.make_request(url, method, query, &body);
        into_c_string(response.to_string())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Decode the query object into ordered key/value pairs.
fn parse_query(query_json: *const c_char) -> Option<Vec<(String, String)>> {
    if query_json.is_null() {
        return Some(Vec::new());
    }
    let text = unsafe { str_arg(query_json) }?;
    let map: serde_json::Map<String, Value> = serde_json::from_str(text).ok()?;
    Some(
        map.into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn restjson_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
