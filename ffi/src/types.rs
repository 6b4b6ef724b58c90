//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! The client itself stays opaque; C callers only ever hold a pointer to
//! `FfiClient`. Outcomes that the core reports as `ClientError` are
//! flattened into `FfiStatus` codes. Strings handed to C are heap-allocated
//! `CString`s that must be released with `restjson_free_string`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use restjson_core::{ClientError, SecureJsonClient};

/// Opaque handle to a `SecureJsonClient`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: SecureJsonClient,
}

/// Status codes returned by operations that do not produce JSON.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    SessionNotInitialized = 1,
    Transport = 2,
    RemoveFailed = 3,
    RenameFailed = 4,
    SecureModeDisabled = 5,
    Staging = 6,
    JsonParse = 7,
    Io = 8,
    NullArg = 9,
    Panic = 10,
}

impl From<&ClientError> for FfiStatus {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::SessionNotInitialized => FfiStatus::SessionNotInitialized,
            ClientError::SecureModeDisabled => FfiStatus::SecureModeDisabled,
            ClientError::Transport(_) => FfiStatus::Transport,
            ClientError::Staging { .. } => FfiStatus::Staging,
            ClientError::RemoveFailed { .. } => FfiStatus::RemoveFailed,
            ClientError::RenameFailed { .. } => FfiStatus::RenameFailed,
            ClientError::JsonParse(_) => FfiStatus::JsonParse,
        }
    }
}

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Hand `s` to C. Interior NULs cannot be represented and yield null.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).map_or(std::ptr::null_mut(), CString::into_raw)
}
