//! FFI bindings for the screening engine
//!
//! C-compatible entry points for hosts that embed the engine. All functions
//! take null-terminated C strings and return allocated memory that must be
//! freed by the caller using `screening_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::calibration::Calibration;
use crate::pipeline::{analyze_session_json, ScreeningAnalyzer};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Caller must free the returned pointer
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => {
            set_last_error("Result contained an interior NUL byte");
            ptr::null_mut()
        }
    }
}

/// Score a session with the default calibration.
///
/// # Safety
/// - `session_json` must be a valid null-terminated C string holding a
///   session object or a bare task array.
/// - Returns a newly allocated string that must be freed with `screening_free_string`.
/// - Returns NULL on error; call `screening_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn screening_analyze_json(session_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(session_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid session JSON string pointer");
            return ptr::null_mut();
        }
    };

    match analyze_session_json(json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Score a session with a caller-supplied calibration.
///
/// # Safety
/// - `session_json` and `calibration_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `screening_free_string`.
/// - Returns NULL on error (including an invalid calibration); call
///   `screening_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn screening_analyze_json_with_calibration(
    session_json: *const c_char,
    calibration_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(session_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid session JSON string pointer");
            return ptr::null_mut();
        }
    };

    let calibration_str = match cstr_to_string(calibration_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid calibration JSON string pointer");
            return ptr::null_mut();
        }
    };

    let analyzer = match Calibration::from_json(&calibration_str)
        .and_then(ScreeningAnalyzer::with_calibration)
    {
        Ok(analyzer) => analyzer,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match analyzer.analyze_json(&json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a string returned by a screening function.
///
/// # Safety
/// - `ptr` must be a pointer returned by a screening function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn screening_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Get the last error message.
///
/// # Safety
/// - The returned pointer is valid until the next screening call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if the last call succeeded.
#[no_mangle]
pub unsafe extern "C" fn screening_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the engine version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn screening_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
