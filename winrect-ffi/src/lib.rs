//! C ABI DLL for winrect -- loadable by ctypes, C#, or any FFI consumer.
//!
//! All exported functions follow the convention:
//! - Return `i32` status code: `WINRECT_OK=0`, `WINRECT_ERROR=-1`,
//!   `WINRECT_UNAVAILABLE=1` (the OS reported failure; not a fault),
//!   `WINRECT_STOPPED=2` (enumeration stopped by the callback)
//! - `Point` / `Rect` are written into caller memory with Win32
//!   `POINT` / `RECT` layout
//! - String outputs allocated by Rust, freed via `winrect_free_string()`
//! - Last error retrievable via `winrect_last_error()`

use std::cell::RefCell;
use std::ffi::{c_char, c_void, CString};
use std::ops::ControlFlow;
use std::ptr;

use winrect_core::{Point, Rect, User32, WinRectError, WindowHandle, WindowingApi};

pub const WINRECT_OK: i32 = 0;
pub const WINRECT_ERROR: i32 = -1;
pub const WINRECT_UNAVAILABLE: i32 = 1;
pub const WINRECT_STOPPED: i32 = 2;

/// Enumeration callback: return non-zero to continue, zero to stop.
pub type WinRectEnumProc = Option<unsafe extern "C" fn(hwnd: isize, user_data: *mut c_void) -> i32>;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    log::debug!("winrect-ffi error: {msg}");
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn load() -> Result<User32, i32> {
    User32::load().map_err(|e| {
        set_last_error(&e.to_string());
        WINRECT_ERROR
    })
}

fn flow_status(result: Result<ControlFlow<()>, WinRectError>) -> i32 {
    match result {
        Ok(ControlFlow::Continue(())) => WINRECT_OK,
        Ok(ControlFlow::Break(())) => WINRECT_STOPPED,
        Err(e) => {
            set_last_error(&e.to_string());
            WINRECT_ERROR
        }
    }
}

fn json_out<T: serde::Serialize + ?Sized>(value: &T, out_json: *mut *mut c_char) -> i32 {
    match serde_json::to_string(value) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => {
                unsafe { *out_json = cstr.into_raw() };
                WINRECT_OK
            }
            Err(e) => {
                set_last_error(&format!("CString conversion failed: {e}"));
                WINRECT_ERROR
            }
        },
        Err(e) => {
            set_last_error(&format!("JSON serialization failed: {e}"));
            WINRECT_ERROR
        }
    }
}

/// Retrieve the last error message (thread-local).
///
/// Returns a pointer valid until the next winrect_* call on this thread.
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn winrect_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a string previously allocated by a winrect_* function.
///
/// # Safety
///
/// `ptr` must be a pointer returned by a winrect_* function or null.
#[no_mangle]
pub unsafe extern "C" fn winrect_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

/// Current cursor position.
///
/// # Safety
///
/// `out_point` must be a valid pointer to a `Point`.
#[no_mangle]
pub unsafe extern "C" fn winrect_get_cursor_pos(out_point: *mut Point) -> i32 {
    if out_point.is_null() {
        set_last_error("out_point is null");
        return WINRECT_ERROR;
    }
    let api = match load() {
        Ok(api) => api,
        Err(code) => return code,
    };
    match api.cursor_pos() {
        Some(p) => {
            unsafe { *out_point = p };
            WINRECT_OK
        }
        None => {
            set_last_error("cursor position unavailable");
            WINRECT_UNAVAILABLE
        }
    }
}

/// Bounding rectangle of `hwnd` in screen coordinates.
///
/// # Safety
///
/// `out_rect` must be a valid pointer to a `Rect`.
#[no_mangle]
pub unsafe extern "C" fn winrect_get_window_rect(hwnd: isize, out_rect: *mut Rect) -> i32 {
    if out_rect.is_null() {
        set_last_error("out_rect is null");
        return WINRECT_ERROR;
    }
    let api = match load() {
        Ok(api) => api,
        Err(code) => return code,
    };
    match api.window_rect(WindowHandle::from_raw(hwnd)) {
        Some(r) => {
            unsafe { *out_rect = r };
            WINRECT_OK
        }
        None => {
            set_last_error(&format!("window rect unavailable for hwnd {hwnd}"));
            WINRECT_UNAVAILABLE
        }
    }
}

/// Enumerate top-level windows, calling `callback(hwnd, user_data)` for each.
///
/// Returns `WINRECT_OK` when every window was visited and
/// `WINRECT_STOPPED` when the callback returned zero.
///
/// # Safety
///
/// `callback` must be safe to call with `user_data` for the duration of
/// the call.
#[no_mangle]
pub unsafe extern "C" fn winrect_enum_windows(
    callback: WinRectEnumProc,
    user_data: *mut c_void,
) -> i32 {
    let Some(callback) = callback else {
        set_last_error("callback is null");
        return WINRECT_ERROR;
    };
    let api = match load() {
        Ok(api) => api,
        Err(code) => return code,
    };
    flow_status(api.enum_windows(&mut |hwnd| c_visit(callback, hwnd, user_data)))
}

/// Enumerate the child windows of `parent`.
///
/// # Safety
///
/// Same as [`winrect_enum_windows`].
#[no_mangle]
pub unsafe extern "C" fn winrect_enum_child_windows(
    parent: isize,
    callback: WinRectEnumProc,
    user_data: *mut c_void,
) -> i32 {
    let Some(callback) = callback else {
        set_last_error("callback is null");
        return WINRECT_ERROR;
    };
    let api = match load() {
        Ok(api) => api,
        Err(code) => return code,
    };
    flow_status(api.enum_child_windows(WindowHandle::from_raw(parent), &mut |hwnd| {
        c_visit(callback, hwnd, user_data)
    }))
}

fn c_visit(
    callback: unsafe extern "C" fn(isize, *mut c_void) -> i32,
    hwnd: WindowHandle,
    user_data: *mut c_void,
) -> ControlFlow<()> {
    if unsafe { callback(hwnd.as_raw(), user_data) } != 0 {
        ControlFlow::Continue(())
    } else {
        ControlFlow::Break(())
    }
}

/// Compute `rect`'s center (raw left/top plus half the absolute size).
///
/// # Safety
///
/// `rect` must point to a valid `Rect`; `out_point` to a writable `Point`.
#[no_mangle]
pub unsafe extern "C" fn winrect_rect_center(rect: *const Rect, out_point: *mut Point) -> i32 {
    if rect.is_null() || out_point.is_null() {
        set_last_error("null pointer argument");
        return WINRECT_ERROR;
    }
    unsafe { *out_point = (*rect).center() };
    WINRECT_OK
}

/// List every top-level window with rect and center as a JSON string.
///
/// # Safety
///
/// `out_json` must be a valid pointer to a `*mut c_char`.
/// On success, `*out_json` is set to a heap-allocated JSON C string.
/// Caller must free with `winrect_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn winrect_list_windows_json(out_json: *mut *mut c_char) -> i32 {
    if out_json.is_null() {
        set_last_error("out_json is null");
        return WINRECT_ERROR;
    }
    let api = match load() {
        Ok(api) => api,
        Err(code) => return code,
    };
    match winrect_core::window::list_windows(&api) {
        Ok(infos) => json_out(&infos, out_json),
        Err(e) => {
            set_last_error(&e.to_string());
            WINRECT_ERROR
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    fn last_error() -> String {
        let p = winrect_last_error();
        assert!(!p.is_null());
        unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned()
    }

    #[test]
    fn test_rect_center_matches_core() {
        let rect = Rect::new(10, 20, 0, 0);
        let mut out = Point::default();
        let rc = unsafe { winrect_rect_center(&rect, &mut out) };
        assert_eq!(rc, WINRECT_OK);
        assert_eq!(out, Point::new(15, 30));
    }

    #[test]
    fn test_rect_center_null_pointer() {
        let rc = unsafe { winrect_rect_center(ptr::null(), ptr::null_mut()) };
        assert_eq!(rc, WINRECT_ERROR);
        assert_eq!(last_error(), "null pointer argument");
    }

    #[test]
    fn test_cursor_pos_null_out() {
        let rc = unsafe { winrect_get_cursor_pos(ptr::null_mut()) };
        assert_eq!(rc, WINRECT_ERROR);
        assert_eq!(last_error(), "out_point is null");
    }

    #[test]
    fn test_enum_windows_null_callback() {
        let rc = unsafe { winrect_enum_windows(None, ptr::null_mut()) };
        assert_eq!(rc, WINRECT_ERROR);
        assert_eq!(last_error(), "callback is null");
    }

    #[test]
    fn test_free_string_null_is_noop() {
        unsafe { winrect_free_string(ptr::null_mut()) };
    }

    #[test]
    fn test_json_out_roundtrip() {
        let mut out: *mut c_char = ptr::null_mut();
        let rc = json_out(&[Rect::new(1, 2, 3, 4)], &mut out);
        assert_eq!(rc, WINRECT_OK);
        let s = unsafe { CStr::from_ptr(out) }.to_string_lossy().into_owned();
        assert_eq!(s, r#"[{"left":1,"top":2,"right":3,"bottom":4}]"#);
        unsafe { winrect_free_string(out) };
    }

    #[test]
    fn test_flow_status_codes() {
        assert_eq!(flow_status(Ok(ControlFlow::Continue(()))), WINRECT_OK);
        assert_eq!(flow_status(Ok(ControlFlow::Break(()))), WINRECT_STOPPED);
        let rc = flow_status(Err(WinRectError::EnumerationError("boom".into())));
        assert_eq!(rc, WINRECT_ERROR);
        assert_eq!(last_error(), "EnumerationError: boom");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_os_calls_report_unsupported_off_windows() {
        let mut r = Rect::default();
        let rc = unsafe { winrect_get_window_rect(0, &mut r) };
        assert_eq!(rc, WINRECT_ERROR);
        assert!(last_error().starts_with("Unsupported"));
    }

    #[cfg(windows)]
    #[test]
    fn test_null_hwnd_rect_unavailable() {
        let mut r = Rect::default();
        let rc = unsafe { winrect_get_window_rect(0, &mut r) };
        assert_eq!(rc, WINRECT_UNAVAILABLE);
    }
}
