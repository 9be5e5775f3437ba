//! `User32` binding object.
//!
//! [`User32`] is the explicit handle through which every OS call is made.
//! It carries no state; obtaining one via [`User32::load`] is the single
//! point where platform support is checked.  On non-Windows targets
//! `load` returns [`WinRectError::Unsupported`] and the type is
//! uninhabited.
//!
//! # Enumeration callbacks
//!
//! `EnumWindows` / `EnumChildWindows` call back into
//! a shared `WNDENUMPROC` trampoline on the calling thread.  The trampoline forwards
//! each `HWND` to the caller's visitor.  A panic inside the visitor is
//! caught, enumeration is stopped, and the panic is resumed once the OS
//! call has returned, so it never unwinds through a foreign frame.

use std::any::Any;
use std::fmt;
use std::ops::ControlFlow;
use std::panic;

use log::{debug, warn};

use crate::errors::WinRectError;
use crate::geometry::{Point, Rect};
use crate::window::{WindowHandle, WindowVisitor, WindowingApi};

pub use imp::User32;

/// What the trampoline observed during one enumeration call.
#[cfg_attr(not(windows), allow(dead_code))]
#[derive(Default)]
struct EnumTally {
    visited: usize,
    stopped: bool,
    panic: Option<Box<dyn Any + Send>>,
}

/// Map the OS result plus the trampoline's tally onto the enumeration
/// outcome.
///
/// A caught visitor panic is resumed here.  The OS reports failure when
/// the visitor stops; that is `Ok(Break)`, not an error.
#[cfg_attr(not(windows), allow(dead_code))]
fn finish_enumeration<E: fmt::Display>(
    what: &str,
    tally: EnumTally,
    result: Result<(), E>,
) -> Result<ControlFlow<()>, WinRectError> {
    if let Some(payload) = tally.panic {
        panic::resume_unwind(payload);
    }

    if tally.stopped {
        debug!("{what}: stopped by visitor after {} windows", tally.visited);
        return Ok(ControlFlow::Break(()));
    }

    match result {
        Ok(()) => {
            debug!("{what}: visited {} windows", tally.visited);
            Ok(ControlFlow::Continue(()))
        }
        Err(e) => {
            warn!("{what} failed after {} windows: {e}", tally.visited);
            Err(WinRectError::EnumerationError(format!("{what} failed: {e}")))
        }
    }
}

#[cfg(windows)]
mod imp {
    use std::panic::AssertUnwindSafe;

    use log::{debug, trace};
    use windows::Win32::Foundation::{BOOL, FALSE, HWND, LPARAM, POINT, RECT, TRUE};
    use windows::Win32::UI::WindowsAndMessaging::{
        EnumChildWindows, EnumWindows, GetCursorPos, GetWindowRect, WNDENUMPROC,
    };

    use super::*;

    /// Explicitly-loaded binding to the User32 windowing functions.
    #[derive(Debug, Clone, Copy)]
    pub struct User32 {
        _private: (),
    }

    impl User32 {
        pub fn load() -> Result<Self, WinRectError> {
            trace!("User32 binding loaded");
            Ok(Self { _private: () })
        }

        /// Drive one `EnumWindows`-style call through `enum_trampoline`.
        fn run_enumeration(
            &self,
            what: &str,
            visit: &mut WindowVisitor<'_>,
            call: impl FnOnce(WNDENUMPROC, LPARAM) -> windows::core::Result<()>,
        ) -> Result<ControlFlow<()>, WinRectError> {
            let mut state = EnumState {
                visit,
                tally: EnumTally::default(),
            };
            let result = call(
                Some(enum_trampoline),
                LPARAM(&mut state as *mut EnumState<'_, '_> as isize),
            );
            finish_enumeration(what, state.tally, result)
        }
    }

    struct EnumState<'a, 'b> {
        visit: &'a mut WindowVisitor<'b>,
        tally: EnumTally,
    }

    /// Native `WNDENUMPROC` shared by both enumeration calls.
    ///
    /// `lparam` is a pointer to the `EnumState` owned by `run_enumeration`,
    /// which outlives the OS call.
    unsafe extern "system" fn enum_trampoline(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let state = unsafe { &mut *(lparam.0 as *mut EnumState<'_, '_>) };
        let handle = WindowHandle::from_raw(hwnd.0 as isize);
        state.tally.visited += 1;
        trace!("visiting window {handle}");

        match panic::catch_unwind(AssertUnwindSafe(|| (state.visit)(handle))) {
            Ok(ControlFlow::Continue(())) => TRUE,
            Ok(ControlFlow::Break(())) => {
                state.tally.stopped = true;
                FALSE
            }
            Err(payload) => {
                state.tally.panic = Some(payload);
                state.tally.stopped = true;
                FALSE
            }
        }
    }

    fn to_hwnd(handle: WindowHandle) -> HWND {
        HWND(handle.as_raw() as *mut core::ffi::c_void)
    }

    impl WindowingApi for User32 {
        fn cursor_pos(&self) -> Option<Point> {
            let mut p = POINT::default();
            match unsafe { GetCursorPos(&mut p) } {
                Ok(()) => Some(p.into()),
                Err(e) => {
                    debug!("GetCursorPos unavailable: {e}");
                    None
                }
            }
        }

        fn enum_windows(
            &self,
            visit: &mut WindowVisitor<'_>,
        ) -> Result<ControlFlow<()>, WinRectError> {
            self.run_enumeration("EnumWindows", visit, |enum_proc, lparam| unsafe {
                EnumWindows(enum_proc, lparam)
            })
        }

        fn enum_child_windows(
            &self,
            parent: WindowHandle,
            visit: &mut WindowVisitor<'_>,
        ) -> Result<ControlFlow<()>, WinRectError> {
            // EnumChildWindows' return value carries no meaning.
            self.run_enumeration("EnumChildWindows", visit, |enum_proc, lparam| {
                let _ = unsafe { EnumChildWindows(to_hwnd(parent), enum_proc, lparam) };
                Ok(())
            })
        }

        fn window_rect(&self, hwnd: WindowHandle) -> Option<Rect> {
            let mut r = RECT::default();
            match unsafe { GetWindowRect(to_hwnd(hwnd), &mut r) } {
                Ok(()) => Some(r.into()),
                Err(e) => {
                    debug!("GetWindowRect({hwnd}) unavailable: {e}");
                    None
                }
            }
        }
    }
}

#[cfg(not(windows))]
mod imp {
    use std::convert::Infallible;

    use super::*;

    /// Explicitly-loaded binding to the User32 windowing functions.
    ///
    /// Uninhabited on this target: [`User32::load`] always fails.
    #[derive(Debug, Clone, Copy)]
    pub struct User32 {
        never: Infallible,
    }

    impl User32 {
        pub fn load() -> Result<Self, WinRectError> {
            Err(WinRectError::Unsupported(format!(
                "User32 is only available on Windows (target os: {})",
                std::env::consts::OS
            )))
        }
    }

    impl WindowingApi for User32 {
        fn cursor_pos(&self) -> Option<Point> {
            match self.never {}
        }

        fn enum_windows(
            &self,
            _visit: &mut WindowVisitor<'_>,
        ) -> Result<ControlFlow<()>, WinRectError> {
            match self.never {}
        }

        fn enum_child_windows(
            &self,
            _parent: WindowHandle,
            _visit: &mut WindowVisitor<'_>,
        ) -> Result<ControlFlow<()>, WinRectError> {
            match self.never {}
        }

        fn window_rect(&self, _hwnd: WindowHandle) -> Option<Rect> {
            match self.never {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_load_is_unsupported_off_windows() {
        match User32::load() {
            Err(WinRectError::Unsupported(msg)) => assert!(msg.contains("Windows")),
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[cfg(windows)]
    #[test]
    fn test_null_handle_rect_is_unavailable() {
        let api = User32::load().unwrap();
        assert!(api.window_rect(WindowHandle::NULL).is_none());
    }

    #[test]
    fn test_os_failure_after_stop_is_break() {
        let tally = EnumTally {
            visited: 3,
            stopped: true,
            panic: None,
        };
        let flow = finish_enumeration("EnumWindows", tally, Err("returned FALSE")).unwrap();
        assert_eq!(flow, ControlFlow::Break(()));
    }

    #[test]
    fn test_exhausted_enumeration_is_continue() {
        let tally = EnumTally {
            visited: 12,
            ..EnumTally::default()
        };
        let flow = finish_enumeration::<String>("EnumWindows", tally, Ok(())).unwrap();
        assert_eq!(flow, ControlFlow::Continue(()));
    }

    #[test]
    fn test_os_failure_without_stop_is_error() {
        let err = finish_enumeration("EnumWindows", EnumTally::default(), Err("access denied"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "EnumerationError: EnumWindows failed: access denied"
        );
    }

    #[test]
    fn test_caught_visitor_panic_is_resumed() {
        let payload = std::panic::catch_unwind(|| panic!("visitor boom")).unwrap_err();
        let tally = EnumTally {
            visited: 1,
            stopped: true,
            panic: Some(payload),
        };
        let resumed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            finish_enumeration::<String>("EnumWindows", tally, Ok(()))
        }))
        .unwrap_err();
        assert_eq!(resumed.downcast_ref::<&str>(), Some(&"visitor boom"));
    }
}
