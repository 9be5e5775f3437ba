//! Window handles, the windowing-API seam, and enumeration helpers.
//!
//! [`WindowingApi`] is the boundary toward the OS windowing subsystem.
//! [`User32`](crate::user32::User32) implements it on Windows; tests use
//! an in-memory fake.  All helpers return owned structs, never raw
//! `HWND`s.

use std::fmt;
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::errors::WinRectError;
use crate::geometry::{Point, Rect};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Opaque OS-assigned window identifier.
///
/// Wraps the raw `HWND` value as an `isize`, which is what Python, C and
/// JSON callers pass around.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(isize);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    pub const fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> isize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<isize> for WindowHandle {
    fn from(raw: isize) -> Self {
        Self(raw)
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Owned snapshot of one window's geometry.
///
/// `rect` and `center` are `None` when the OS could not report the
/// rectangle (the window was destroyed between enumeration and query).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    pub hwnd: WindowHandle,
    pub rect: Option<Rect>,
    pub center: Option<Point>,
}

/// Visitor invoked once per enumerated window.
///
/// Return `ControlFlow::Break(())` to stop, `ControlFlow::Continue(())` to
/// keep going.
pub type WindowVisitor<'a> = dyn FnMut(WindowHandle) -> ControlFlow<()> + 'a;

// ---------------------------------------------------------------------------
// API seam
// ---------------------------------------------------------------------------

/// The windowing operations this crate needs from the OS.
///
/// Query failures are reported as `None` (unavailable).  Enumeration
/// returns `Ok(Continue)` when every window was visited and `Ok(Break)`
/// when the visitor stopped early.
pub trait WindowingApi {
    /// Current pointer position in screen coordinates.
    fn cursor_pos(&self) -> Option<Point>;

    /// Visit every top-level window in z-order.
    fn enum_windows(&self, visit: &mut WindowVisitor<'_>)
        -> Result<ControlFlow<()>, WinRectError>;

    /// Visit every descendant window of `parent`.
    fn enum_child_windows(
        &self,
        parent: WindowHandle,
        visit: &mut WindowVisitor<'_>,
    ) -> Result<ControlFlow<()>, WinRectError>;

    /// Bounding rectangle of `hwnd` in screen coordinates.
    fn window_rect(&self, hwnd: WindowHandle) -> Option<Rect>;
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Collect every top-level window handle.
pub fn collect_windows<A: WindowingApi + ?Sized>(
    api: &A,
) -> Result<Vec<WindowHandle>, WinRectError> {
    let mut handles = Vec::with_capacity(64);
    api.enum_windows(&mut |hwnd| {
        handles.push(hwnd);
        ControlFlow::Continue(())
    })?;
    Ok(handles)
}

/// Collect every child window handle of `parent`.
pub fn collect_child_windows<A: WindowingApi + ?Sized>(
    api: &A,
    parent: WindowHandle,
) -> Result<Vec<WindowHandle>, WinRectError> {
    let mut handles = Vec::new();
    api.enum_child_windows(parent, &mut |hwnd| {
        handles.push(hwnd);
        ControlFlow::Continue(())
    })?;
    Ok(handles)
}

/// Snapshot `hwnd`'s rectangle and center.
pub fn describe_window<A: WindowingApi + ?Sized>(api: &A, hwnd: WindowHandle) -> WindowInfo {
    let rect = api.window_rect(hwnd);
    WindowInfo {
        hwnd,
        rect,
        center: rect.map(|r| r.center()),
    }
}

/// Describe every top-level window, in enumeration order.
pub fn list_windows<A: WindowingApi + ?Sized>(api: &A) -> Result<Vec<WindowInfo>, WinRectError> {
    let handles = collect_windows(api)?;
    Ok(handles
        .into_iter()
        .map(|hwnd| describe_window(api, hwnd))
        .collect())
}

/// Describe every child window of `parent`.
pub fn list_child_windows<A: WindowingApi + ?Sized>(
    api: &A,
    parent: WindowHandle,
) -> Result<Vec<WindowInfo>, WinRectError> {
    let handles = collect_child_windows(api, parent)?;
    Ok(handles
        .into_iter()
        .map(|hwnd| describe_window(api, hwnd))
        .collect())
}

/// Top-level windows whose rectangle contains `point`, topmost first.
///
/// Windows whose rectangle is unavailable are skipped.
pub fn windows_at<A: WindowingApi + ?Sized>(
    api: &A,
    point: Point,
) -> Result<Vec<WindowInfo>, WinRectError> {
    Ok(list_windows(api)?
        .into_iter()
        .filter(|info| info.rect.is_some_and(|r| r.contains(point)))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// In-memory desktop: a z-ordered list of top-level windows with
    /// optional rects, plus a parent -> children map.
    #[derive(Default)]
    struct FakeDesktop {
        pub cursor: Option<Point>,
        pub windows: Vec<(WindowHandle, Option<Rect>)>,
        pub children: HashMap<WindowHandle, Vec<WindowHandle>>,
        pub fail_enumeration: bool,
    }

    impl FakeDesktop {
        fn visit_all(
            &self,
            handles: impl IntoIterator<Item = WindowHandle>,
            visit: &mut WindowVisitor<'_>,
        ) -> Result<ControlFlow<()>, WinRectError> {
            if self.fail_enumeration {
                return Err(WinRectError::EnumerationError("fake failure".into()));
            }
            for hwnd in handles {
                if visit(hwnd).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
            Ok(ControlFlow::Continue(()))
        }
    }

    impl WindowingApi for FakeDesktop {
        fn cursor_pos(&self) -> Option<Point> {
            self.cursor
        }

        fn enum_windows(
            &self,
            visit: &mut WindowVisitor<'_>,
        ) -> Result<ControlFlow<()>, WinRectError> {
            self.visit_all(self.windows.iter().map(|(h, _)| *h), visit)
        }

        fn enum_child_windows(
            &self,
            parent: WindowHandle,
            visit: &mut WindowVisitor<'_>,
        ) -> Result<ControlFlow<()>, WinRectError> {
            let kids = self.children.get(&parent).cloned().unwrap_or_default();
            self.visit_all(kids, visit)
        }

        fn window_rect(&self, hwnd: WindowHandle) -> Option<Rect> {
            self.windows
                .iter()
                .find(|(h, _)| *h == hwnd)
                .and_then(|(_, r)| *r)
        }
    }

    fn desktop() -> FakeDesktop {
        let mut children = HashMap::new();
        children.insert(
            WindowHandle::from_raw(0x10),
            vec![WindowHandle::from_raw(0x11), WindowHandle::from_raw(0x12)],
        );
        FakeDesktop {
            cursor: Some(Point::new(50, 50)),
            windows: vec![
                (WindowHandle::from_raw(0x10), Some(Rect::new(0, 0, 100, 100))),
                (WindowHandle::from_raw(0x20), None),
                (WindowHandle::from_raw(0x30), Some(Rect::new(-1920, 0, 0, 1080))),
                (WindowHandle::from_raw(0x40), Some(Rect::new(40, 40, 60, 60))),
            ],
            children,
            fail_enumeration: false,
        }
    }

    #[test]
    fn test_window_handle_raw_roundtrip() {
        let h = WindowHandle::from_raw(0x1234);
        assert_eq!(h.as_raw(), 0x1234);
        assert!(!h.is_null());
        assert!(WindowHandle::NULL.is_null());
        assert_eq!(h.to_string(), "0x1234");
    }

    #[test]
    fn test_visitor_break_stops_after_that_handle() {
        let api = desktop();
        let mut seen = Vec::new();
        let flow = api
            .enum_windows(&mut |hwnd| {
                seen.push(hwnd);
                if hwnd == WindowHandle::from_raw(0x20) {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(
            seen,
            vec![WindowHandle::from_raw(0x10), WindowHandle::from_raw(0x20)]
        );
    }

    #[test]
    fn test_collect_windows_keeps_enumeration_order() {
        let handles = collect_windows(&desktop()).unwrap();
        let raw: Vec<isize> = handles.iter().map(|h| h.as_raw()).collect();
        assert_eq!(raw, vec![0x10, 0x20, 0x30, 0x40]);
    }

    #[test]
    fn test_collect_child_windows() {
        let api = desktop();
        let kids = collect_child_windows(&api, WindowHandle::from_raw(0x10)).unwrap();
        assert_eq!(kids.len(), 2);
        assert!(collect_child_windows(&api, WindowHandle::from_raw(0x30))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_describe_window_unavailable_rect() {
        let info = describe_window(&desktop(), WindowHandle::from_raw(0x20));
        assert!(info.rect.is_none());
        assert!(info.center.is_none());

        let info = describe_window(&desktop(), WindowHandle::from_raw(0x999));
        assert!(info.rect.is_none());
    }

    #[test]
    fn test_list_windows_computes_centers() {
        let infos = list_windows(&desktop()).unwrap();
        assert_eq!(infos.len(), 4);
        assert_eq!(infos[0].center, Some(Point::new(50, 50)));
        assert_eq!(infos[2].center, Some(Point::new(-960, 540)));
    }

    #[test]
    fn test_list_child_windows() {
        let infos = list_child_windows(&desktop(), WindowHandle::from_raw(0x10)).unwrap();
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(|i| i.rect.is_none()));
    }

    #[test]
    fn test_windows_at_filters_and_keeps_z_order() {
        let api = desktop();
        let hits = windows_at(&api, Point::new(50, 50)).unwrap();
        let raw: Vec<isize> = hits.iter().map(|i| i.hwnd.as_raw()).collect();
        assert_eq!(raw, vec![0x10, 0x40]);

        let hits = windows_at(&api, Point::new(-5, 10)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].hwnd.as_raw(), 0x30);

        assert!(windows_at(&api, Point::new(5000, 5000)).unwrap().is_empty());
    }

    #[test]
    fn test_enumeration_failure_propagates() {
        let api = FakeDesktop {
            fail_enumeration: true,
            ..desktop()
        };
        assert!(collect_windows(&api).is_err());
        assert!(list_windows(&api).is_err());
    }

    #[test]
    fn test_trait_object_usable() {
        let api = desktop();
        let dyn_api: &dyn WindowingApi = &api;
        assert_eq!(dyn_api.cursor_pos(), Some(Point::new(50, 50)));
        assert_eq!(collect_windows(dyn_api).unwrap().len(), 4);
    }

    #[test]
    fn test_window_info_serialization() {
        let info = WindowInfo {
            hwnd: WindowHandle::from_raw(66),
            rect: Some(Rect::new(0, 0, 10, 20)),
            center: Some(Point::new(5, 10)),
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"hwnd\":66"));
        assert!(json.contains("\"center\":{\"x\":5,\"y\":10}"));

        let missing = WindowInfo {
            hwnd: WindowHandle::from_raw(1),
            rect: None,
            center: None,
        };
        let json = serde_json::to_string(&missing).unwrap();
        assert!(json.contains("\"rect\":null"));
    }
}
