//! `winrect` -- Thin PyO3 wrappers around `winrect_core`.
//!
//! Exposes the `Point` / `Rect` value classes and the cursor, window
//! enumeration and window rectangle queries.  Plain OS queries release
//! the GIL via `py.allow_threads()`; enumeration keeps it because the
//! visitor is a Python callable.  All logic lives in `winrect_core`.
//!
//! ```python
//! import winrect
//!
//! def cb(hwnd, lparam):
//!     r = winrect.get_window_rect(hwnd)
//!     if r is not None:
//!         print(hwnd, r, r.center)
//!     return True
//!
//! winrect.enum_windows(cb)
//! ```

use std::ops::ControlFlow;

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;

use winrect_core::window::WindowVisitor;
use winrect_core::{Point, Rect, User32, WinRectError, WindowHandle, WindowingApi};

// ---------------------------------------------------------------------------
// Error conversion helper
// ---------------------------------------------------------------------------

fn to_py_err(e: WinRectError) -> PyErr {
    PyRuntimeError::new_err(e.to_string())
}

fn load() -> PyResult<User32> {
    User32::load().map_err(to_py_err)
}

// ---------------------------------------------------------------------------
// Geometry classes
// ---------------------------------------------------------------------------

/// Screen-coordinate point.
#[pyclass(name = "Point", module = "winrect", frozen, eq, hash)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct PyPoint(Point);

#[pymethods]
impl PyPoint {
    #[new]
    #[pyo3(signature = (x, y))]
    fn new(x: i32, y: i32) -> Self {
        Self(Point::new(x, y))
    }

    #[getter]
    fn x(&self) -> i32 {
        self.0.x
    }

    #[getter]
    fn y(&self) -> i32 {
        self.0.y
    }

    fn __repr__(&self) -> String {
        format!("Point(x={}, y={})", self.0.x, self.0.y)
    }
}

/// Screen-coordinate rectangle.
///
/// `width` / `height` are absolute differences; `center` offsets the raw
/// `left` / `top` by half of them.  `geometric_center` is the midpoint of
/// the normalized rectangle.
#[pyclass(name = "Rect", module = "winrect", frozen, eq, hash)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct PyRect(Rect);

#[pymethods]
impl PyRect {
    #[new]
    #[pyo3(signature = (left, top, right, bottom))]
    fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self(Rect::new(left, top, right, bottom))
    }

    #[getter]
    fn left(&self) -> i32 {
        self.0.left
    }

    #[getter]
    fn top(&self) -> i32 {
        self.0.top
    }

    #[getter]
    fn right(&self) -> i32 {
        self.0.right
    }

    #[getter]
    fn bottom(&self) -> i32 {
        self.0.bottom
    }

    #[getter]
    fn width(&self) -> u32 {
        self.0.width()
    }

    #[getter]
    fn height(&self) -> u32 {
        self.0.height()
    }

    #[getter]
    fn center(&self) -> PyPoint {
        PyPoint(self.0.center())
    }

    #[getter]
    fn geometric_center(&self) -> PyPoint {
        PyPoint(self.0.geometric_center())
    }

    fn contains(&self, point: PyPoint) -> bool {
        self.0.contains(point.0)
    }

    fn __repr__(&self) -> String {
        format!(
            "Rect(left={}, top={}, right={}, bottom={})",
            self.0.left, self.0.top, self.0.right, self.0.bottom
        )
    }
}

// ---------------------------------------------------------------------------
// Enumeration bridge
// ---------------------------------------------------------------------------

/// Run one enumeration, calling `callback(hwnd, lparam)` per window.
///
/// A falsy return stops enumeration.  An exception stops it too and is
/// re-raised once the OS call returns.  Returns `True` if every window
/// was visited.
fn run_enumeration(
    py: Python<'_>,
    callback: &Bound<'_, PyAny>,
    lparam: Option<PyObject>,
    enumerate: impl FnOnce(&mut WindowVisitor<'_>) -> Result<ControlFlow<()>, WinRectError>,
) -> PyResult<bool> {
    let lparam = lparam.unwrap_or_else(|| py.None());
    let mut failure: Option<PyErr> = None;

    let flow = enumerate(&mut |hwnd: WindowHandle| {
        let verdict = callback
            .call1((hwnd.as_raw(), lparam.clone_ref(py)))
            .and_then(|ret| ret.is_truthy());
        match verdict {
            Ok(true) => ControlFlow::Continue(()),
            Ok(false) => ControlFlow::Break(()),
            Err(e) => {
                failure = Some(e);
                ControlFlow::Break(())
            }
        }
    })
    .map_err(to_py_err)?;

    if let Some(e) = failure {
        return Err(e);
    }
    Ok(flow.is_continue())
}

fn cursor_pos_impl(py: Python<'_>, api: &User32) -> Option<PyPoint> {
    py.allow_threads(|| api.cursor_pos()).map(PyPoint)
}

fn window_rect_impl(py: Python<'_>, api: &User32, hwnd: isize) -> Option<PyRect> {
    py.allow_threads(|| api.window_rect(WindowHandle::from_raw(hwnd)))
        .map(PyRect)
}

// ---------------------------------------------------------------------------
// User32 class
// ---------------------------------------------------------------------------

/// Explicit binding object; raises `RuntimeError` off Windows.
#[pyclass(name = "User32", module = "winrect", frozen)]
struct PyUser32(User32);

#[pymethods]
impl PyUser32 {
    #[new]
    fn new() -> PyResult<Self> {
        load().map(Self)
    }

    fn cursor_pos(&self, py: Python<'_>) -> Option<PyPoint> {
        cursor_pos_impl(py, &self.0)
    }

    #[pyo3(signature = (callback, lparam=None))]
    fn enum_windows(
        &self,
        py: Python<'_>,
        callback: &Bound<'_, PyAny>,
        lparam: Option<PyObject>,
    ) -> PyResult<bool> {
        run_enumeration(py, callback, lparam, |visit| self.0.enum_windows(visit))
    }

    #[pyo3(signature = (parent, callback, lparam=None))]
    fn enum_child_windows(
        &self,
        py: Python<'_>,
        parent: isize,
        callback: &Bound<'_, PyAny>,
        lparam: Option<PyObject>,
    ) -> PyResult<bool> {
        run_enumeration(py, callback, lparam, |visit| {
            self.0
                .enum_child_windows(WindowHandle::from_raw(parent), visit)
        })
    }

    fn window_rect(&self, py: Python<'_>, hwnd: isize) -> Option<PyRect> {
        window_rect_impl(py, &self.0, hwnd)
    }
}

// ---------------------------------------------------------------------------
// Module-level functions
// ---------------------------------------------------------------------------

/// Current cursor position, or `None` when unavailable.
#[pyfunction]
fn get_cursor_pos(py: Python<'_>) -> PyResult<Option<PyPoint>> {
    let api = load()?;
    Ok(cursor_pos_impl(py, &api))
}

/// Enumerate all top-level windows.
///
/// `callback(hwnd, lparam)` is called per window; return a falsy value to
/// stop.
#[pyfunction]
#[pyo3(signature = (callback, lparam=None))]
fn enum_windows(
    py: Python<'_>,
    callback: &Bound<'_, PyAny>,
    lparam: Option<PyObject>,
) -> PyResult<bool> {
    let api = load()?;
    run_enumeration(py, callback, lparam, |visit| api.enum_windows(visit))
}

/// Enumerate the child windows of `parent`.
#[pyfunction]
#[pyo3(signature = (parent, callback, lparam=None))]
fn enum_child_windows(
    py: Python<'_>,
    parent: isize,
    callback: &Bound<'_, PyAny>,
    lparam: Option<PyObject>,
) -> PyResult<bool> {
    let api = load()?;
    run_enumeration(py, callback, lparam, |visit| {
        api.enum_child_windows(WindowHandle::from_raw(parent), visit)
    })
}

/// Bounding rectangle of `hwnd` in screen coordinates, or `None`.
#[pyfunction]
#[pyo3(signature = (hwnd,))]
fn get_window_rect(py: Python<'_>, hwnd: isize) -> PyResult<Option<PyRect>> {
    let api = load()?;
    Ok(window_rect_impl(py, &api, hwnd))
}

/// `[(hwnd, Rect | None), ...]` for every top-level window.
#[pyfunction]
fn list_windows(py: Python<'_>) -> PyResult<Vec<(isize, Option<PyRect>)>> {
    let api = load()?;
    let infos = py
        .allow_threads(|| winrect_core::window::list_windows(&api))
        .map_err(to_py_err)?;
    Ok(infos
        .into_iter()
        .map(|info| (info.hwnd.as_raw(), info.rect.map(PyRect)))
        .collect())
}

// ---------------------------------------------------------------------------
// Module registration
// ---------------------------------------------------------------------------

/// Register the `winrect` Python module.
#[pymodule]
fn winrect(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPoint>()?;
    m.add_class::<PyRect>()?;
    m.add_class::<PyUser32>()?;

    m.add_function(wrap_pyfunction!(get_cursor_pos, m)?)?;
    m.add_function(wrap_pyfunction!(enum_windows, m)?)?;
    m.add_function(wrap_pyfunction!(enum_child_windows, m)?)?;
    m.add_function(wrap_pyfunction!(get_window_rect, m)?)?;
    m.add_function(wrap_pyfunction!(list_windows, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("__doc__", "Cursor position, window enumeration and window rects via User32.")?;

    Ok(())
}
