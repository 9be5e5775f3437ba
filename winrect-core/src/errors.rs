//! Error types for `winrect_core`.
//!
//! OS queries that fail (no cursor, stale window handle) are not errors:
//! they surface as `None`.  [`WinRectError`] covers what is left, and uses
//! `thiserror` for `Display` and `Error` derives.  PyO3 conversion is
//! handled in the `winrect-pyo3` crate, keeping this crate PyO3-free.

use thiserror::Error;

/// Top-level error type for the `winrect_core` library.
#[derive(Debug, Error)]
pub enum WinRectError {
    /// The User32 binding cannot be loaded on this target.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// `EnumWindows` / `EnumChildWindows` failed without the visitor
    /// asking to stop.
    #[error("EnumerationError: {0}")]
    EnumerationError(String),
}

#[cfg(windows)]
impl From<windows::core::Error> for WinRectError {
    fn from(err: windows::core::Error) -> Self {
        WinRectError::EnumerationError(format!("Win32 error: {err}"))
    }
}
