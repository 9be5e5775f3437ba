//! `winrect_core` -- Pure Rust core library for winrect.
//!
//! This crate contains all logic with **no PyO3 dependency**.
//! It can be consumed by:
//! - `winrect-pyo3` (PyO3 Python extension)
//! - `winrect-ffi` (C ABI DLL for ctypes / other languages)
//! - `winrect-cli` (standalone CLI tool)
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | `WinRectError` enum via `thiserror` |
//! | [`geometry`] | `Point` / `Rect` screen-coordinate values |
//! | [`window`] | `WindowHandle`, the `WindowingApi` seam, listing helpers |
//! | [`user32`] | `User32` binding object: `GetCursorPos`, `EnumWindows`, `EnumChildWindows`, `GetWindowRect` |

pub mod errors;
pub mod geometry;
pub mod user32;
pub mod window;

pub use errors::WinRectError;
pub use geometry::{Point, Rect};
pub use user32::User32;
pub use window::{WindowHandle, WindowInfo, WindowingApi};
