//! Standalone CLI tool for cursor position, window listing and window rects.

use std::env;
use std::error::Error;
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::{Builder, Target};
use log::{debug, LevelFilter};
use serde::Serialize;

use winrect_core::window::{list_child_windows, list_windows, windows_at};
use winrect_core::{Point, Rect, User32, WindowHandle, WindowingApi};

#[derive(Parser)]
#[command(name = "winrect", about = "Query cursor position and window rects via User32")]
struct Args {
    /// Enable debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print the cursor position
    Cursor,
    /// List top-level windows with their rect and center
    Windows {
        /// List the children of this window instead (hex or decimal)
        #[arg(long, value_parser = parse_hwnd, conflicts_with = "at")]
        parent: Option<isize>,
        /// Only windows containing this point, e.g. --at=-100,50
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        at: Option<Point>,
    },
    /// Print one window's rect, size and center
    Rect {
        /// Window handle (hex, e.g. 0x1A2B, or decimal)
        #[arg(value_parser = parse_hwnd)]
        hwnd: isize,
    },
}

#[derive(Serialize)]
struct RectReport {
    hwnd: WindowHandle,
    rect: Rect,
    width: u32,
    height: u32,
    center: Point,
}

/// Result of a command that ran without error.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Printed,
    Unavailable(String),
}

fn parse_hwnd(s: &str) -> Result<isize, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        isize::from_str_radix(hex, 16).map_err(|e| e.to_string())
    } else {
        s.parse::<isize>().map_err(|e| e.to_string())
    }
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got {s:?}"))?;
    let x = x.trim().parse::<i32>().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse::<i32>().map_err(|e| format!("bad y: {e}"))?;
    Ok(Point::new(x, y))
}

fn init_logging(verbose: bool) {
    let mut builder = Builder::new();
    builder.filter_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    if let Ok(filters) = env::var("WINRECT_LOG_LEVEL") {
        builder.parse_filters(&filters);
    }

    if let Ok(path) = env::var("WINRECT_LOG_FILE") {
        match File::create(&path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Failed to create log file {path}: {e}"),
        }
    }

    builder.init();
}

fn write_json<T: Serialize + ?Sized>(
    out: &mut impl Write,
    value: &T,
    compact: bool,
) -> Result<(), Box<dyn Error>> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    writeln!(out, "{json}")?;
    Ok(())
}

fn run(
    api: &dyn WindowingApi,
    command: &Command,
    compact: bool,
    out: &mut impl Write,
) -> Result<Outcome, Box<dyn Error>> {
    match command {
        Command::Cursor => match api.cursor_pos() {
            Some(p) => write_json(out, &p, compact).map(|()| Outcome::Printed),
            None => Ok(Outcome::Unavailable("cursor position unavailable".to_owned())),
        },
        Command::Windows { parent, at } => {
            let infos = match (parent, at) {
                (Some(parent), _) => list_child_windows(api, WindowHandle::from_raw(*parent))?,
                (None, Some(point)) => windows_at(api, *point)?,
                (None, None) => list_windows(api)?,
            };
            debug!("listing {} windows", infos.len());
            write_json(out, &infos, compact).map(|()| Outcome::Printed)
        }
        Command::Rect { hwnd } => {
            let handle = WindowHandle::from_raw(*hwnd);
            match api.window_rect(handle) {
                Some(rect) => {
                    let report = RectReport {
                        hwnd: handle,
                        rect,
                        width: rect.width(),
                        height: rect.height(),
                        center: rect.center(),
                    };
                    write_json(out, &report, compact).map(|()| Outcome::Printed)
                }
                None => Ok(Outcome::Unavailable(format!(
                    "window rect unavailable for hwnd {handle}"
                ))),
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let api = match User32::load() {
        Ok(api) => api,
        Err(e) => {
            eprintln!("winrect: {e}");
            return ExitCode::from(2);
        }
    };

    let mut stdout = io::stdout().lock();
    match run(&api, &args.command, args.compact, &mut stdout) {
        Ok(Outcome::Printed) => ExitCode::SUCCESS,
        Ok(Outcome::Unavailable(msg)) => {
            eprintln!("winrect: {msg}");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("winrect: {e}");
            ExitCode::from(2)
        }
    }
}
