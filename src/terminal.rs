// SPDX-License-Identifier: MIT
//
// Terminal queries — size, TTY detection, and the fail-fast probe.
//
// Safety: This module necessarily uses `unsafe` for ioctl (TIOCGWINSZ) and
// isatty. These are the standard POSIX interfaces for terminal queries —
// there is no safe alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// Nothing here is cached: the session re-queries the size on every repaint
// because the terminal can be resized between any two calls. A wrong height
// would repaint the bar into the scrollable area; a wrong width merely
// mis-sizes one frame.

use crate::error::Error;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows; the last one is the bar's reserved row.
    pub rows: u16,
}

// ─── Queries ────────────────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdout is connected to a terminal (TTY).
///
/// Stdout, not stdin: the bar is drawn there, and a program whose output
/// is piped must never receive scroll-region sequences in its stream.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// Whether `$TERM` names a terminal that can be trusted with scroll-region
/// manipulation. Unset or `dumb` cannot.
#[must_use]
pub fn term_is_usable(term: Option<&str>) -> bool {
    match term {
        Some(name) => !name.is_empty() && name != "dumb",
        None => false,
    }
}

/// Probe the terminal before a session claims a row.
///
/// Fails fast with [`Error::TerminalUnavailable`] rather than degrading:
/// a half-applied scroll region silently corrupts all subsequent output,
/// so a caller that cannot get a real terminal should fall back to plain
/// prints instead.
///
/// # Errors
///
/// Returns [`Error::TerminalUnavailable`] when stdout is not a TTY, `$TERM`
/// is unset or `dumb`, the size query fails, or the terminal has fewer than
/// two rows (no row to spare for the bar).
pub fn probe() -> Result<Size, Error> {
    if !term_is_usable(std::env::var("TERM").ok().as_deref()) {
        return Err(Error::TerminalUnavailable("TERM is unset or dumb"));
    }
    if !is_tty() {
        return Err(Error::TerminalUnavailable("stdout is not a tty"));
    }
    let size = get_size().ok_or(Error::TerminalUnavailable("size query failed"))?;
    if size.rows < 2 {
        return Err(Error::TerminalUnavailable("terminal too short"));
    }
    Ok(size)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    // ── Size ──────────────────────────────────────────────────────────

    #[test]
    fn size_equality() {
        assert_eq!(Size { cols: 80, rows: 24 }, Size { cols: 80, rows: 24 });
    }

    #[test]
    fn size_inequality() {
        assert_ne!(Size { cols: 80, rows: 24 }, Size { cols: 120, rows: 40 });
    }

    #[test]
    fn size_is_copy() {
        let a = Size { cols: 80, rows: 24 };
        let b = a;
        assert_eq!(a, b);
    }

    #[test]
    fn size_debug_format() {
        let s = Size { cols: 80, rows: 24 };
        let debug = format!("{s:?}");
        assert!(debug.contains("80"));
        assert!(debug.contains("24"));
    }

    // ── Queries ───────────────────────────────────────────────────────

    #[test]
    fn get_size_does_not_panic() {
        let _ = get_size();
    }

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }

    // ── TERM sanity ───────────────────────────────────────────────────

    #[test]
    fn term_unset_is_unusable() {
        assert!(!term_is_usable(None));
    }

    #[test]
    fn term_empty_is_unusable() {
        assert!(!term_is_usable(Some("")));
    }

    #[test]
    fn term_dumb_is_unusable() {
        assert!(!term_is_usable(Some("dumb")));
    }

    #[test]
    fn term_xterm_is_usable() {
        assert!(term_is_usable(Some("xterm-256color")));
    }
}
