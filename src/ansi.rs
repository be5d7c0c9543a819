// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit — that's the session's job. This module
// just knows the byte-level encoding of every terminal command the bar needs:
// SCO cursor save/restore, DECSTBM scroll regions, HVP positioning, EL, and
// the handful of SGR color codes the renderer uses.
//
// Rows are 1-indexed here, matching the terminal's own coordinate system —
// the session always addresses whole rows, never cells, so there is no
// 0-indexed layer to convert from.
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to a `Vec<u8>` sink in tests.

use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Save the cursor position (SCO, CSI s).
#[inline]
pub fn save_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[s")
}

/// Restore the cursor position saved by [`save_cursor`] (SCO, CSI u).
#[inline]
pub fn restore_cursor(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[u")
}

/// Move the cursor up one row (CUU 1).
///
/// Used right after a restore to pull a cursor that was sitting on the
/// now-reserved bottom row back inside the scrollable region.
#[inline]
pub fn cursor_up(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[1A")
}

/// Move the cursor to the start of `row` using HVP.
#[inline]
pub fn row_start(w: &mut impl Write, row: u16) -> io::Result<()> {
    write!(w, "\x1b[{row};0f")
}

// ─── Scroll Region ───────────────────────────────────────────────────────────

/// Restrict scrolling to rows 0..=`last_row` (DECSTBM).
///
/// Passing the full terminal height restores normal whole-screen scrolling.
/// Side effect per the VT spec: the cursor jumps to the top-left, which is
/// why every use is bracketed by [`save_cursor`] / [`restore_cursor`].
#[inline]
pub fn set_scroll_region(w: &mut impl Write, last_row: u16) -> io::Result<()> {
    write!(w, "\x1b[0;{last_row}r")
}

// ─── Erase ───────────────────────────────────────────────────────────────────

/// Clear from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_to_eol(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Background color behind the filled run of the bar.
///
/// The named variants are the classic 8-color SGR backgrounds; `Ansi256`
/// selects from the 256-color palette for the graduated ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarColor {
    /// SGR 42 — the default fill.
    #[default]
    Green,
    /// SGR 41.
    Red,
    /// SGR 43 — the "waiting on user" signal.
    Yellow,
    /// SGR 48;5;N — 256-color palette index.
    Ansi256(u8),
}

/// Set the background color.
pub fn bg(w: &mut impl Write, color: BarColor) -> io::Result<()> {
    match color {
        BarColor::Green => w.write_all(b"\x1b[42m"),
        BarColor::Red => w.write_all(b"\x1b[41m"),
        BarColor::Yellow => w.write_all(b"\x1b[43m"),
        BarColor::Ansi256(idx) => write!(w, "\x1b[48;5;{idx}m"),
    }
}

/// Set the foreground to black (SGR 30), so fill glyphs read against
/// any bar background.
#[inline]
pub fn fg_black(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[30m")
}

/// Reset the foreground to the terminal default (SGR 39).
#[inline]
pub fn reset_fg(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[39m")
}

/// Reset the background to the terminal default (SGR 49).
#[inline]
pub fn reset_bg(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[49m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
