// SPDX-License-Identifier: MIT
//
// The bar renderer — a pure function from (percentage, columns, style,
// spinner phase, label) to the bytes of one bar line.
//
// Nothing here touches the terminal or the session: output goes to any
// `impl Write`, which is also how the tests pin the format down to the
// byte. Swapping the look of the bar means swapping this module; the
// session neither knows nor cares what the line contains.

use std::io::{self, Write};

use crate::ansi::{self, BarColor};
use crate::style::{self, BarStyle, StyleFlags};

// ─── Geometry ────────────────────────────────────────────────────────────────

/// Columns reserved around the bar when the fallback label is shown.
pub const MARGIN_PLAIN: u16 = 21;

/// Columns reserved around the bar when a caller label is rendered.
pub const MARGIN_LABELED: u16 = 24;

/// Interior width of the bar frame for a terminal `cols` wide.
///
/// Window-style spinners show extra glyphs in their bracket; those columns
/// are also subtracted so the finished line can never exceed the terminal
/// width and wrap inside the reserved row. Saturates at zero on very
/// narrow terminals — the bar degrades to an empty frame rather than
/// failing.
#[must_use]
pub fn bar_width(cols: u16, style: &BarStyle, labeled: bool) -> u16 {
    let margin = if labeled { MARGIN_LABELED } else { MARGIN_PLAIN };
    #[allow(clippy::cast_possible_truncation)] // window() is at most 3.
    let window_extra = (style.spinner.window() - 1) as u16;
    cols.saturating_sub(margin + window_extra)
}

/// Split an interior width into (filled, empty) for a percentage.
///
/// `filled` is the integer floor of `width × percentage / 100`, so the two
/// always sum back to `width` and `filled` grows monotonically with the
/// percentage.
#[must_use]
pub fn split(width: u16, percentage: u8) -> (u16, u16) {
    let filled = u32::from(width) * u32::from(percentage.min(100)) / 100;
    #[allow(clippy::cast_possible_truncation)] // filled <= width <= u16::MAX.
    let filled = filled as u16;
    (filled, width - filled)
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Write one bar line.
///
/// Layout, static fill:  ` [{spinner}] {label} {pct:>3}% [{fill}{filler}]`
/// Layout, dynamic fill: ` {label} {pct:>3}% [{fill}{spinner…}]`
///
/// The spinner bracket disappears for undecorated sets, `label` falls back
/// to [`style::DEFAULT_LABEL`] when neither the call nor the style supplies
/// one (an empty label counts as none), and `tint_override` pins the fill
/// background regardless of ramp or style — that is how a blocked draw
/// shows its fixed color.
///
/// # Errors
///
/// Propagates write failures from `w`.
pub fn render(
    w: &mut impl Write,
    bar: &BarStyle,
    percentage: u8,
    cols: u16,
    phase: usize,
    label: Option<&str>,
    tint_override: Option<BarColor>,
) -> io::Result<()> {
    let percentage = percentage.min(100);
    let label = label
        .or(bar.label.as_deref())
        .filter(|text| !text.is_empty());
    let width = bar_width(cols, bar, label.is_some());
    let (filled, empty) = split(width, percentage);
    let dynamic = bar.flags.contains(StyleFlags::DYNAMIC_FILL);

    w.write_all(b" ")?;
    if !dynamic {
        let frame = bar.spinner.frame(phase);
        if bar.spinner.decorated() {
            write!(w, "[{frame}] ")?;
        } else {
            write!(w, "{frame} ")?;
        }
    }
    match label {
        Some(text) => write!(w, "{} ", style::format_label(text))?,
        None => write!(w, "{} ", style::DEFAULT_LABEL)?,
    }
    write!(w, "{percentage:>3}% [")?;

    if bar.flags.contains(StyleFlags::FRAME_ONLY) {
        // Just the frame: no glyphs, no color.
        write!(w, "{}", " ".repeat(usize::from(width)))?;
    } else {
        let tint = tint_override.unwrap_or_else(|| {
            if bar.flags.contains(StyleFlags::COLOR_RAMP) {
                BarColor::Ansi256(style::RAMP[style::ramp_bucket(percentage)])
            } else {
                bar.tint
            }
        });
        ansi::fg_black(w)?;
        ansi::bg(w, tint)?;
        write!(w, "{}", "#".repeat(usize::from(filled)))?;
        ansi::reset_fg(w)?;
        ansi::reset_bg(w)?;
        if dynamic {
            let glyph = bar.spinner.glyph(phase);
            for _ in 0..empty {
                write!(w, "{glyph}")?;
            }
        } else {
            write!(w, "{}", ".".repeat(usize::from(empty)))?;
        }
    }
    w.write_all(b"]")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
