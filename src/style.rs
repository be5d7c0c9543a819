// SPDX-License-Identifier: MIT
//
// Bar appearance — style flags, spinner glyph sets, the color ramp, and
// label formatting. Everything here is plain data and pure functions; the
// renderer decides what to do with it, the session decides when.

use unicode_width::UnicodeWidthChar;

use crate::ansi::BarColor;

// ─── Style Flags ─────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Capability switches for the bar, stored as a compact bitfield.
    ///
    /// Combine with bitwise OR:
    ///
    /// ```
    /// use pinbar::style::StyleFlags;
    ///
    /// let flags = StyleFlags::COLOR_RAMP | StyleFlags::DYNAMIC_FILL;
    /// assert!(flags.contains(StyleFlags::COLOR_RAMP));
    /// assert!(!flags.contains(StyleFlags::FRAME_ONLY));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StyleFlags: u8 {
        /// Tint the filled run by percentage bucket along the 256-color
        /// ramp instead of one solid background.
        const COLOR_RAMP   = 1 << 0;
        /// Animate the spinner through the unfilled segment instead of
        /// showing a static filler.
        const DYNAMIC_FILL = 1 << 1;
        /// Suppress fill and filler glyphs entirely; draw just the frame.
        const FRAME_ONLY   = 1 << 2;
    }
}

// ─── Spinner Sets ────────────────────────────────────────────────────────────

/// Spinner phase a fresh session starts at: one step into the glyph
/// sequence, not zero.
pub const INITIAL_PHASE: usize = 1;

/// A glyph sequence cycled one step per draw to animate the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spinner {
    /// The classic line spinner, one bracketed glyph per frame.
    #[default]
    Line,
    /// Braille dots, shown as a sliding window of three consecutive
    /// glyphs for a smoother sweep.
    Braille,
    /// Compass arrows, rendered bare — no bracket decoration.
    Arrows,
}

impl Spinner {
    /// The glyph sequence this set cycles through.
    #[must_use]
    pub const fn glyphs(self) -> &'static [char] {
        match self {
            Self::Line => &['\\', '|', '/', '-', '—'],
            Self::Braille => &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'],
            Self::Arrows => &['←', '↖', '↑', '↗', '→', '↘', '↓', '↙'],
        }
    }

    /// Number of draw calls before the animation repeats.
    #[must_use]
    pub const fn period(self) -> usize {
        self.glyphs().len()
    }

    /// How many consecutive glyphs one frame shows.
    #[must_use]
    pub const fn window(self) -> usize {
        match self {
            Self::Braille => 3,
            Self::Line | Self::Arrows => 1,
        }
    }

    /// Whether the spinner frame gets `[` `]` decoration.
    #[must_use]
    pub const fn decorated(self) -> bool {
        !matches!(self, Self::Arrows)
    }

    /// The single glyph at `phase` (used when the spinner fills the bar).
    #[must_use]
    pub fn glyph(self, phase: usize) -> char {
        self.glyphs()[phase % self.period()]
    }

    /// One animation frame: [`window`](Self::window) consecutive glyphs
    /// starting at `phase`, wrapping around the sequence.
    #[must_use]
    pub fn frame(self, phase: usize) -> String {
        let glyphs = self.glyphs();
        (0..self.window())
            .map(|offset| glyphs[(phase + offset) % glyphs.len()])
            .collect()
    }
}

// ─── Color Ramp ──────────────────────────────────────────────────────────────

/// 256-color palette indices for the ten percentage buckets, red through
/// green.
pub const RAMP: [u8; 10] = [196, 202, 208, 214, 220, 226, 154, 118, 82, 46];

/// Bucket for a percentage: `0..=9`, with 100 clamped into the last one.
#[must_use]
pub fn ramp_bucket(percentage: u8) -> usize {
    usize::from(percentage / 10).min(RAMP.len() - 1)
}

// ─── Labels ──────────────────────────────────────────────────────────────────

/// Display width every supplied label is forced to.
pub const LABEL_WIDTH: usize = 10;

/// What the bar says when the caller supplies no label.
pub const DEFAULT_LABEL: &str = "Progress";

/// Fit a label to exactly [`LABEL_WIDTH`] display columns: truncate what
/// is too long, pad what is too short with trailing spaces.
///
/// Width is measured in terminal columns, not chars, so wide glyphs
/// cannot push the bar frame out of alignment.
#[must_use]
pub fn format_label(label: &str) -> String {
    let mut out = String::with_capacity(LABEL_WIDTH);
    let mut width = 0;
    for ch in label.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > LABEL_WIDTH {
            break;
        }
        out.push(ch);
        width += w;
    }
    for _ in width..LABEL_WIDTH {
        out.push(' ');
    }
    out
}

// ─── BarStyle ────────────────────────────────────────────────────────────────

/// Appearance configuration for a bar session.
///
/// The default is the classic look: solid green fill, static `.` filler,
/// bracketed line spinner, `Progress` label.
#[derive(Debug, Clone, Default)]
pub struct BarStyle {
    /// Capability switches.
    pub flags: StyleFlags,
    /// Which glyph sequence animates.
    pub spinner: Spinner,
    /// Solid fill background, used when [`StyleFlags::COLOR_RAMP`] is off.
    pub tint: BarColor,
    /// Session-wide label; individual draws may override it, and `None`
    /// falls back to [`DEFAULT_LABEL`].
    pub label: Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
