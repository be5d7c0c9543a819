// SPDX-License-Identifier: MIT
//
// Session lifecycle — claim the bottom row, repaint it, release it.
//
// The session owns the only real invariant in this crate: whatever happens
// after a successful `init` — normal teardown, drop, panic in the host, or
// SIGINT between two writes — the terminal's scroll region is put back and
// the reserved row is cleared. Claiming is fail-fast; releasing is
// best-effort and idempotent; the interrupt path shares the exact teardown
// bytes with the normal one.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::ansi::{self, BarColor};
use crate::error::Error;
use crate::interrupt;
use crate::render;
use crate::style::{self, BarStyle};
use crate::terminal::{self, Size};

/// One live session per process. Stacked scroll regions cannot be
/// untangled, so a second `init` is refused instead of corrupting the
/// first.
static SESSION_LIVE: AtomicBool = AtomicBool::new(false);

/// A claimed bottom-row progress bar.
///
/// Between [`init`](Self::init) and [`destroy`](Self::destroy) the last
/// terminal row is excluded from scrolling and repainted in place by the
/// draw calls, while everything the host prints scrolls above it.
/// Dropping the session releases the row too.
///
/// # Example
///
/// ```no_run
/// use pinbar::session::Session;
/// use pinbar::style::BarStyle;
///
/// let mut bar = Session::init(BarStyle::default(), true)?;
/// for step in 0..=100 {
///     // ... real work, printing as it goes ...
///     bar.draw(step)?;
/// }
/// bar.destroy();
/// # Ok::<(), pinbar::error::Error>(())
/// ```
pub struct Session {
    style: BarStyle,
    phase: usize,
    active: bool,
    trapped: bool,
    /// Height from the most recent successful size query — the teardown
    /// fallback when the terminal stops answering.
    rows: u16,
}

impl Session {
    /// Claim the bottom row and paint an empty bar.
    ///
    /// Emits, in order: one newline (so shrinking the region doesn't
    /// visually swallow the line under the cursor), cursor save, scroll
    /// region excluding the last row, cursor restore, one cursor-up to
    /// keep a cursor that sat on the reserved row inside the region.
    ///
    /// With `trap_interrupt`, a SIGINT handler is installed first (and the
    /// one it replaces recorded): an interrupt at any point afterwards
    /// releases the row before the signal is re-delivered.
    ///
    /// # Errors
    ///
    /// [`Error::TerminalUnavailable`] when stdout cannot be trusted with
    /// scroll regions (not a TTY, dumb terminal, no geometry) — fall back
    /// to plain output. [`Error::AlreadyActive`] when a session is live in
    /// this process. [`Error::Io`] when the setup writes themselves fail.
    pub fn init(style: BarStyle, trap_interrupt: bool) -> Result<Self, Error> {
        let size = terminal::probe()?;
        if SESSION_LIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::AlreadyActive);
        }

        let mut session = Self {
            style,
            phase: style::INITIAL_PHASE,
            active: true,
            trapped: false,
            rows: size.rows,
        };

        if trap_interrupt {
            if let Err(e) = interrupt::install() {
                SESSION_LIVE.store(false, Ordering::SeqCst);
                return Err(Error::Io(e));
            }
            session.trapped = true;
            interrupt::HANDLER_ROWS.store(size.rows, Ordering::SeqCst);
        }

        {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            if let Err(e) = Self::claim(&mut lock, size.rows) {
                // A partially applied region corrupts everything printed
                // after it: put the terminal back, then report.
                session.release(&mut lock);
                return Err(Error::Io(e));
            }
        }

        session.draw(0)?;
        Ok(session)
    }

    /// Whether the session still owns the reserved row.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Current spinner phase. Advances by one on every draw, wrapping at
    /// the active spinner's period.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> usize {
        self.phase
    }

    /// Repaint the bar at `percentage` (clamped to 100).
    ///
    /// # Errors
    ///
    /// [`Error::NotActive`] after `destroy`. Write failures do not
    /// surface: once the row is claimed, a failed repaint must not take
    /// down the host program's actual work.
    pub fn draw(&mut self, percentage: u8) -> Result<(), Error> {
        self.draw_with(percentage, None, None)
    }

    /// [`draw`](Self::draw) with a one-off label and an optional pause.
    ///
    /// The label replaces the style's for this repaint only. The pause
    /// blocks the calling thread after the repaint — demo pacing, nothing
    /// more; real callers draw at whatever cadence their work produces.
    ///
    /// # Errors
    ///
    /// [`Error::NotActive`] after `destroy`.
    pub fn draw_with(
        &mut self,
        percentage: u8,
        label: Option<&str>,
        delay: Option<Duration>,
    ) -> Result<(), Error> {
        self.repaint(percentage, label, None)?;
        if let Some(pause) = delay {
            thread::sleep(pause);
        }
        Ok(())
    }

    /// Repaint in the fixed "waiting on user" color, whatever the
    /// percentage bucket or style would have chosen.
    ///
    /// # Errors
    ///
    /// [`Error::NotActive`] after `destroy`.
    pub fn draw_blocked(&mut self, percentage: u8, label: Option<&str>) -> Result<(), Error> {
        self.repaint(percentage, label, Some(BarColor::Yellow))
    }

    /// Release the reserved row and restore whole-screen scrolling.
    ///
    /// Safe to call any number of times; every call after the first is a
    /// no-op. Also runs on drop. Restores the previously installed SIGINT
    /// disposition when one was replaced at init.
    pub fn destroy(&mut self) {
        if !self.active {
            return;
        }
        // The terminal may have been resized since the last draw.
        if let Some(size) = terminal::get_size() {
            self.rows = size.rows;
        }
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.release(&mut lock);
    }

    // ── Internals ───────────────────────────────────────────────────

    /// The row-claim sequence.
    fn claim(w: &mut impl Write, rows: u16) -> io::Result<()> {
        w.write_all(b"\n")?;
        ansi::save_cursor(w)?;
        ansi::set_scroll_region(w, rows - 1)?;
        ansi::restore_cursor(w)?;
        ansi::cursor_up(w)?;
        w.flush()
    }

    /// Repaint the reserved row: guard, fresh geometry, best-effort
    /// paint, advance the animation.
    fn repaint(
        &mut self,
        percentage: u8,
        label: Option<&str>,
        tint_override: Option<BarColor>,
    ) -> Result<(), Error> {
        if !self.active {
            return Err(Error::NotActive);
        }

        // Re-queried on every repaint — the terminal can be resized
        // between any two calls.
        let size = terminal::get_size().unwrap_or(Size {
            cols: 80,
            rows: self.rows,
        });
        self.rows = size.rows;
        if self.trapped {
            interrupt::HANDLER_ROWS.store(size.rows, Ordering::SeqCst);
        }

        {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            // A failed repaint is dropped, not surfaced.
            let _ = self.paint_row(&mut lock, size, percentage, label, tint_override);
        }

        self.advance_phase();
        Ok(())
    }

    /// One frame: save cursor, move to the reserved row, wipe it, write
    /// the rendered bar, put the cursor back.
    fn paint_row(
        &self,
        w: &mut impl Write,
        size: Size,
        percentage: u8,
        label: Option<&str>,
        tint_override: Option<BarColor>,
    ) -> io::Result<()> {
        ansi::save_cursor(w)?;
        ansi::row_start(w, size.rows)?;
        ansi::clear_to_eol(w)?;
        render::render(
            w,
            &self.style,
            percentage,
            size.cols,
            self.phase,
            label,
            tint_override,
        )?;
        ansi::restore_cursor(w)?;
        w.flush()
    }

    /// Step the spinner, wrapping at the active set's period. Runs on
    /// every draw regardless of whether the percentage moved, so the bar
    /// visibly animates even while progress stalls.
    fn advance_phase(&mut self) {
        self.phase = (self.phase + 1) % self.style.spinner.period();
    }

    /// The teardown: emit the restore bytes (once), put the prior SIGINT
    /// disposition back, free the process slot. Idempotent via the
    /// `active` flag; all writes best-effort.
    fn release(&mut self, w: &mut impl Write) {
        if !self.active {
            return;
        }
        self.active = false;

        if self.trapped {
            // From here the handler has nothing left to clean up.
            interrupt::HANDLER_ROWS.store(0, Ordering::SeqCst);
        }

        let mut buf = [0u8; interrupt::TEARDOWN_BUF];
        let len = interrupt::teardown_sequence(&mut buf, self.rows);
        let _ = w.write_all(&buf[..len]);
        let _ = w.flush();

        if self.trapped {
            interrupt::uninstall();
            self.trapped = false;
        }
        SESSION_LIVE.store(false, Ordering::SeqCst);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.destroy();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// A session as if a 24-row, trap-less init had just succeeded,
    /// without touching the real terminal or the process-wide slot.
    fn live_session() -> Session {
        Session {
            style: BarStyle::default(),
            phase: style::INITIAL_PHASE,
            active: true,
            trapped: false,
            rows: 24,
        }
    }

    /// Deactivate without emitting, so the Drop impl of a still-active
    /// test session cannot write teardown bytes to the real stdout.
    fn disarm(session: &mut Session) {
        session.active = false;
    }

    fn teardown_bytes(rows: u16) -> Vec<u8> {
        let mut buf = [0u8; interrupt::TEARDOWN_BUF];
        let len = interrupt::teardown_sequence(&mut buf, rows);
        buf[..len].to_vec()
    }

    // ── Guards ────────────────────────────────────────────────────────

    #[test]
    fn draw_after_release_is_not_active() {
        let mut session = live_session();
        let mut sink: Vec<u8> = Vec::new();
        session.release(&mut sink);
        assert!(matches!(session.draw(50), Err(Error::NotActive)));
        assert!(matches!(
            session.draw_blocked(50, None),
            Err(Error::NotActive)
        ));
    }

    #[test]
    fn destroy_when_inactive_is_silent() {
        let mut session = live_session();
        let mut sink: Vec<u8> = Vec::new();
        session.release(&mut sink);
        // Public destroy on an already-released session touches nothing.
        session.destroy();
        assert!(!session.is_active());
    }

    // ── Claim / release sequences ─────────────────────────────────────

    #[test]
    fn claim_sequence_is_exact() {
        let mut sink = Vec::new();
        Session::claim(&mut sink, 24).unwrap();
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            "\n\x1b[s\x1b[0;23r\x1b[u\x1b[1A"
        );
    }

    #[test]
    fn release_emits_full_teardown() {
        let mut session = live_session();
        let mut sink: Vec<u8> = Vec::new();
        session.release(&mut sink);
        assert_eq!(sink, teardown_bytes(24));
        assert!(!session.is_active());
    }

    #[test]
    fn second_release_writes_nothing() {
        let mut session = live_session();
        let mut first: Vec<u8> = Vec::new();
        session.release(&mut first);
        let mut sink: Vec<u8> = Vec::new();
        session.release(&mut sink);
        assert!(sink.is_empty());
    }

    // ── Painting ──────────────────────────────────────────────────────

    #[test]
    fn paint_row_brackets_the_bar_with_cursor_moves() {
        let mut session = live_session();
        let size = Size { cols: 80, rows: 24 };
        let mut sink = Vec::new();
        session.paint_row(&mut sink, size, 0, None, None).unwrap();
        disarm(&mut session);
        let line = String::from_utf8(sink).unwrap();

        assert!(line.starts_with("\x1b[s\x1b[24;0f\x1b[K"));
        assert!(line.ends_with("\x1b[u"));
        assert!(line.contains(" [|] Progress   0% ["));
    }

    #[test]
    fn paint_row_targets_the_last_row_of_the_current_size() {
        let mut session = live_session();
        let size = Size { cols: 100, rows: 50 };
        let mut sink = Vec::new();
        session.paint_row(&mut sink, size, 10, None, None).unwrap();
        disarm(&mut session);
        assert!(String::from_utf8(sink).unwrap().contains("\x1b[50;0f"));
    }

    #[test]
    fn blocked_tint_reaches_the_renderer() {
        let mut session = live_session();
        let size = Size { cols: 80, rows: 24 };
        let mut sink = Vec::new();
        session
            .paint_row(&mut sink, size, 60, None, Some(BarColor::Yellow))
            .unwrap();
        disarm(&mut session);
        assert!(String::from_utf8(sink).unwrap().contains("\x1b[43m"));
    }

    // ── Spinner state machine ─────────────────────────────────────────

    #[test]
    fn phase_starts_one_step_in() {
        let mut session = live_session();
        assert_eq!(session.phase(), 1);
        disarm(&mut session);
    }

    #[test]
    fn phase_returns_after_a_full_period() {
        let mut session = live_session();
        let period = session.style.spinner.period();
        let start = session.phase();
        for _ in 0..period {
            session.advance_phase();
        }
        assert_eq!(session.phase(), start);
        disarm(&mut session);
    }

    #[test]
    fn consecutive_frames_show_different_glyphs() {
        let mut session = live_session();
        let size = Size { cols: 80, rows: 24 };

        let mut first = Vec::new();
        session.paint_row(&mut first, size, 40, None, None).unwrap();
        session.advance_phase();
        let mut second = Vec::new();
        session
            .paint_row(&mut second, size, 40, None, None)
            .unwrap();
        disarm(&mut session);

        assert_ne!(first, second);
        assert!(String::from_utf8(first).unwrap().contains("[|]"));
        assert!(String::from_utf8(second).unwrap().contains("[/]"));
    }
}
