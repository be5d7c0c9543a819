// SPDX-License-Identifier: MIT
//
// Error taxonomy for the bar session.
//
// Setup failures are fatal and surface immediately: a half-applied scroll
// region silently corrupts everything printed afterwards, so a caller that
// sees `TerminalUnavailable` should fall back to plain output. After a
// session is live, repaint failures do not appear here at all — they are
// swallowed inside the session so a redraw hiccup cannot take down the
// host program's real work.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Stdout is not a terminal whose type and geometry can be trusted
    /// with scroll-region manipulation.
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(&'static str),

    /// A draw was requested without an active session.
    #[error("no progress session is active")]
    NotActive,

    /// A second session was initialized while one is live in this process.
    #[error("a progress session is already active in this process")]
    AlreadyActive,

    /// A terminal write failed during session setup.
    #[error("terminal write failed: {0}")]
    Io(#[from] io::Error),
}
