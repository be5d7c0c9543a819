// SPDX-License-Identifier: MIT
//
// SIGINT plumbing — install, restore, and the emergency teardown path.
//
// Safety: This module necessarily uses `unsafe` for sigaction, raise, and
// raw writes to fd 1 from inside a signal handler. These are the standard
// POSIX interfaces for the job — there is no safe alternative. Each unsafe
// block is minimal and documented.
#![allow(unsafe_code)]
//
// The handler can fire between any two terminal writes the session makes,
// so it assumes nothing about in-flight state: it writes the complete
// teardown sequence in one raw write(), at most once, then puts the
// previously installed SIGINT disposition back and re-raises. The process
// dies (or the host's own handler runs) exactly as it would have — cleanup
// never swallows the interrupt.
//
// Everything on the handler path is async-signal-safe: one atomic swap,
// byte formatting into a stack buffer, one write(2). No allocation, no
// locks, no Rust stdout lock that the interrupted code might be holding.

use std::sync::atomic::AtomicU16;
#[cfg(unix)]
use std::sync::atomic::Ordering;

/// Terminal height recorded for the handler; 0 means nothing to clean up.
///
/// The session stores the current height here on every repaint while
/// trapping is enabled, and zeroes it the moment its own teardown starts —
/// whichever path gets the swap in first emits the restore bytes, the
/// other does nothing.
pub(crate) static HANDLER_ROWS: AtomicU16 = AtomicU16::new(0);

// ─── Teardown Bytes ──────────────────────────────────────────────────────────

/// Stack buffer size for [`teardown_sequence`]. The sequence peaks at 41
/// bytes with five-digit row counts.
pub(crate) const TEARDOWN_BUF: usize = 64;

/// Format the complete teardown sequence for a terminal `rows` tall:
/// re-expand the scroll region to full height, clear the reserved row,
/// and scroll twice so regrowing the region causes no visual jump.
///
/// This is the single source of those bytes — the session's normal
/// `destroy` and the signal handler both emit exactly this, so the two
/// paths cannot drift apart. Formatting is manual because the handler
/// must not allocate.
pub(crate) fn teardown_sequence(buf: &mut [u8; TEARDOWN_BUF], rows: u16) -> usize {
    let mut len = 0;
    push(buf, &mut len, b"\x1b[s\x1b[0;");
    push_decimal(buf, &mut len, rows);
    push(buf, &mut len, b"r\x1b[u\x1b[1A\x1b[s\x1b[");
    push_decimal(buf, &mut len, rows);
    push(buf, &mut len, b";0f\x1b[K\x1b[u\n\n");
    len
}

fn push(buf: &mut [u8; TEARDOWN_BUF], len: &mut usize, bytes: &[u8]) {
    buf[*len..*len + bytes.len()].copy_from_slice(bytes);
    *len += bytes.len();
}

fn push_decimal(buf: &mut [u8; TEARDOWN_BUF], len: &mut usize, value: u16) {
    let mut digits = [0u8; 5];
    let mut n = 0;
    let mut rest = value;
    loop {
        digits[n] = b'0' + (rest % 10) as u8;
        rest /= 10;
        n += 1;
        if rest == 0 {
            break;
        }
    }
    while n > 0 {
        n -= 1;
        buf[*len] = digits[n];
        *len += 1;
    }
}

// ─── Saved Disposition ───────────────────────────────────────────────────────

/// The SIGINT action that was installed before ours.
///
/// Written only from `install`/`uninstall` while our handler is not (yet /
/// no longer) the installed one, and taken by the handler itself. The
/// session is single-threaded and the handler runs on that same thread,
/// so these never race — documented contract, not luck.
#[cfg(unix)]
struct SavedAction(std::cell::UnsafeCell<Option<libc::sigaction>>);

#[cfg(unix)]
unsafe impl Sync for SavedAction {}

#[cfg(unix)]
static SAVED_ACTION: SavedAction = SavedAction(std::cell::UnsafeCell::new(None));

// ─── Install / Uninstall ─────────────────────────────────────────────────────

/// Install the cleanup handler for SIGINT, recording the action it
/// replaces so [`uninstall`] (or the handler itself) can put it back.
/// Nested and outer sessions compose through that restoration.
///
/// # Errors
///
/// Returns the OS error if `sigaction` fails.
#[cfg(unix)]
pub(crate) fn install() -> std::io::Result<()> {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = interrupt_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);

        let mut prev: libc::sigaction = std::mem::zeroed();
        if libc::sigaction(libc::SIGINT, &raw const sa, &raw mut prev) != 0 {
            return Err(std::io::Error::last_os_error());
        }
        *SAVED_ACTION.0.get() = Some(prev);
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn install() -> std::io::Result<()> {
    Ok(())
}

/// Put the previously recorded SIGINT action back. Best-effort; a no-op
/// when nothing is recorded (the handler may already have consumed it).
#[cfg(unix)]
pub(crate) fn uninstall() {
    unsafe {
        if let Some(prev) = (*SAVED_ACTION.0.get()).take() {
            let _ = libc::sigaction(libc::SIGINT, &raw const prev, std::ptr::null_mut());
        }
    }
}

#[cfg(not(unix))]
pub(crate) fn uninstall() {}

// ─── The Handler ─────────────────────────────────────────────────────────────

/// Write the teardown sequence straight to `fd`, at most once per session.
///
/// The swap on [`HANDLER_ROWS`] is what makes this exactly-once: a second
/// call — or a call racing the session's own teardown — sees 0 and leaves
/// the terminal alone.
#[cfg(unix)]
pub(crate) fn emergency_restore(fd: libc::c_int) {
    let rows = HANDLER_ROWS.swap(0, Ordering::SeqCst);
    if rows == 0 {
        return;
    }
    let mut buf = [0u8; TEARDOWN_BUF];
    let len = teardown_sequence(&mut buf, rows);
    unsafe {
        let _ = libc::write(fd, buf.as_ptr().cast::<libc::c_void>(), len);
    }
}

#[cfg(unix)]
extern "C" fn interrupt_handler(sig: libc::c_int) {
    emergency_restore(libc::STDOUT_FILENO);
    unsafe {
        // Re-deliver under the disposition that was there before us, so
        // the interrupt lands exactly as it would have without the bar.
        match (*SAVED_ACTION.0.get()).take() {
            Some(prev) => {
                let _ = libc::sigaction(libc::SIGINT, &raw const prev, std::ptr::null_mut());
            }
            None => {
                libc::signal(libc::SIGINT, libc::SIG_DFL);
            }
        }
        let _ = libc::raise(sig);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
