// SPDX-License-Identifier: MIT
//
// pinbar demo — scrolling output above a live pinned bar.
//
// Floods the screen with build-log chatter while the bar holds the bottom
// row: a fast ramp to 50%, then a slower climb to 100%. Ctrl-C anywhere in
// the run and the scroll region is restored before the process dies —
// that is the whole point.
//
// Usage:
//   cargo run --example demo             # classic: solid green, dot filler
//   cargo run --example demo -- ramp     # graduated red→green color ramp
//   cargo run --example demo -- dynamic  # spinner sweeps the unfilled run
//   cargo run --example demo -- braille  # three-glyph spinner window
//   cargo run --example demo -- blocked  # pause mid-run in the wait color

use std::time::Duration;

use pinbar::session::Session;
use pinbar::style::{BarStyle, Spinner, StyleFlags};

/// Stand-in for a real program's output stream.
const CHATTER: [&str; 12] = [
    "checking cached artifacts",
    "resolving dependency graph",
    "compiling unit 14 of 96",
    "linking objects (cold cache)",
    "running preflight checks",
    "uploading chunk to mirror",
    "verifying checksums",
    "pruning stale build outputs",
    "warming query planner",
    "applying migration 0042",
    "indexing symbol table",
    "syncing remote refs",
];

const STEPS: u32 = 500;

#[allow(clippy::cast_possible_truncation)] // percentages stay in 0..=100.
fn main() -> Result<(), pinbar::error::Error> {
    let mode = std::env::args().nth(1).unwrap_or_default();
    let mut style = BarStyle::default();
    match mode.as_str() {
        "" | "blocked" => {}
        "ramp" => style.flags |= StyleFlags::COLOR_RAMP,
        "dynamic" => style.flags |= StyleFlags::DYNAMIC_FILL,
        "braille" => style.spinner = Spinner::Braille,
        "arrows" => style.spinner = Spinner::Arrows,
        "frame" => style.flags |= StyleFlags::FRAME_ONLY,
        other => {
            eprintln!("unknown mode: {other}");
            std::process::exit(2);
        }
    }

    let mut bar = Session::init(style, true)?;

    // First half: fast.
    for step in 0..STEPS {
        println!("{}", CHATTER[step as usize % CHATTER.len()]);
        let pct = (step * 50 / STEPS) as u8;
        bar.draw_with(pct, None, Some(Duration::from_millis(2)))?;
    }

    if mode == "blocked" {
        bar.draw_blocked(50, Some("confirm?"))?;
        std::thread::sleep(Duration::from_secs(2));
    }

    // Second half: slower, like real work always is.
    for step in 0..STEPS {
        println!("{}", CHATTER[(step as usize * 7 + 3) % CHATTER.len()]);
        let pct = (50 + step * 50 / STEPS) as u8;
        bar.draw_with(pct, None, Some(Duration::from_millis(10)))?;
    }

    bar.draw(100)?;
    bar.destroy();
    Ok(())
}
