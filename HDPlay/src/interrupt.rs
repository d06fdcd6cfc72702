//! Enter-to-stop pauses between autoplayed sets

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use hdialogue::playback::Interrupt;

/// Waits for Enter (or Ctrl-C) on the terminal while autoplay pauses.
#[derive(Debug, Default)]
pub struct KeyInterrupt;

impl Interrupt for KeyInterrupt {
    fn wait(&mut self, timeout: Duration) -> bool {
        if let Err(e) = show_prompt(&mut io::stdout(), timeout) {
            tracing::warn!("Failed to show autoplay prompt: {}", e);
        }

        let stopped = match wait_for_enter(timeout) {
            Ok(stopped) => stopped,
            Err(e) => {
                tracing::warn!("Key polling unavailable, pausing instead: {}", e);
                std::thread::sleep(timeout);
                false
            }
        };
        println!();
        println!();
        stopped
    }
}

fn show_prompt(out: &mut impl Write, timeout: Duration) -> io::Result<()> {
    write!(
        out,
        "Hit Enter within {} seconds to stop autoplay...",
        timeout.as_secs_f64()
    )?;
    out.flush()
}

fn wait_for_enter(timeout: Duration) -> io::Result<bool> {
    terminal::enable_raw_mode()?;
    let result = poll_for_enter(timeout);
    terminal::disable_raw_mode()?;
    result
}

fn poll_for_enter(timeout: Duration) -> io::Result<bool> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }
        if !event::poll(remaining)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if key.code == KeyCode::Enter || ctrl_c {
                return Ok(true);
            }
        }
    }
}
