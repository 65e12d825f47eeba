//! crossterm-backed terminal sink and keyboard input

use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use std::io::{self, IsTerminal, Stdout, Write};
use std::time::Duration;
use tracing::debug;

use super::{InputSource, OutputSink};

/// Terminal output on stdout.
///
/// Lines end in `\r\n` so output stays aligned while raw mode is active.
pub struct TerminalSink {
    out: Stdout,
}

impl TerminalSink {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl OutputSink for TerminalSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        queue!(self.out, Print(line), Print("\r\n"))
    }

    fn redraw_line(&mut self, line: &str) -> io::Result<()> {
        queue!(
            self.out,
            Print("\r"),
            Clear(ClearType::UntilNewLine),
            Print(line)
        )
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Restores cooked mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            debug!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// Keyboard cancellation: the configured key, `Esc` or `Ctrl+C`.
///
/// Holds the terminal in raw mode for its lifetime so single key presses are
/// seen without Enter. When stdin is not a terminal nothing is ever read and
/// cancellation never fires.
pub struct KeyboardInput {
    cancel_key: char,
    raw: Option<RawModeGuard>,
}

impl KeyboardInput {
    pub fn new(cancel_key: char) -> io::Result<Self> {
        let raw = if io::stdin().is_terminal() {
            Some(RawModeGuard::enable()?)
        } else {
            debug!("stdin is not a terminal, keyboard cancellation disabled");
            None
        };
        Ok(Self {
            cancel_key: cancel_key.to_ascii_lowercase(),
            raw,
        })
    }

    fn is_cancel(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Esc => true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Char(c) => c.to_ascii_lowercase() == self.cancel_key,
            _ => false,
        }
    }
}

impl InputSource for KeyboardInput {
    fn poll_cancel(&mut self) -> io::Result<bool> {
        if self.raw.is_none() {
            return Ok(false);
        }
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && self.is_cancel(key.code, key.modifiers) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
