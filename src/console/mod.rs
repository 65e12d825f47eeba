//! Console I/O seams
//!
//! Screens never touch stdout or the keyboard directly. They write through an
//! [`OutputSink`] and ask an [`InputSource`] whether the operator wants out,
//! so every screen runs unchanged against a real terminal or an in-memory
//! capture.

use std::io::{self, BufRead};

pub mod capture;
pub mod terminal;

pub use capture::{CaptureSink, Frame, ScriptedInput};
pub use terminal::{KeyboardInput, TerminalSink};

/// Where rendered text goes.
pub trait OutputSink {
    /// Write a full line.
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Overwrite the current line in place (carriage-return redraw).
    fn redraw_line(&mut self, line: &str) -> io::Result<()>;

    /// Clear the screen and home the cursor before a full redraw.
    fn clear_screen(&mut self) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// Non-blocking cancellation check.
pub trait InputSource {
    /// Returns true once the operator has asked to stop. Must not block.
    fn poll_cancel(&mut self) -> io::Result<bool>;
}

/// Blocking line input for prompts such as kill confirmation.
pub trait LineReader {
    /// Next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

impl<R: BufRead> LineReader for R {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Print `question`, read one answer and return true for `y`/`yes`.
pub fn confirm(
    out: &mut dyn OutputSink,
    input: &mut dyn LineReader,
    question: &str,
) -> io::Result<bool> {
    out.write_line(&format!("{} (Y/N): ", question))?;
    out.flush()?;
    let answer = input.next_line()?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_uppercase().as_str(), "Y" | "YES"))
}
