//! In-memory console used by tests and non-interactive callers

use std::io;

use super::{InputSource, OutputSink};

/// One operation recorded by [`CaptureSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Line(String),
    Redraw(String),
    Clear,
}

/// Output sink that records every operation.
#[derive(Debug, Default)]
pub struct CaptureSink {
    frames: Vec<Frame>,
    flushes: usize,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Text of every `write_line` call, in order.
    pub fn lines(&self) -> Vec<String> {
        self.frames
            .iter()
            .filter_map(|f| match f {
                Frame::Line(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Text of every in-place redraw, in order.
    pub fn redraws(&self) -> Vec<String> {
        self.frames
            .iter()
            .filter_map(|f| match f {
                Frame::Redraw(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clears(&self) -> usize {
        self.frames.iter().filter(|f| **f == Frame::Clear).count()
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl OutputSink for CaptureSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.frames.push(Frame::Line(line.to_string()));
        Ok(())
    }

    fn redraw_line(&mut self, line: &str) -> io::Result<()> {
        self.frames.push(Frame::Redraw(line.to_string()));
        Ok(())
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.frames.push(Frame::Clear);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Input that requests cancellation after a fixed number of polls.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    cancel_after: Option<usize>,
    polls: usize,
}

impl ScriptedInput {
    /// Never requests cancellation.
    pub fn never() -> Self {
        Self {
            cancel_after: None,
            polls: 0,
        }
    }

    /// Returns true from the `polls`-th poll onwards (1-based); 0 cancels immediately.
    pub fn cancel_after(polls: usize) -> Self {
        Self {
            cancel_after: Some(polls),
            polls: 0,
        }
    }

    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl InputSource for ScriptedInput {
    fn poll_cancel(&mut self) -> io::Result<bool> {
        self.polls += 1;
        Ok(matches!(self.cancel_after, Some(limit) if self.polls >= limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_in_order() {
        let mut sink = CaptureSink::new();
        sink.clear_screen().unwrap();
        sink.write_line("header").unwrap();
        sink.redraw_line("bar").unwrap();
        sink.flush().unwrap();

        assert_eq!(
            sink.frames(),
            &[
                Frame::Clear,
                Frame::Line("header".into()),
                Frame::Redraw("bar".into())
            ]
        );
        assert_eq!(sink.flushes(), 1);
    }

    #[test]
    fn test_scripted_input() {
        let mut input = ScriptedInput::cancel_after(3);
        assert!(!input.poll_cancel().unwrap());
        assert!(!input.poll_cancel().unwrap());
        assert!(input.poll_cancel().unwrap());
        assert_eq!(input.polls(), 3);

        let mut never = ScriptedInput::never();
        assert!((0..100).all(|_| !never.poll_cancel().unwrap()));
    }
}
