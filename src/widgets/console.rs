use crate::core::rx_assembler::RxEvent;
use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// A completed line received from the device
#[derive(Debug, Clone)]
pub struct ConsoleLine {
    pub text: String,
    pub received_at: DateTime<Local>,
}

/// Console state (rendering-agnostic)
///
/// Holds the device echo: completed lines plus the line still being received.
/// Only completed lines are bounded; the open line grows until a terminator arrives.
pub struct ConsoleState {
    /// Completed lines, oldest first
    pub lines: VecDeque<ConsoleLine>,

    /// Maximum number of completed lines to keep
    pub max_lines: usize,

    /// Accumulator for the line being received
    pub(crate) current_line: String,

    /// Whether timestamps should be shown
    pub show_timestamps: bool,
}

impl ConsoleState {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines,
            current_line: String::new(),
            show_timestamps: false,
        }
    }

    pub fn apply(&mut self, event: RxEvent) {
        match event {
            RxEvent::Append(c) => self.push_char(c),
            RxEvent::LineComplete => self.finish_line(),
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.current_line.push(c);
    }

    /// Finish the current line and add it to the buffer
    pub fn finish_line(&mut self) {
        let text = std::mem::take(&mut self.current_line);
        self.lines.push_back(ConsoleLine {
            text,
            received_at: Local::now(),
        });

        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    /// The line still being received
    pub fn current_line(&self) -> &str {
        &self.current_line
    }

    /// Completed lines visible in a viewport of `height` rows, `scroll` rows up from the bottom
    pub fn visible_lines(&self, height: usize, scroll: usize) -> Vec<&ConsoleLine> {
        let total = self.lines.len();
        let end = total.saturating_sub(scroll);
        let start = end.saturating_sub(height);
        self.lines.range(start..end).collect()
    }
}
