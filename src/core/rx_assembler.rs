//! Inbound byte handling
//!
//! The device echoes characters one at a time and ends each line with a
//! carriage return. Bytes are interpreted as single-byte characters; there is
//! no buffering limit.

/// Line terminator sent by the device
pub const LINE_TERMINATOR: u8 = b'\r';

/// What the display should do with one inbound byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxEvent {
    /// Append this character to the open display line
    Append(char),
    /// Close the open display line
    LineComplete,
}

#[derive(Debug, Default)]
pub struct RxLineAssembler {
    bytes_seen: u64,
    lines_completed: u64,
}

impl RxLineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, byte: u8) -> RxEvent {
        self.bytes_seen += 1;
        if byte == LINE_TERMINATOR {
            self.lines_completed += 1;
            RxEvent::LineComplete
        } else {
            RxEvent::Append(char::from(byte))
        }
    }

    pub fn bytes_seen(&self) -> u64 {
        self.bytes_seen
    }

    pub fn lines_completed(&self) -> u64 {
        self.lines_completed
    }
}
