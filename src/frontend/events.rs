//! Frontend-agnostic input events.
//!
//! The terminal frontend translates its native crossterm event stream into
//! this enum so the input router only handles one event shape.

use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};

/// Raw operator input, before it is resolved against the panel
#[derive(Debug, Clone, PartialEq)]
pub enum FrontendEvent {
    /// Keyboard input. `kind` is only ever `Release` on terminals that
    /// report key releases.
    Key {
        code: KeyCode,
        modifiers: KeyModifiers,
        kind: KeyEventKind,
    },
    /// Mouse input
    Mouse {
        kind: MouseEventKind,
        x: u16,
        y: u16,
        modifiers: KeyModifiers,
    },
    /// Terminal resize
    Resize { width: u16, height: u16 },
    /// Paste event (text from clipboard)
    Paste { text: String },
}

impl FrontendEvent {
    /// Create a mouse event
    pub fn mouse(kind: MouseEventKind, x: u16, y: u16, modifiers: KeyModifiers) -> Self {
        Self::Mouse {
            kind,
            x,
            y,
            modifiers,
        }
    }

    /// Create a resize event
    pub fn resize(width: u16, height: u16) -> Self {
        Self::Resize { width, height }
    }

    /// Create a paste event
    pub fn paste(text: String) -> Self {
        Self::Paste { text }
    }
}

#[cfg(test)]
impl FrontendEvent {
    pub fn key(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::Key {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }

    pub fn key_release(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::Key {
            code,
            modifiers,
            kind: KeyEventKind::Release,
        }
    }
}
