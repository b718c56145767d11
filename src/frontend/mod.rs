//! Frontend abstraction layer
//!
//! This module defines the `Frontend` trait: the source of panel events and
//! the surface that displays the engine state. The terminal frontend is the
//! only implementation shipped; tests drive the control loop with scripted ones.

pub mod events;
pub mod tui;

use crate::core::AppCore;
use crate::data::{UiEvent, WidgetStore};
use anyhow::Result;
use std::time::Duration;

pub use events::FrontendEvent;
pub use tui::TuiFrontend;

/// UI Event Source
///
/// A frontend owns presentation and operator input. When the operator changes
/// a toggle, slider or the reset-enable checkbox, the frontend writes the new
/// value into the `WidgetStore` before raising the matching event, so the
/// store is always current when the event is encoded.
pub trait Frontend {
    /// Wait up to `timeout` for operator input and return at most one event.
    ///
    /// Returns `Ok(None)` when nothing happened. Input that produces several
    /// events (a keyboard press of a momentary button) queues the rest for
    /// later polls.
    fn poll_event(
        &mut self,
        widgets: &mut WidgetStore,
        timeout: Duration,
    ) -> Result<Option<UiEvent>>;

    /// Render the current application state
    ///
    /// Called once per loop iteration. Frontends may skip drawing when
    /// nothing changed since the last call.
    fn render(&mut self, core: &AppCore) -> Result<()>;

    /// Restore whatever the frontend took over (raw mode, alternate screen).
    ///
    /// Must be safe to call more than once.
    fn cleanup(&mut self) -> Result<()>;

    /// Get current terminal size as `(width, height)`
    fn size(&self) -> (u16, u16);
}
