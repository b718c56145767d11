//! Typed panel events raised by the UI adapter layer.

use super::widget::WidgetId;

/// One operator action on the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ButtonDown(WidgetId),
    ButtonUp(WidgetId),
    ToggleChanged(WidgetId, bool),
    /// Slider moved. The payload is informational: the encoder reads the
    /// store so the frame always carries the latest position.
    SliderChanged(WidgetId, i32),
    TextSubmitted(String),
    ResetRequested,
    /// Exit button on the panel
    ExitRequested,
    WindowClosed,
}

impl UiEvent {
    /// True for events that end the session
    pub fn is_close(&self) -> bool {
        matches!(self, UiEvent::WindowClosed | UiEvent::ExitRequested)
    }
}
