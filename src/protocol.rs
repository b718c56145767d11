//! Device wire protocol
//!
//! Every outbound unit is either a short ASCII frame terminated by `\r` or a
//! break condition on the transmit line. Frames carry no checksum and get no
//! acknowledgment; the device firmware parses them by leading class character:
//!
//! | Class          | Frame                      | Example     |
//! |----------------|----------------------------|-------------|
//! | Button press   | `b` + 2-digit id + `1`     | `b011\r`    |
//! | Button release | `b` + 2-digit id + `0`     | `b010\r`    |
//! | Toggle         | `t` + 2-digit id + `1`/`0` | `t021\r`    |
//! | Slider         | `s` + 1-digit id + ` ` + value | `s1 45000\r` |
//! | Free text      | `$` + text                 | `$p 10\r`   |

use crate::data::{UiEvent, WidgetClass, WidgetId, WidgetStore};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Frame terminator expected by the firmware
pub const TERMINATOR: char = '\r';

/// A single `\r`-terminated outbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(String);

impl Frame {
    fn terminated(mut body: String) -> Self {
        body.push(TERMINATOR);
        Frame(body)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Frame {
    /// Escaped form for logs and the status bar
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().escape_debug())
    }
}

/// Something the link must do on behalf of the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    Send(Frame),
    /// Hold the transmit line in break for this long (hardware reset)
    Break(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("{class} id {id} does not fit the wire format (max {max})")]
    IdOutOfRange {
        class: WidgetClass,
        id: WidgetId,
        max: WidgetId,
    },
    #[error("slider {0} is not on the panel")]
    UnknownSlider(WidgetId),
}

fn check_id(class: WidgetClass, id: WidgetId) -> Result<(), ProtocolError> {
    if class.accepts(id) {
        Ok(())
    } else {
        Err(ProtocolError::IdOutOfRange {
            class,
            id,
            max: class.max_id(),
        })
    }
}

fn bool_digit(value: bool) -> char {
    if value {
        '1'
    } else {
        '0'
    }
}

pub fn button_frame(id: WidgetId, pressed: bool) -> Result<Frame, ProtocolError> {
    check_id(WidgetClass::Button, id)?;
    Ok(Frame::terminated(format!("b{:02}{}", id, bool_digit(pressed))))
}

pub fn toggle_frame(id: WidgetId, on: bool) -> Result<Frame, ProtocolError> {
    check_id(WidgetClass::Toggle, id)?;
    Ok(Frame::terminated(format!("t{:02}{}", id, bool_digit(on))))
}

/// Slider frames keep the firmware's layout: one id digit, one space, unpadded value.
pub fn slider_frame(id: WidgetId, value: i32) -> Result<Frame, ProtocolError> {
    check_id(WidgetClass::Slider, id)?;
    Ok(Frame::terminated(format!("s{} {}", id, value)))
}

/// Free text is sent verbatim after the `$` marker, no escaping.
pub fn text_frame(text: &str) -> Frame {
    Frame::terminated(format!("${}", text))
}

/// Translate one panel event into at most one frame.
///
/// Slider frames read the store rather than the event payload so a burst of
/// drag events always reports the latest position. Reset and close events
/// never produce a frame.
pub fn encode(event: &UiEvent, widgets: &WidgetStore) -> Result<Option<Frame>, ProtocolError> {
    let frame = match event {
        UiEvent::ButtonDown(id) => button_frame(*id, true)?,
        UiEvent::ButtonUp(id) => button_frame(*id, false)?,
        UiEvent::ToggleChanged(id, on) => toggle_frame(*id, *on)?,
        UiEvent::SliderChanged(id, _) => {
            check_id(WidgetClass::Slider, *id)?;
            let value = widgets
                .slider_value(*id)
                .ok_or(ProtocolError::UnknownSlider(*id))?;
            slider_frame(*id, value)?
        }
        UiEvent::TextSubmitted(text) => text_frame(text),
        UiEvent::ResetRequested | UiEvent::ExitRequested | UiEvent::WindowClosed => {
            return Ok(None)
        }
    };
    Ok(Some(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::SliderState;

    fn store_with_slider(id: WidgetId, value: i32) -> WidgetStore {
        let mut store = WidgetStore::new();
        store.insert_slider(id, SliderState::new(0, 90000, value, 1));
        store
    }

    #[test]
    fn test_button_frames_for_every_id() {
        for id in 0..=99u8 {
            assert_eq!(
                button_frame(id, true).unwrap().as_str(),
                format!("b{:02}1\r", id)
            );
            assert_eq!(
                button_frame(id, false).unwrap().as_str(),
                format!("b{:02}0\r", id)
            );
        }
    }

    #[test]
    fn test_toggle_frames() {
        let store = WidgetStore::new();
        let on = encode(&UiEvent::ToggleChanged(2, true), &store).unwrap();
        let off = encode(&UiEvent::ToggleChanged(2, false), &store).unwrap();
        assert_eq!(on.unwrap().as_str(), "t021\r");
        assert_eq!(off.unwrap().as_str(), "t020\r");
    }

    #[test]
    fn test_slider_uses_current_value() {
        let mut store = store_with_slider(1, 45000);
        let frame = encode(&UiEvent::SliderChanged(1, 45000), &store).unwrap();
        assert_eq!(frame.unwrap().as_str(), "s1 45000\r");

        // The widget moved again before this event was encoded
        store.slider_mut(1).unwrap().set_value(47250);
        let frame = encode(&UiEvent::SliderChanged(1, 45000), &store).unwrap();
        assert_eq!(frame.unwrap().as_str(), "s1 47250\r");
    }

    #[test]
    fn test_text_is_verbatim() {
        let store = WidgetStore::new();
        let frame = encode(&UiEvent::TextSubmitted("p 1$0".to_string()), &store).unwrap();
        assert_eq!(frame.unwrap().as_str(), "$p 1$0\r");

        assert_eq!(text_frame("").as_str(), "$\r");
    }

    #[test]
    fn test_no_frame_events() {
        let store = WidgetStore::new();
        assert_eq!(encode(&UiEvent::ResetRequested, &store), Ok(None));
        assert_eq!(encode(&UiEvent::WindowClosed, &store), Ok(None));
        assert_eq!(encode(&UiEvent::ExitRequested, &store), Ok(None));
    }

    #[test]
    fn test_out_of_range_ids() {
        let store = store_with_slider(1, 0);
        assert!(matches!(
            encode(&UiEvent::ButtonDown(100), &store),
            Err(ProtocolError::IdOutOfRange { id: 100, max: 99, .. })
        ));
        assert!(matches!(
            encode(&UiEvent::SliderChanged(12, 5), &store),
            Err(ProtocolError::IdOutOfRange { id: 12, max: 9, .. })
        ));
        assert_eq!(
            encode(&UiEvent::SliderChanged(3, 5), &store),
            Err(ProtocolError::UnknownSlider(3))
        );
    }

    #[test]
    fn test_display_is_escaped() {
        let frame = button_frame(1, true).unwrap();
        assert_eq!(frame.to_string(), "b011\\r");
        assert_eq!(frame.as_bytes().len(), 5);
    }
}
