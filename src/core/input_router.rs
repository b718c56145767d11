//! Input routing for the panel
//!
//! Resolves raw key and mouse input against the focused or clicked panel item
//! and produces at most one `UiEvent` per input. Value changes (toggles,
//! sliders, reset-enable) are written into the `WidgetStore` here, before the
//! event leaves, so the encoder always reads the current value.

use crate::data::{PanelItem, UiEvent, UiState, WidgetId, WidgetStore};
use crate::frontend::FrontendEvent;
use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use std::collections::VecDeque;
use tracing::info;

/// Console rows moved per wheel notch
const WHEEL_SCROLL_LINES: usize = 3;
/// Console rows moved per Shift+PageUp/PageDown
const PAGE_SCROLL_LINES: usize = 10;
/// Slider steps per PageUp/PageDown
const PAGE_STEPS: i32 = 10;

#[derive(Debug, Default)]
pub struct InputRouter {
    pending: VecDeque<UiEvent>,
    /// Terminal delivers key release events (keyboard enhancement active)
    key_release_reported: bool,
}

impl InputRouter {
    pub fn new(key_release_reported: bool) -> Self {
        Self {
            pending: VecDeque::new(),
            key_release_reported,
        }
    }

    /// Next event queued by an earlier input
    pub fn next_pending(&mut self) -> Option<UiEvent> {
        self.pending.pop_front()
    }

    pub fn route(
        &mut self,
        event: &FrontendEvent,
        ui: &mut UiState,
        widgets: &mut WidgetStore,
    ) -> Option<UiEvent> {
        match event {
            FrontendEvent::Key {
                code,
                modifiers,
                kind,
            } => match kind {
                KeyEventKind::Release => self.route_key_release(*code, ui),
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    self.route_key(*code, *modifiers, *kind, ui, widgets)
                }
            },
            FrontendEvent::Mouse { kind, x, y, .. } => self.route_mouse(*kind, *x, *y, ui, widgets),
            FrontendEvent::Paste { text } => {
                ui.focus_item(PanelItem::TextInput);
                ui.text_input.insert_str(text);
                None
            }
            FrontendEvent::Resize { .. } => None,
        }
    }

    fn route_key_release(&mut self, code: KeyCode, ui: &mut UiState) -> Option<UiEvent> {
        if !is_activate(code) {
            return None;
        }
        ui.key_grab.take().map(UiEvent::ButtonUp)
    }

    fn route_key(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        kind: KeyEventKind,
        ui: &mut UiState,
        widgets: &mut WidgetStore,
    ) -> Option<UiEvent> {
        if modifiers.contains(KeyModifiers::CONTROL)
            && matches!(code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            return Some(UiEvent::WindowClosed);
        }

        match code {
            KeyCode::Tab => {
                ui.focus_next();
                return None;
            }
            KeyCode::BackTab => {
                ui.focus_prev();
                return None;
            }
            KeyCode::PageUp if modifiers.contains(KeyModifiers::SHIFT) => {
                ui.scroll_console_up(PAGE_SCROLL_LINES);
                return None;
            }
            KeyCode::PageDown if modifiers.contains(KeyModifiers::SHIFT) => {
                ui.scroll_console_down(PAGE_SCROLL_LINES);
                return None;
            }
            _ => {}
        }

        match ui.focused_item()? {
            PanelItem::Button(id) => {
                // Auto-repeat while the key is held must not re-press
                if kind == KeyEventKind::Repeat || !is_activate(code) {
                    return None;
                }
                self.press_button_from_keyboard(id, ui)
            }
            PanelItem::Toggle(id) if is_activate(code) => {
                widgets.flip_toggle(id).map(|on| UiEvent::ToggleChanged(id, on))
            }
            PanelItem::Slider(id) => route_slider_key(id, code, widgets),
            PanelItem::TextInput => route_text_key(code, modifiers, ui),
            PanelItem::ResetEnable if is_activate(code) => {
                let enabled = widgets.flip_reset_enable();
                info!("Reset {}", if enabled { "enabled" } else { "disabled" });
                None
            }
            PanelItem::Reset if is_activate(code) => Some(UiEvent::ResetRequested),
            PanelItem::Exit if is_activate(code) => Some(UiEvent::ExitRequested),
            _ => None,
        }
    }

    fn press_button_from_keyboard(&mut self, id: WidgetId, ui: &mut UiState) -> Option<UiEvent> {
        // The mouse already holds a button; its release belongs to the mouse
        if ui.pointer_grab.is_some() {
            return None;
        }
        if self.key_release_reported {
            if ui.key_grab.is_some() {
                return None;
            }
            ui.key_grab = Some(id);
        } else {
            // No release will ever arrive, so the press is momentary
            self.pending.push_back(UiEvent::ButtonUp(id));
        }
        Some(UiEvent::ButtonDown(id))
    }

    fn route_mouse(
        &mut self,
        kind: MouseEventKind,
        x: u16,
        y: u16,
        ui: &mut UiState,
        widgets: &mut WidgetStore,
    ) -> Option<UiEvent> {
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let item = ui.item_at(x, y)?;
                ui.focus_item(item);
                match item {
                    PanelItem::Button(_) if ui.key_grab.is_some() => None,
                    PanelItem::Button(id) => {
                        ui.pointer_grab = Some(id);
                        Some(UiEvent::ButtonDown(id))
                    }
                    PanelItem::Toggle(id) => {
                        widgets.flip_toggle(id).map(|on| UiEvent::ToggleChanged(id, on))
                    }
                    PanelItem::Slider(id) => {
                        ui.slider_drag = Some(id);
                        drag_slider(id, x, ui, widgets)
                    }
                    PanelItem::TextInput => None,
                    PanelItem::ResetEnable => {
                        let enabled = widgets.flip_reset_enable();
                        info!("Reset {}", if enabled { "enabled" } else { "disabled" });
                        None
                    }
                    PanelItem::Reset => Some(UiEvent::ResetRequested),
                    PanelItem::Exit => Some(UiEvent::ExitRequested),
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let id = ui.slider_drag?;
                drag_slider(id, x, ui, widgets)
            }
            MouseEventKind::Up(MouseButton::Left) => {
                ui.slider_drag = None;
                // Released wherever the pointer ended up
                ui.pointer_grab.take().map(UiEvent::ButtonUp)
            }
            MouseEventKind::ScrollUp => {
                ui.scroll_console_up(WHEEL_SCROLL_LINES);
                None
            }
            MouseEventKind::ScrollDown => {
                ui.scroll_console_down(WHEEL_SCROLL_LINES);
                None
            }
            _ => None,
        }
    }
}

fn is_activate(code: KeyCode) -> bool {
    matches!(code, KeyCode::Char(' ') | KeyCode::Enter)
}

fn route_slider_key(id: WidgetId, code: KeyCode, widgets: &mut WidgetStore) -> Option<UiEvent> {
    let slider = widgets.slider_mut(id)?;
    let (min, max) = (slider.min, slider.max);
    let changed = match code {
        KeyCode::Left | KeyCode::Down => slider.nudge(-1),
        KeyCode::Right | KeyCode::Up => slider.nudge(1),
        KeyCode::PageDown => slider.nudge(-PAGE_STEPS),
        KeyCode::PageUp => slider.nudge(PAGE_STEPS),
        KeyCode::Home => slider.set_value(min),
        KeyCode::End => slider.set_value(max),
        _ => false,
    };
    changed.then(|| UiEvent::SliderChanged(id, slider.value))
}

fn drag_slider(
    id: WidgetId,
    x: u16,
    ui: &UiState,
    widgets: &mut WidgetStore,
) -> Option<UiEvent> {
    let fraction = ui.region_of(PanelItem::Slider(id))?.fraction_at(x);
    let slider = widgets.slider_mut(id)?;
    slider
        .set_fraction(fraction)
        .then(|| UiEvent::SliderChanged(id, slider.value))
}

fn route_text_key(code: KeyCode, modifiers: KeyModifiers, ui: &mut UiState) -> Option<UiEvent> {
    let input = &mut ui.text_input;
    match code {
        KeyCode::Enter => return Some(UiEvent::TextSubmitted(input.submit())),
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => input.insert_char(c),
        KeyCode::Backspace => input.delete_char(),
        KeyCode::Delete => input.delete_at_cursor(),
        KeyCode::Left => input.move_cursor_left(),
        KeyCode::Right => input.move_cursor_right(),
        KeyCode::Home => input.move_cursor_home(),
        KeyCode::End => input.move_cursor_end(),
        KeyCode::Up => input.history_previous(),
        KeyCode::Down => input.history_next(),
        KeyCode::Esc => input.clear(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, PanelConfig, UiConfig};
    use crate::core::AppCore;
    use crate::data::WidgetRegion;
    use crate::protocol::LinkAction;

    fn setup() -> (InputRouter, UiState, WidgetStore) {
        let panel = PanelConfig::default();
        (
            InputRouter::new(false),
            UiState::new(&panel, &UiConfig::default()),
            WidgetStore::from_panel(&panel),
        )
    }

    fn press(code: KeyCode) -> FrontendEvent {
        FrontendEvent::key(code, KeyModifiers::NONE)
    }

    fn click(kind: MouseEventKind, x: u16, y: u16) -> FrontendEvent {
        FrontendEvent::mouse(kind, x, y, KeyModifiers::NONE)
    }

    #[test]
    fn test_keyboard_button_is_momentary_without_release_events() {
        let (mut router, mut ui, mut widgets) = setup();
        ui.focus_item(PanelItem::Button(1));

        let event = router.route(&press(KeyCode::Enter), &mut ui, &mut widgets);
        assert_eq!(event, Some(UiEvent::ButtonDown(1)));
        assert_eq!(router.next_pending(), Some(UiEvent::ButtonUp(1)));
        assert_eq!(router.next_pending(), None);
    }

    #[test]
    fn test_keyboard_button_waits_for_release() {
        let (_, mut ui, mut widgets) = setup();
        let mut router = InputRouter::new(true);
        ui.focus_item(PanelItem::Button(1));

        let down = router.route(&press(KeyCode::Char(' ')), &mut ui, &mut widgets);
        assert_eq!(down, Some(UiEvent::ButtonDown(1)));
        assert_eq!(router.next_pending(), None);

        let repeat = FrontendEvent::Key {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Repeat,
        };
        assert_eq!(router.route(&repeat, &mut ui, &mut widgets), None);

        let release = FrontendEvent::key_release(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(
            router.route(&release, &mut ui, &mut widgets),
            Some(UiEvent::ButtonUp(1))
        );
        assert_eq!(ui.key_grab, None);
    }

    #[test]
    fn test_toggle_flips_store_before_event() {
        let (mut router, mut ui, mut widgets) = setup();
        ui.focus_item(PanelItem::Toggle(1));
        assert_eq!(widgets.toggle(1), Some(true));

        let event = router.route(&press(KeyCode::Enter), &mut ui, &mut widgets);
        assert_eq!(event, Some(UiEvent::ToggleChanged(1, false)));
        assert_eq!(widgets.toggle(1), Some(false));
    }

    #[test]
    fn test_slider_keys() {
        let (mut router, mut ui, mut widgets) = setup();
        ui.focus_item(PanelItem::Slider(1));

        let event = router.route(&press(KeyCode::Right), &mut ui, &mut widgets);
        assert_eq!(event, Some(UiEvent::SliderChanged(1, 60500)));

        let event = router.route(&press(KeyCode::PageDown), &mut ui, &mut widgets);
        assert_eq!(event, Some(UiEvent::SliderChanged(1, 55500)));

        let event = router.route(&press(KeyCode::End), &mut ui, &mut widgets);
        assert_eq!(event, Some(UiEvent::SliderChanged(1, 90000)));

        // Already at max: nothing to send
        assert_eq!(router.route(&press(KeyCode::Right), &mut ui, &mut widgets), None);
        assert_eq!(widgets.slider_value(1), Some(90000));
    }

    #[test]
    fn test_text_submit_and_history() {
        let (mut router, mut ui, mut widgets) = setup();
        assert!(ui.is_focused(PanelItem::TextInput));

        for c in "p 10".chars() {
            router.route(&press(KeyCode::Char(c)), &mut ui, &mut widgets);
        }
        let event = router.route(&press(KeyCode::Enter), &mut ui, &mut widgets);
        assert_eq!(event, Some(UiEvent::TextSubmitted("p 10".to_string())));
        assert_eq!(ui.text_input.as_str(), "");

        router.route(&press(KeyCode::Up), &mut ui, &mut widgets);
        assert_eq!(ui.text_input.as_str(), "p 10");
    }

    #[test]
    fn test_close_keys() {
        let (mut router, mut ui, mut widgets) = setup();
        let ctrl_q = FrontendEvent::key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(
            router.route(&ctrl_q, &mut ui, &mut widgets),
            Some(UiEvent::WindowClosed)
        );
        // Plain 'q' is text
        assert_eq!(router.route(&press(KeyCode::Char('q')), &mut ui, &mut widgets), None);
        assert_eq!(ui.text_input.as_str(), "q");
    }

    #[test]
    fn test_reset_enable_has_no_event() {
        let (mut router, mut ui, mut widgets) = setup();
        ui.focus_item(PanelItem::ResetEnable);
        assert_eq!(router.route(&press(KeyCode::Enter), &mut ui, &mut widgets), None);
        assert!(widgets.reset_enable());

        ui.focus_item(PanelItem::Reset);
        assert_eq!(
            router.route(&press(KeyCode::Enter), &mut ui, &mut widgets),
            Some(UiEvent::ResetRequested)
        );
    }

    #[test]
    fn test_mouse_button_grab_releases_anywhere() {
        let (mut router, mut ui, mut widgets) = setup();
        button_region(&mut ui);

        let down = click(MouseEventKind::Down(MouseButton::Left), 5, 1);
        assert_eq!(
            router.route(&down, &mut ui, &mut widgets),
            Some(UiEvent::ButtonDown(1))
        );
        assert!(ui.is_focused(PanelItem::Button(1)));

        let up = click(MouseEventKind::Up(MouseButton::Left), 70, 30);
        assert_eq!(
            router.route(&up, &mut ui, &mut widgets),
            Some(UiEvent::ButtonUp(1))
        );
        assert_eq!(router.route(&up, &mut ui, &mut widgets), None);
    }

    fn button_region(ui: &mut UiState) {
        ui.regions.push(WidgetRegion {
            item: PanelItem::Button(1),
            x: 0,
            y: 1,
            width: 20,
            height: 1,
        });
    }

    #[test]
    fn test_click_while_key_holds_button_is_ignored() {
        let (_, mut ui, mut widgets) = setup();
        let mut router = InputRouter::new(true);
        let mut core = AppCore::new(Config::default());
        button_region(&mut ui);
        ui.focus_item(PanelItem::Button(1));

        let inputs = [
            press(KeyCode::Char(' ')),
            click(MouseEventKind::Down(MouseButton::Left), 5, 1),
            click(MouseEventKind::Up(MouseButton::Left), 5, 1),
        ];
        let frames: Vec<String> = inputs
            .iter()
            .filter_map(|input| router.route(input, &mut ui, &mut widgets))
            .filter_map(|event| core.handle_event(&event))
            .filter_map(|action| match action {
                LinkAction::Send(frame) => Some(frame.as_str().to_string()),
                LinkAction::Break(_) => None,
            })
            .collect();
        assert_eq!(frames, vec!["b011\r"]);
        assert_eq!(ui.key_grab, Some(1));
        assert_eq!(ui.pointer_grab, None);

        let release = FrontendEvent::key_release(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(
            router.route(&release, &mut ui, &mut widgets),
            Some(UiEvent::ButtonUp(1))
        );
    }

    #[test]
    fn test_key_while_mouse_holds_button_is_ignored() {
        let (mut router, mut ui, mut widgets) = setup();
        button_region(&mut ui);

        let down = click(MouseEventKind::Down(MouseButton::Left), 5, 1);
        assert_eq!(
            router.route(&down, &mut ui, &mut widgets),
            Some(UiEvent::ButtonDown(1))
        );

        // Focus moved to the clicked button; Enter must not queue a release
        assert_eq!(router.route(&press(KeyCode::Enter), &mut ui, &mut widgets), None);
        assert_eq!(router.next_pending(), None);

        let up = click(MouseEventKind::Up(MouseButton::Left), 5, 1);
        assert_eq!(
            router.route(&up, &mut ui, &mut widgets),
            Some(UiEvent::ButtonUp(1))
        );
    }

    #[test]
    fn test_mouse_slider_drag() {
        let (mut router, mut ui, mut widgets) = setup();
        ui.regions.push(WidgetRegion {
            item: PanelItem::Slider(1),
            x: 10,
            y: 3,
            width: 61,
            height: 1,
        });

        let down = click(MouseEventKind::Down(MouseButton::Left), 10, 3);
        assert_eq!(
            router.route(&down, &mut ui, &mut widgets),
            Some(UiEvent::SliderChanged(1, 30000))
        );

        // Dragging off the row still tracks the slider
        let drag = click(MouseEventKind::Drag(MouseButton::Left), 40, 9);
        assert_eq!(
            router.route(&drag, &mut ui, &mut widgets),
            Some(UiEvent::SliderChanged(1, 60000))
        );

        let up = click(MouseEventKind::Up(MouseButton::Left), 40, 9);
        assert_eq!(router.route(&up, &mut ui, &mut widgets), None);
        assert_eq!(ui.slider_drag, None);
    }

    #[test]
    fn test_wheel_scrolls_console() {
        let (mut router, mut ui, mut widgets) = setup();
        router.route(&click(MouseEventKind::ScrollUp, 0, 0), &mut ui, &mut widgets);
        assert_eq!(ui.console_scroll, WHEEL_SCROLL_LINES);
        router.route(&click(MouseEventKind::ScrollDown, 0, 0), &mut ui, &mut widgets);
        assert_eq!(ui.console_scroll, 0);
    }
}
