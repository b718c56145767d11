//! UI State - Focus, pointer grabs and hit regions
//!
//! This module contains UI state that is independent of rendering.
//! The TUI frontend owns one `UiState` and records widget regions into it
//! on every draw so mouse input can be resolved to panel items.

use super::widget::WidgetId;
use crate::config::{PanelConfig, UiConfig};
use crate::widgets::TextInputState;

/// Every focusable item on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelItem {
    Button(WidgetId),
    Toggle(WidgetId),
    Slider(WidgetId),
    TextInput,
    ResetEnable,
    Reset,
    Exit,
}

/// Screen rectangle occupied by a panel item during the last draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetRegion {
    pub item: PanelItem,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl WidgetRegion {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Horizontal position of `x` inside the region, 0.0 at the left edge and 1.0 at the right.
    pub fn fraction_at(&self, x: u16) -> f64 {
        if self.width <= 1 {
            return 0.0;
        }
        let offset = x.saturating_sub(self.x).min(self.width - 1);
        offset as f64 / (self.width - 1) as f64
    }
}

/// Application UI state
#[derive(Debug, Clone)]
pub struct UiState {
    /// Tab order
    pub focus_ring: Vec<PanelItem>,

    /// Index into `focus_ring`
    pub focused: usize,

    /// Button held down by the mouse
    pub pointer_grab: Option<WidgetId>,

    /// Button held down from the keyboard, waiting for the key release
    pub key_grab: Option<WidgetId>,

    /// Slider being dragged
    pub slider_drag: Option<WidgetId>,

    /// Regions recorded by the last draw
    pub regions: Vec<WidgetRegion>,

    /// Console scrollback offset from the bottom (0 = live view)
    pub console_scroll: usize,

    /// Free-text field
    pub text_input: TextInputState,
}

impl UiState {
    pub fn new(panel: &PanelConfig, ui: &UiConfig) -> Self {
        let mut focus_ring = Vec::new();
        focus_ring.extend(panel.buttons.iter().map(|b| PanelItem::Button(b.id)));
        focus_ring.extend(panel.toggles.iter().map(|t| PanelItem::Toggle(t.id)));
        focus_ring.extend(panel.sliders.iter().map(|s| PanelItem::Slider(s.id)));
        focus_ring.push(PanelItem::TextInput);
        focus_ring.push(PanelItem::ResetEnable);
        focus_ring.push(PanelItem::Reset);
        focus_ring.push(PanelItem::Exit);

        // The text field takes focus first, like a serial monitor's send box
        let focused = focus_ring
            .iter()
            .position(|item| *item == PanelItem::TextInput)
            .unwrap_or(0);

        let mut text_input = TextInputState::new(ui.max_history);
        text_input.set_min_command_length(ui.min_command_length);

        Self {
            focus_ring,
            focused,
            pointer_grab: None,
            key_grab: None,
            slider_drag: None,
            regions: Vec::new(),
            console_scroll: 0,
            text_input,
        }
    }

    pub fn focused_item(&self) -> Option<PanelItem> {
        self.focus_ring.get(self.focused).copied()
    }

    pub fn is_focused(&self, item: PanelItem) -> bool {
        self.focused_item() == Some(item)
    }

    pub fn focus_next(&mut self) {
        if !self.focus_ring.is_empty() {
            self.focused = (self.focused + 1) % self.focus_ring.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.focus_ring.is_empty() {
            self.focused = (self.focused + self.focus_ring.len() - 1) % self.focus_ring.len();
        }
    }

    /// Move focus to `item` if it is part of the ring.
    pub fn focus_item(&mut self, item: PanelItem) {
        if let Some(idx) = self.focus_ring.iter().position(|i| *i == item) {
            self.focused = idx;
        }
    }

    pub fn region_of(&self, item: PanelItem) -> Option<&WidgetRegion> {
        self.regions.iter().find(|r| r.item == item)
    }

    pub fn item_at(&self, x: u16, y: u16) -> Option<PanelItem> {
        self.regions.iter().find(|r| r.contains(x, y)).map(|r| r.item)
    }

    pub fn scroll_console_up(&mut self, n: usize) {
        self.console_scroll = self.console_scroll.saturating_add(n);
    }

    pub fn scroll_console_down(&mut self, n: usize) {
        self.console_scroll = self.console_scroll.saturating_sub(n);
    }
}
