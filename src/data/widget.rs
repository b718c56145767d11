//! Widget identities and the live value store
//!
//! The store is the single source of truth for toggle and slider values.
//! The frontend writes into it when the operator changes a control, and the
//! protocol encoder reads from it at encode time.

use crate::config::PanelConfig;
use crate::widgets::SliderState;
use std::collections::BTreeMap;
use std::fmt;

/// Small per-class widget number. Classes are disjoint namespaces.
pub type WidgetId = u8;

/// Widget classes that have a device-facing id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetClass {
    Button,
    Toggle,
    Slider,
}

impl WidgetClass {
    /// Highest id that fits the class's field on the wire.
    ///
    /// Buttons and toggles are sent as two digits, sliders as one.
    pub fn max_id(self) -> WidgetId {
        match self {
            WidgetClass::Button | WidgetClass::Toggle => 99,
            WidgetClass::Slider => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WidgetClass::Button => "button",
            WidgetClass::Toggle => "toggle",
            WidgetClass::Slider => "slider",
        }
    }

    pub fn accepts(self, id: WidgetId) -> bool {
        id <= self.max_id()
    }
}

impl fmt::Display for WidgetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current toggle and slider values plus the reset-enable flag
#[derive(Debug, Clone, Default)]
pub struct WidgetStore {
    toggles: BTreeMap<WidgetId, bool>,
    sliders: BTreeMap<WidgetId, SliderState>,
    reset_enable: bool,
}

impl WidgetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the store from the declared panel, applying declared defaults.
    pub fn from_panel(panel: &PanelConfig) -> Self {
        let mut store = Self::new();
        for toggle in &panel.toggles {
            store.set_toggle(toggle.id, toggle.default);
        }
        for slider in &panel.sliders {
            store.insert_slider(
                slider.id,
                SliderState::new(slider.min, slider.max, slider.default, slider.step),
            );
        }
        store.reset_enable = panel.reset_enable_default;
        store
    }

    pub fn toggle(&self, id: WidgetId) -> Option<bool> {
        self.toggles.get(&id).copied()
    }

    pub fn set_toggle(&mut self, id: WidgetId, value: bool) {
        self.toggles.insert(id, value);
    }

    /// Flip a toggle and return its new value.
    pub fn flip_toggle(&mut self, id: WidgetId) -> Option<bool> {
        let value = self.toggles.get_mut(&id)?;
        *value = !*value;
        Some(*value)
    }

    pub fn insert_slider(&mut self, id: WidgetId, slider: SliderState) {
        self.sliders.insert(id, slider);
    }

    pub fn slider(&self, id: WidgetId) -> Option<&SliderState> {
        self.sliders.get(&id)
    }

    pub fn slider_mut(&mut self, id: WidgetId) -> Option<&mut SliderState> {
        self.sliders.get_mut(&id)
    }

    /// Latest position of a slider
    pub fn slider_value(&self, id: WidgetId) -> Option<i32> {
        self.sliders.get(&id).map(|s| s.value)
    }

    pub fn reset_enable(&self) -> bool {
        self.reset_enable
    }

    pub fn flip_reset_enable(&mut self) -> bool {
        self.reset_enable = !self.reset_enable;
        self.reset_enable
    }
}
