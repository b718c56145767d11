//! Data layer - Pure state without UI coupling
//!
//! This module contains widget values, panel events and UI state as pure data structures.
//! NO imports from frontend/ or any rendering code.

pub mod event;
pub mod ui_state;
pub mod widget;

pub use event::UiEvent;
pub use ui_state::{PanelItem, UiState, WidgetRegion};
pub use widget::{WidgetClass, WidgetId, WidgetStore};
