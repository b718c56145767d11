//! Widget state structs (rendering-agnostic)
//!
//! This module contains state-only structures for the panel widgets.
//! These structs hold data and provide methods for state manipulation,
//! but contain no rendering logic.

pub mod console;
pub mod slider;
pub mod text_input;

pub use console::{ConsoleLine, ConsoleState};
pub use slider::SliderState;
pub use text_input::TextInputState;
