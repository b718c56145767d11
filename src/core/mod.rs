//! Core logic layer
//!
//! Event dispatch, button pairing, inbound line assembly and the control loop.
//! No rendering code: the loop talks to the terminal only through the
//! `Frontend` trait and to the device only through the `Link` trait.

pub mod app_core;
pub mod button_state;
pub mod control_loop;
pub mod input_router;
pub mod rx_assembler;

pub use app_core::AppCore;
pub use control_loop::ControlLoop;
pub use input_router::InputRouter;
