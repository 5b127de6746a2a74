//! On-screen controls
//!
//! Sliders never own the values they edit: they read and write the
//! [`ControllerState`](crate::sim::ControllerState) handed to them each frame.

pub mod panel;
pub mod slider;

pub use panel::ControllerPanel;
pub use slider::{PointerState, Slider};
