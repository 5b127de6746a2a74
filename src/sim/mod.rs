//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One time sample per tick (dt and spawn clock from the same instant)
//! - Seeded RNG only
//! - Stable iteration order (pipes in spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod body;
pub mod clock;
pub mod collision;
pub mod obstacle;
pub mod scoring;
pub mod state;
pub mod tick;

pub use autopilot::{ControllerState, Decision};
pub use body::Bird;
pub use clock::{Clock, FrameClock, FrameTime, ManualClock};
pub use collision::{Aabb, Hit};
pub use obstacle::{ObstacleField, Pipe, PipeId};
pub use state::{ControlMode, GamePhase, GameState};
pub use tick::{TickInput, TickOutcome, tick};
