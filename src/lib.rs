//! Flappy Autopilot - a side-scrolling pipe dodger with a P-controller pilot
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, pipes, collisions, autopilot)
//! - `ui`: Slider widgets that tune the autopilot at runtime
//! - `render`: Logical draw lists consumed by a frontend
//! - `app`: Menu / run / game-over state machine
//! - `tuning`: Data-driven world constants

pub mod app;
pub mod render;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use app::{App, Command, Flow, FrameInput, Screen};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Target simulation rate
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Largest dt a single tick may integrate (stalled frontend guard)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 400.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Bird defaults - x is fixed, the world scrolls past it
    pub const BIRD_X: f32 = 100.0;
    pub const BIRD_WIDTH: f32 = 40.0;
    pub const BIRD_HEIGHT: f32 = 40.0;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 5000.0;
    /// Velocity set by a flap (negative is up)
    pub const FLAP_IMPULSE: f32 = -800.0;

    /// Pipe defaults
    pub const PIPE_WIDTH: f32 = 60.0;
    pub const GAP_HEIGHT: f32 = 150.0;
    /// Horizontal scroll per tick (pixels)
    pub const PIPE_SPEED: f32 = 6.0;
    pub const SPAWN_INTERVAL_MS: u64 = 1350;
    pub const GAP_TOP_MIN: i32 = 100;
    /// Distance from the world bottom to the highest allowed gap_top
    pub const GAP_TOP_BOTTOM_CLEARANCE: i32 = 200;
    /// Scored pipes this far left of the bird are dropped
    pub const EVICTION_MARGIN: f32 = 100.0;

    /// Autopilot defaults
    pub const KC_MIN: f32 = -0.5;
    pub const KC_MAX: f32 = 1.0;
    pub const KC_DEFAULT: f32 = 0.5;
    pub const SP_MIN: f32 = 0.0;
    pub const SP_MAX: f32 = 100.0;
    pub const SP_DEFAULT: f32 = 45.0;
    /// Current target is kept until the bird is past `x + width * factor`
    pub const TARGET_RETAIN_FACTOR: f32 = 1.1;
    /// Scaled error must exceed this to flap
    pub const FLAP_THRESHOLD: f32 = 1.0;
}
