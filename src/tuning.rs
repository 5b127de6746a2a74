//! Data-driven game balance
//!
//! Every world constant lives in [`Tuning`]. Defaults come from
//! [`crate::consts`]; a JSON file may override any subset of them.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid tuning: {0}")]
    Invalid(String),
}

/// World constants for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world_width: f32,
    pub world_height: f32,

    pub bird_x: f32,
    pub bird_width: f32,
    pub bird_height: f32,
    pub gravity: f32,
    pub flap_impulse: f32,

    pub pipe_width: f32,
    pub gap_height: f32,
    pub pipe_speed: f32,
    pub spawn_interval_ms: u64,
    pub gap_top_min: i32,
    /// Highest gap_top is `world_height - gap_top_bottom_clearance`
    pub gap_top_bottom_clearance: i32,
    pub eviction_margin: f32,

    /// Autopilot aim with no target; mid-height when absent
    pub default_setpoint: Option<f32>,
    pub kc_min: f32,
    pub kc_max: f32,
    pub kc_default: f32,
    pub sp_min: f32,
    pub sp_max: f32,
    pub sp_default: f32,
    pub target_retain_factor: f32,
    pub flap_threshold: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,

            bird_x: BIRD_X,
            bird_width: BIRD_WIDTH,
            bird_height: BIRD_HEIGHT,
            gravity: GRAVITY,
            flap_impulse: FLAP_IMPULSE,

            pipe_width: PIPE_WIDTH,
            gap_height: GAP_HEIGHT,
            pipe_speed: PIPE_SPEED,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            gap_top_min: GAP_TOP_MIN,
            gap_top_bottom_clearance: GAP_TOP_BOTTOM_CLEARANCE,
            eviction_margin: EVICTION_MARGIN,

            default_setpoint: None,
            kc_min: KC_MIN,
            kc_max: KC_MAX,
            kc_default: KC_DEFAULT,
            sp_min: SP_MIN,
            sp_max: SP_MAX,
            sp_default: SP_DEFAULT,
            target_retain_factor: TARGET_RETAIN_FACTOR,
            flap_threshold: FLAP_THRESHOLD,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document. Absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a JSON tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Highest gap_top a new pipe may get
    pub fn gap_top_max(&self) -> i32 {
        self.world_height as i32 - self.gap_top_bottom_clearance
    }

    /// Where the autopilot aims when no pipe is ahead
    pub fn default_setpoint(&self) -> f32 {
        self.default_setpoint.unwrap_or(self.world_height / 2.0)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(name: &str, v: f32) -> Result<(), TuningError> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(TuningError::Invalid(format!("{name} must be positive, got {v}")))
            }
        }

        positive("world_width", self.world_width)?;
        positive("world_height", self.world_height)?;
        positive("bird_width", self.bird_width)?;
        positive("bird_height", self.bird_height)?;
        positive("pipe_width", self.pipe_width)?;
        positive("gap_height", self.gap_height)?;

        if self.spawn_interval_ms == 0 {
            return Err(TuningError::Invalid("spawn_interval_ms must be positive".into()));
        }
        if self.gap_top_max() < self.gap_top_min {
            return Err(TuningError::Invalid(format!(
                "gap_top range is empty: [{}, {}]",
                self.gap_top_min,
                self.gap_top_max()
            )));
        }
        if !(0.0..=self.world_height).contains(&self.default_setpoint()) {
            return Err(TuningError::Invalid(format!(
                "default_setpoint {} outside [0, {}]",
                self.default_setpoint(),
                self.world_height
            )));
        }
        if self.kc_min >= self.kc_max {
            return Err(TuningError::Invalid(format!(
                "kc range is empty: [{}, {}]",
                self.kc_min, self.kc_max
            )));
        }
        if self.sp_min >= self.sp_max {
            return Err(TuningError::Invalid(format!(
                "sp range is empty: [{}, {}]",
                self.sp_min, self.sp_max
            )));
        }
        if !(self.kc_min..=self.kc_max).contains(&self.kc_default) {
            return Err(TuningError::Invalid(format!(
                "kc_default {} outside [{}, {}]",
                self.kc_default, self.kc_min, self.kc_max
            )));
        }
        if !(self.sp_min..=self.sp_max).contains(&self.sp_default) {
            return Err(TuningError::Invalid(format!(
                "sp_default {} outside [{}, {}]",
                self.sp_default, self.sp_min, self.sp_max
            )));
        }
        Ok(())
    }
}
