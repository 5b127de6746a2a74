//! Run state and core simulation types
//!
//! A [`GameState`] covers exactly one run. Restarting builds a new one, so
//! nothing carries over between runs.

use serde::{Deserialize, Serialize};

use super::autopilot::{ControllerState, Decision};
use super::body::Bird;
use super::obstacle::ObstacleField;
use crate::tuning::Tuning;

/// Who decides when to flap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlMode {
    /// Flap while the flap key is held
    #[default]
    Manual,
    /// P-controller flies the bird
    Autopilot,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Manual => "manual",
            ControlMode::Autopilot => "autopilot",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manual" | "m" => Some(ControlMode::Manual),
            "autopilot" | "auto" | "p" => Some(ControlMode::Autopilot),
            _ => None,
        }
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ticks are being simulated
    Running,
    /// Bird hit a pipe or left the world; no further ticks apply
    Crashed,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for pipe gap generation
    pub seed: u64,
    pub mode: ControlMode,
    pub phase: GamePhase,
    pub bird: Bird,
    pub field: ObstacleField,
    pub controller: ControllerState,
    pub score: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Clock time the run started at
    pub started_ms: u64,
    /// Autopilot output from the latest tick (autopilot mode only)
    pub last_decision: Option<Decision>,
}

impl GameState {
    /// Fresh run: bird at its start position, no pipes, score 0, default
    /// controller parameters, spawn timer starting at `now_ms`
    pub fn new(seed: u64, mode: ControlMode, tuning: &Tuning, now_ms: u64) -> Self {
        log::info!("Starting {} run (seed {})", mode.as_str(), seed);
        Self {
            seed,
            mode,
            phase: GamePhase::Running,
            bird: Bird::new(tuning),
            field: ObstacleField::new(seed, now_ms),
            controller: ControllerState::new(tuning),
            score: 0,
            time_ticks: 0,
            started_ms: now_ms,
            last_decision: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }
}
