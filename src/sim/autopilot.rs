//! Proportional-controller autopilot
//!
//! Picks the next pipe the bird has not cleared, aims at a point inside its
//! gap and flaps whenever the gain-scaled position error exceeds a fixed
//! threshold. The decision is re-evaluated every tick with no hysteresis.

use serde::{Deserialize, Serialize};

use super::body::Bird;
use super::obstacle::{ObstacleField, Pipe, PipeId};
use crate::tuning::Tuning;

/// Controller parameters and current target
///
/// Kc and SP are edited by the slider panel between ticks; the target is a
/// lookup key into the pipe field, re-resolved every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    /// Proportional gain
    pub kc: f32,
    /// Setpoint as a percentage of the gap, 0 = gap bottom, 100 = gap top
    pub sp: f32,
    #[serde(skip)]
    pub target: Option<PipeId>,
}

impl ControllerState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            kc: tuning.kc_default,
            sp: tuning.sp_default,
            target: None,
        }
    }

    /// Set the gain, clamped to the allowed range
    pub fn set_kc(&mut self, kc: f32, tuning: &Tuning) {
        self.kc = kc.clamp(tuning.kc_min, tuning.kc_max);
    }

    /// Set the setpoint percentage, clamped to the allowed range
    pub fn set_sp(&mut self, sp: f32, tuning: &Tuning) {
        self.sp = sp.clamp(tuning.sp_min, tuning.sp_max);
    }
}

/// Controller output for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub flap: bool,
    /// Vertical coordinate the controller aimed at
    pub setpoint: f32,
    /// `-(setpoint - bird.y)`: positive when the bird is below the setpoint
    pub error: f32,
}

/// Keep the current target until the bird is past `x + width * retain`,
/// then take the first pipe whose trailing edge is still ahead of the bird.
pub fn reacquire_target<'f>(
    controller: &mut ControllerState,
    bird: &Bird,
    field: &'f ObstacleField,
    tuning: &Tuning,
) -> Option<&'f Pipe> {
    let retain_limit = tuning.pipe_width * tuning.target_retain_factor;
    let current = controller
        .target
        .and_then(|id| field.get(id))
        .filter(|pipe| bird.x <= pipe.x + retain_limit);
    if current.is_some() {
        return current;
    }

    let next = field.iter().find(|pipe| pipe.trailing_edge(tuning) > bird.x);
    let next_id = next.map(|pipe| pipe.id);
    if next_id != controller.target {
        log::debug!("Autopilot target {:?} -> {:?}", controller.target, next_id);
    }
    controller.target = next_id;
    next
}

/// Vertical aim point inside the target's gap. The percentage is inverted:
/// SP=0 aims at the gap bottom, SP=100 at the gap top.
pub fn setpoint(target: Option<&Pipe>, sp: f32, tuning: &Tuning) -> f32 {
    match target {
        Some(pipe) => pipe.gap_top + tuning.gap_height * (1.0 - sp / 100.0),
        None => tuning.default_setpoint(),
    }
}

/// Bang-bang comparator on the proportional term
pub fn flap_decision(kc: f32, setpoint: f32, bird_y: f32, threshold: f32) -> Decision {
    let error = -(setpoint - bird_y);
    Decision {
        flap: kc * error > threshold,
        setpoint,
        error,
    }
}

/// Run the controller for one tick, reading Kc/SP fresh from `controller`
pub fn decide(
    controller: &mut ControllerState,
    bird: &Bird,
    field: &ObstacleField,
    tuning: &Tuning,
) -> Decision {
    let target = reacquire_target(controller, bird, field, tuning);
    let setpoint = setpoint(target, controller.sp, tuning);
    let decision = flap_decision(controller.kc, setpoint, bird.y, tuning.flap_threshold);
    log::trace!(
        "Autopilot kc={:.2} sp={:.1} setpoint={:.1} y={:.1} flap={}",
        controller.kc,
        controller.sp,
        setpoint,
        bird.y,
        decision.flap
    );
    decision
}
