//! Per-tick simulation step
//!
//! Order within a tick: flap decision, physics, spawn + scroll, collision,
//! scoring, eviction. Collision always sees the post-integration position.

use super::autopilot;
use super::clock::FrameTime;
use super::collision::{self, Hit};
use super::obstacle::PipeId;
use super::scoring;
use super::state::{ControlMode, GamePhase, GameState};
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap key held this tick (manual mode only)
    pub flap_held: bool,
}

/// What happened during a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub flapped: bool,
    pub spawned: Option<PipeId>,
    /// Pipes passed this tick
    pub scored: u32,
    pub evicted: usize,
    /// Set when the run ended this tick
    pub crash: Option<Hit>,
}

/// Advance the run by one tick. Does nothing once the run has crashed.
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    frame: FrameTime,
    tuning: &Tuning,
) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    if state.phase != GamePhase::Running {
        return outcome;
    }
    state.time_ticks += 1;

    outcome.flapped = match state.mode {
        ControlMode::Manual => {
            state.last_decision = None;
            input.flap_held
        }
        ControlMode::Autopilot => {
            let decision =
                autopilot::decide(&mut state.controller, &state.bird, &state.field, tuning);
            state.last_decision = Some(decision);
            decision.flap
        }
    };

    state.bird.update(frame.dt, outcome.flapped, tuning);

    outcome.spawned = state.field.maybe_spawn(frame.now_ms, tuning).map(|pipe| pipe.id);
    state.field.advance(tuning);

    if let Some(hit) = collision::first_hit(&state.bird, state.field.iter(), tuning) {
        state.phase = GamePhase::Crashed;
        outcome.crash = Some(hit);
        log::info!(
            "Run over after {} ticks: {:?}, score {}",
            state.time_ticks,
            hit,
            state.score
        );
        return outcome;
    }

    outcome.scored = scoring::update(&state.bird, state.field.iter_mut(), &mut state.score, tuning);
    outcome.evicted = state.field.evict_passed(state.bird.x, tuning);
    outcome
}
