//! Scoring: one point per pipe, awarded the first tick its trailing edge is
//! behind the bird.

use super::body::Bird;
use super::obstacle::Pipe;
use crate::tuning::Tuning;

/// Award points for newly passed pipes. Returns how many were scored.
pub fn update<'a>(
    bird: &Bird,
    pipes: impl IntoIterator<Item = &'a mut Pipe>,
    score: &mut u32,
    tuning: &Tuning,
) -> u32 {
    let mut newly = 0;
    for pipe in pipes {
        if !pipe.scored && pipe.trailing_edge(tuning) < bird.x {
            pipe.scored = true;
            *score += 1;
            newly += 1;
            log::debug!("Scored pipe {:?} (score {})", pipe.id, score);
        }
    }
    newly
}
