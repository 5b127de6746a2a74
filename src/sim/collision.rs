//! Collision detection for the bird against pipes and world bounds
//!
//! Everything here is a pure function of current positions. Rectangles
//! are half-open, so boxes that only share an edge do not collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Bird;
use super::obstacle::{Pipe, PipeId};
use crate::tuning::Tuning;

/// Axis-aligned box in world coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from its top-left corner and size
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size / 2.0, size)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// True when the boxes share a region of nonzero area
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Point test including the top/left edges, excluding bottom/right
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hit {
    /// Bird box overlaps a pipe segment
    Pipe(PipeId),
    /// Bird centre went above the world
    Ceiling,
    /// Bird centre went below the world
    Floor,
}

/// First terminal contact, pipes before bounds
pub fn first_hit<'a>(
    bird: &Bird,
    pipes: impl IntoIterator<Item = &'a Pipe>,
    tuning: &Tuning,
) -> Option<Hit> {
    let bird_box = bird.aabb();
    for pipe in pipes {
        if bird_box.overlaps(&pipe.top_rect(tuning)) || bird_box.overlaps(&pipe.bottom_rect(tuning))
        {
            return Some(Hit::Pipe(pipe.id));
        }
    }

    if bird.y < 0.0 {
        Some(Hit::Ceiling)
    } else if bird.y > tuning.world_height {
        Some(Hit::Floor)
    } else {
        None
    }
}

/// True when the bird's current position ends the run
pub fn check<'a>(bird: &Bird, pipes: impl IntoIterator<Item = &'a Pipe>, tuning: &Tuning) -> bool {
    first_hit(bird, pipes, tuning).is_some()
}
