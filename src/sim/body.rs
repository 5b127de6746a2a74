//! The bird

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::tuning::Tuning;

/// The controlled body. Only `y` and `vel` change during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    /// Fixed horizontal position (the world scrolls, the bird does not)
    pub x: f32,
    /// Vertical centre, growing downward
    pub y: f32,
    /// Vertical velocity (pixels/s, negative is up)
    pub vel: f32,
    pub size: Vec2,
}

impl Bird {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            x: tuning.bird_x,
            y: tuning.world_height / 2.0,
            vel: 0.0,
            size: Vec2::new(tuning.bird_width, tuning.bird_height),
        }
    }

    /// Integrate one tick. A flap replaces the velocity before the position
    /// update; the position uses the pre-update velocity plus the gravity term.
    pub fn update(&mut self, dt: f32, flap: bool, tuning: &Tuning) {
        if flap {
            self.vel = tuning.flap_impulse;
        }
        self.y += self.vel * dt + 0.5 * tuning.gravity * dt * dt;
        self.vel += tuning.gravity * dt;
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Bounding box centred on the bird
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.center(), self.size)
    }
}
