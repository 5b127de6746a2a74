//! Pipes and the scrolling pipe field
//!
//! Pipes spawn at the right edge on a wall-clock timer and scroll left a
//! fixed distance every tick. Once a pipe has been scored and is well past
//! the bird it is dropped from the front of the queue.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::tuning::Tuning;

/// Stable pipe identifier, increasing in spawn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PipeId(pub u32);

/// A top/bottom pipe pair with a gap between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    pub id: PipeId,
    /// Left edge
    pub x: f32,
    /// Bottom of the top segment
    pub gap_top: f32,
    /// Set once the bird has passed this pipe; never cleared
    pub scored: bool,
}

impl Pipe {
    #[inline]
    pub fn trailing_edge(&self, tuning: &Tuning) -> f32 {
        self.x + tuning.pipe_width
    }

    /// Top of the bottom segment
    #[inline]
    pub fn gap_bottom(&self, tuning: &Tuning) -> f32 {
        self.gap_top + tuning.gap_height
    }

    pub fn top_rect(&self, tuning: &Tuning) -> Aabb {
        Aabb::new(Vec2::new(self.x, 0.0), Vec2::new(tuning.pipe_width, self.gap_top))
    }

    /// Extends a full world height below the gap
    pub fn bottom_rect(&self, tuning: &Tuning) -> Aabb {
        Aabb::new(
            Vec2::new(self.x, self.gap_bottom(tuning)),
            Vec2::new(tuning.pipe_width, tuning.world_height),
        )
    }
}

/// Ordered set of live pipes plus the spawn timer
#[derive(Debug, Clone)]
pub struct ObstacleField {
    pipes: VecDeque<Pipe>,
    last_spawn_ms: u64,
    next_id: u32,
    rng: Pcg32,
}

impl ObstacleField {
    /// Empty field whose spawn timer starts at `start_ms`
    pub fn new(seed: u64, start_ms: u64) -> Self {
        Self {
            pipes: VecDeque::new(),
            last_spawn_ms: start_ms,
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Spawn a pipe at the right edge if a full interval has elapsed since
    /// the last spawn, and restart the timer. Returns the new pipe.
    pub fn maybe_spawn(&mut self, now_ms: u64, tuning: &Tuning) -> Option<&Pipe> {
        if now_ms.saturating_sub(self.last_spawn_ms) < tuning.spawn_interval_ms {
            return None;
        }
        self.last_spawn_ms = now_ms;

        let gap_top_max = tuning.gap_top_max();
        let gap_top = self.rng.random_range(tuning.gap_top_min..=gap_top_max);
        debug_assert!((tuning.gap_top_min..=gap_top_max).contains(&gap_top));

        let id = self.spawn_at(tuning.world_width, gap_top as f32);
        log::debug!("Spawned pipe {:?} gap_top={} at {}ms", id, gap_top, now_ms);
        self.pipes.back()
    }

    /// Insert a pipe at an explicit position
    pub fn spawn_at(&mut self, x: f32, gap_top: f32) -> PipeId {
        let id = PipeId(self.next_id);
        self.next_id += 1;
        self.pipes.push_back(Pipe {
            id,
            x,
            gap_top,
            scored: false,
        });
        id
    }

    /// Scroll every pipe left by one tick's worth
    pub fn advance(&mut self, tuning: &Tuning) {
        for pipe in &mut self.pipes {
            pipe.x -= tuning.pipe_speed;
        }
    }

    /// Drop scored pipes whose trailing edge is more than the eviction
    /// margin left of `bird_x`. Returns how many were removed.
    pub fn evict_passed(&mut self, bird_x: f32, tuning: &Tuning) -> usize {
        let limit = bird_x - tuning.eviction_margin;
        let mut evicted = 0;
        while let Some(front) = self.pipes.front() {
            if !(front.scored && front.trailing_edge(tuning) < limit) {
                break;
            }
            log::debug!("Evicted pipe {:?}", front.id);
            self.pipes.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn get(&self, id: PipeId) -> Option<&Pipe> {
        self.pipes.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pipe> {
        self.pipes.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_timer() {
        let tuning = Tuning::default();
        let mut field = ObstacleField::new(7, 0);

        assert!(field.maybe_spawn(0, &tuning).is_none());
        assert!(field.maybe_spawn(1349, &tuning).is_none());
        let pipe = field.maybe_spawn(1350, &tuning).expect("due at interval");
        assert_eq!(pipe.x, tuning.world_width);
        assert_eq!(field.len(), 1);

        // Timer restarted at 1350
        assert!(field.maybe_spawn(2699, &tuning).is_none());
        assert!(field.maybe_spawn(2700, &tuning).is_some());
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn test_spawn_timer_relative_to_start() {
        let tuning = Tuning::default();
        let mut field = ObstacleField::new(7, 5000);
        assert!(field.maybe_spawn(6000, &tuning).is_none());
        assert!(field.maybe_spawn(6350, &tuning).is_some());
    }

    #[test]
    fn test_gap_top_range() {
        let tuning = Tuning::default();
        let mut field = ObstacleField::new(42, 0);
        for i in 1..=500u64 {
            field.maybe_spawn(i * tuning.spawn_interval_ms, &tuning);
        }
        assert_eq!(field.len(), 500);
        for pipe in field.iter() {
            assert!(pipe.gap_top >= 100.0 && pipe.gap_top <= 400.0);
            assert_eq!(pipe.gap_top.fract(), 0.0);
        }
    }

    #[test]
    fn test_same_seed_same_gaps() {
        let tuning = Tuning::default();
        let mut a = ObstacleField::new(99, 0);
        let mut b = ObstacleField::new(99, 0);
        for i in 1..=20u64 {
            a.maybe_spawn(i * 2000, &tuning);
            b.maybe_spawn(i * 2000, &tuning);
        }
        let gaps_a: Vec<f32> = a.iter().map(|p| p.gap_top).collect();
        let gaps_b: Vec<f32> = b.iter().map(|p| p.gap_top).collect();
        assert_eq!(gaps_a, gaps_b);
    }

    #[test]
    fn test_advance_moves_all() {
        let tuning = Tuning::default();
        let mut field = ObstacleField::new(1, 0);
        field.spawn_at(400.0, 200.0);
        field.spawn_at(-500.0, 200.0);
        field.advance(&tuning);
        let xs: Vec<f32> = field.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![394.0, -506.0]);
    }

    #[test]
    fn test_rects() {
        let tuning = Tuning::default();
        let pipe = Pipe {
            id: PipeId(1),
            x: 200.0,
            gap_top: 180.0,
            scored: false,
        };
        let top = pipe.top_rect(&tuning);
        assert_eq!(top.min, Vec2::new(200.0, 0.0));
        assert_eq!(top.max, Vec2::new(260.0, 180.0));
        let bottom = pipe.bottom_rect(&tuning);
        assert_eq!(bottom.min, Vec2::new(200.0, 330.0));
        assert_eq!(bottom.max, Vec2::new(260.0, 930.0));
    }

    #[test]
    fn test_evict_only_scored_and_far_left() {
        let tuning = Tuning::default();
        let mut field = ObstacleField::new(1, 0);
        let far = field.spawn_at(-100.0, 200.0);
        let unscored = field.spawn_at(-100.0, 200.0);
        field.spawn_at(300.0, 200.0);

        // Nothing scored yet
        assert_eq!(field.evict_passed(100.0, &tuning), 0);

        field.iter_mut().for_each(|p| {
            if p.id == far {
                p.scored = true;
            }
        });
        assert_eq!(field.evict_passed(100.0, &tuning), 1);
        assert!(field.get(far).is_none());
        // Front is now unscored, so eviction stops there
        assert!(field.get(unscored).is_some());
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn test_evict_respects_margin() {
        let tuning = Tuning::default();
        let mut field = ObstacleField::new(1, 0);
        // Trailing edge at -0.5 with limit 100 - 100 = 0
        field.spawn_at(-60.5, 200.0);
        // Trailing edge at 0.0, not strictly past the limit
        field.spawn_at(-60.0, 200.0);
        field.iter_mut().for_each(|p| p.scored = true);
        assert_eq!(field.evict_passed(100.0, &tuning), 1);
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_ids_increase() {
        let mut field = ObstacleField::new(1, 0);
        let a = field.spawn_at(0.0, 100.0);
        let b = field.spawn_at(0.0, 100.0);
        assert!(b > a);
    }
}
