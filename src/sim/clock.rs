//! Frame timing
//!
//! One sample per tick supplies both the monotonic time used for pipe
//! spawning and the dt used for integration, so the two never drift apart.

use std::time::{Duration, Instant};

use crate::consts::MAX_FRAME_DT;

/// Time sample for a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Milliseconds since the clock started (monotonic)
    pub now_ms: u64,
    /// Seconds since the previous tick
    pub dt: f32,
}

/// Source of elapsed time for the game loop
pub trait Clock {
    /// Milliseconds elapsed since the clock started
    fn ticks_elapsed_ms(&self) -> u64;

    /// Wait for the next frame and sample it
    fn tick(&mut self) -> FrameTime;
}

/// Real-time clock that paces ticks to a fixed rate
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame: Duration,
}

impl FrameClock {
    pub fn new(ticks_per_second: u32) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame: Duration::from_secs_f64(1.0 / ticks_per_second.max(1) as f64),
        }
    }
}

impl Clock for FrameClock {
    fn ticks_elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn tick(&mut self) -> FrameTime {
        let elapsed = self.last.elapsed();
        if elapsed < self.frame {
            std::thread::sleep(self.frame - elapsed);
        }

        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32().min(MAX_FRAME_DT);
        self.last = now;

        FrameTime {
            now_ms: now.duration_since(self.start).as_millis() as u64,
            dt,
        }
    }
}

/// Clock that advances a fixed step per tick without sleeping
///
/// Used by tests and the headless runner.
#[derive(Debug, Clone)]
pub struct ManualClock {
    elapsed: Duration,
    step: Duration,
}

impl ManualClock {
    pub fn new(step: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            step,
        }
    }

    /// Step of one tick at the given rate
    pub fn per_second(ticks_per_second: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / ticks_per_second.max(1) as f64))
    }
}

impl Clock for ManualClock {
    fn ticks_elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    fn tick(&mut self) -> FrameTime {
        self.elapsed += self.step;
        FrameTime {
            now_ms: self.ticks_elapsed_ms(),
            dt: self.step.as_secs_f32(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_single_sample() {
        let mut clock = ManualClock::new(Duration::from_millis(20));
        let first = clock.tick();
        let second = clock.tick();
        assert_eq!(first.now_ms, 20);
        assert_eq!(second.now_ms, 40);
        assert!((second.dt - 0.02).abs() < 1e-6);
        assert_eq!(clock.ticks_elapsed_ms(), 40);
    }

    #[test]
    fn test_manual_clock_per_second() {
        let mut clock = ManualClock::per_second(50);
        for _ in 0..50 {
            clock.tick();
        }
        assert_eq!(clock.ticks_elapsed_ms(), 1000);
    }

    #[test]
    fn test_frame_clock_caps_dt() {
        let mut clock = FrameClock::new(1000);
        std::thread::sleep(Duration::from_millis(150));
        let frame = clock.tick();
        assert!(frame.dt <= MAX_FRAME_DT);
        assert!(frame.now_ms >= 150);
    }
}
