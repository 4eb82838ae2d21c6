use std::time::{Duration, Instant};

/// [Stopwatch] is a simple utility for keeping track of time over a duration.
///
/// Useful for measuring wall clock time for debugging, e.g. how long an asset
/// took to load and upload.
pub struct Stopwatch {
    start: Instant,
    last: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last: Duration::ZERO,
        }
    }

    pub fn lap(&mut self) -> Duration {
        let elapsed = self.start.elapsed();
        let diff = elapsed - self.last;

        self.last = elapsed;

        diff
    }
}

/// [FrameClock] turns display refresh timestamps into frame deltas.
///
/// The first tick after a (re)start is always zero, and no delta is ever
/// longer than `max_delta`, so a frame after the window was hidden for a
/// while can't launch the camera across the scene.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    pub fn tick(&mut self, now: Instant) -> Duration {
        let delta = match self.last {
            // Timestamps that go backwards count as no time at all.
            Some(last) => now.saturating_duration_since(last).min(self.max_delta),
            None => Duration::ZERO,
        };

        self.last = Some(now);
        delta
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
