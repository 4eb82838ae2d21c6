use std::time::{Duration, Instant};

use crate::helpers::FrameClock;

/// Paces the frame loop off the host's refresh timestamps.
///
/// The host calls [FrameScheduler::tick] once per display refresh; while
/// stopped, ticks are refused and nothing runs.
#[derive(Debug)]
pub struct FrameScheduler {
    clock: FrameClock,
    running: bool,
    frames: u64,
}

impl FrameScheduler {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            clock: FrameClock::new(max_delta),
            running: false,
            frames: 0,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.clock.reset();
            self.running = true;
            self.frames = 0;
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Frame loop stopped after {} frames", self.frames);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frame delta for this tick, or [None] if the loop isn't running.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        if !self.running {
            return None;
        }

        self.frames += 1;
        Some(self.clock.tick(now))
    }
}
