use std::time::{Duration, Instant};

/// The display-refresh trigger: one `wait_next` per tick.
pub trait RefreshClock {
    /// Block until the next refresh interval begins.
    fn wait_next(&mut self);
}

/// Paces ticks to a target interval.
///
/// Each wait sleeps out whatever is left of the interval since the previous tick began. A tick
/// that overran gets no sleep, and the cadence restarts from it instead of bursting to catch up.
#[derive(Debug)]
pub struct IntervalClock {
    interval: Duration,
    last_tick: Option<Instant>,
}

impl IntervalClock {
    /// A clock firing every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
        }
    }

    /// A clock ticking `hz` times per second (`hz` of 0 is treated as 1).
    pub fn from_hz(hz: u32) -> Self {
        Self::new(Duration::from_secs(1) / hz.max(1))
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl RefreshClock for IntervalClock {
    fn wait_next(&mut self) {
        if let Some(last) = self.last_tick {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last_tick = Some(Instant::now());
    }
}

/// Never waits. Drives offline replays as fast as frames can be composed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateClock;

impl RefreshClock for ImmediateClock {
    fn wait_next(&mut self) {}
}
