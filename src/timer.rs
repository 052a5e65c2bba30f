//! Deadline timers polled from the event loop.
//!
//! The core is single-threaded; balloon and auto-scroll delays are modeled as
//! deadlines checked on every tick rather than background threads.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct Timer {
    deadline: Option<Instant>,
    period: Option<Duration>,
}

impl Timer {
    /// Arm a single-shot timer `delay` from `now`.
    pub fn start(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
        self.period = None;
    }

    /// Arm a repeating timer firing every `period` from `now`.
    pub fn start_repeating(&mut self, now: Instant, period: Duration) {
        self.deadline = Some(now + period);
        self.period = Some(period);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
        self.period = None;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true when the deadline has passed. Single-shot timers disarm,
    /// repeating timers reschedule.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = self.period.map(|p| now + p);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_shot_fires_once() {
        let start = Instant::now();
        let mut timer = Timer::default();
        timer.start(start, Duration::from_millis(500));
        assert!(!timer.fire(start + Duration::from_millis(499)));
        assert!(timer.fire(start + Duration::from_millis(500)));
        assert!(!timer.fire(start + Duration::from_millis(600)));
        assert!(!timer.is_running());
    }

    #[test]
    fn repeating_timer_reschedules() {
        let start = Instant::now();
        let mut timer = Timer::default();
        timer.start_repeating(start, Duration::from_millis(300));
        assert!(timer.fire(start + Duration::from_millis(300)));
        assert!(timer.is_running());
        assert!(timer.fire(start + Duration::from_millis(600)));
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut timer = Timer::default();
        timer.start(start, Duration::from_millis(100));
        timer.cancel();
        assert!(!timer.fire(start + Duration::from_millis(200)));
    }
}
