use crate::error::{Result, TimelineError};
use crate::time::{Time, TimeDelta};

/// An immutable span of time with `start <= end`. All mutating helpers
/// return a new period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimePeriod {
    start: Time,
    end: Time,
}

impl TimePeriod {
    pub fn new(start: Time, end: Time) -> Result<Self> {
        if start > end {
            return Err(TimelineError::InvalidPeriod(
                "start time is after end time".into(),
            ));
        }
        Ok(Self { start, end })
    }

    /// A zero-length period.
    pub fn point(time: Time) -> Self {
        Self { start: time, end: time }
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    pub fn delta(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn mean_time(&self) -> Time {
        self.start + self.delta().half()
    }

    pub fn contains(&self, time: Time) -> bool {
        self.start <= time && time <= self.end
    }

    /// True when the periods share any instant. Zero-length overlap at a
    /// shared endpoint does not count.
    pub fn overlaps(&self, other: &TimePeriod) -> bool {
        self.start < other.end && other.start < self.end
            || (self.is_point() && other.contains(self.start))
            || (other.is_point() && self.contains(other.start))
    }

    /// The union of two periods.
    pub fn extend_to_include(&self, other: &TimePeriod) -> TimePeriod {
        TimePeriod {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Shrink (positive `times`) or grow (negative) by `times/5` of the span
    /// on each side.
    pub fn zoom(&self, times: i64) -> Result<TimePeriod> {
        let step = self.delta().scale(times as f64 / 5.0);
        TimePeriod::new(self.start + step, self.end - step)
    }

    /// Zoom around an arbitrary ratio of the span instead of the center,
    /// keeping the time under the cursor fixed.
    pub fn zoom_at(&self, times: i64, ratio: f64) -> Result<TimePeriod> {
        let step = self.delta().scale(times as f64 / 5.0);
        let left = step.scale(2.0 * ratio);
        let right = step.scale(2.0 * (1.0 - ratio));
        TimePeriod::new(self.start + left, self.end - right)
    }

    pub fn move_delta(&self, delta: TimeDelta) -> TimePeriod {
        TimePeriod {
            start: self.start + delta,
            end: self.end + delta,
        }
    }

    /// Move by `direction` tenths of the span; the page-scroll unit.
    pub fn move_page(&self, direction: i64) -> TimePeriod {
        self.move_delta(self.delta().scale(direction as f64 / 10.0))
    }

    /// A period of the same length centered on `time`.
    pub fn center(&self, time: Time) -> TimePeriod {
        self.move_delta(time - self.mean_time())
    }

    /// Clamp so the period lies inside `bound`, preserving length when it
    /// fits.
    pub fn inside_period(&self, bound: &TimePeriod) -> TimePeriod {
        if self.delta() > bound.delta() {
            return *bound;
        }
        if self.start < bound.start {
            self.move_delta(bound.start - self.start)
        } else if self.end > bound.end {
            self.move_delta(bound.end - self.end)
        } else {
            *self
        }
    }
}
