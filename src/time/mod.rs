/// Calendar-independent time primitives.
///
/// A `Time` is a julian day number plus a seconds-of-day offset; every
/// calendar converts through this representation. A `TimeDelta` is a signed
/// number of seconds. Arithmetic between the two is closed on `Time`.
pub mod period;

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

pub use period::TimePeriod;

pub const SECONDS_IN_DAY: i64 = 86_400;
pub const SECONDS_IN_HOUR: i64 = 3_600;

/// A point in time: astronomical julian day number plus seconds since the
/// start of that day. `seconds` is always in `[0, 86400)`; negative julian
/// days denote times before the julian epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    julian_day: i64,
    seconds: u32,
}

impl Time {
    pub fn new(julian_day: i64, seconds: u32) -> Self {
        assert!(seconds < SECONDS_IN_DAY as u32, "seconds of day out of range");
        Self { julian_day, seconds }
    }

    pub fn from_total_seconds(total: i64) -> Self {
        Self {
            julian_day: total.div_euclid(SECONDS_IN_DAY),
            seconds: total.rem_euclid(SECONDS_IN_DAY) as u32,
        }
    }

    pub fn total_seconds(&self) -> i64 {
        self.julian_day * SECONDS_IN_DAY + self.seconds as i64
    }

    pub fn julian_day(&self) -> i64 {
        self.julian_day
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Midnight at the start of this time's julian day.
    pub fn start_of_day(&self) -> Self {
        Self::new(self.julian_day, 0)
    }

    pub fn is_midnight(&self) -> bool {
        self.seconds == 0
    }

    /// Hour, minute and second of day.
    pub fn hms(&self) -> (u32, u32, u32) {
        let hour = self.seconds / 3600;
        let minute = (self.seconds % 3600) / 60;
        (hour, minute, self.seconds % 60)
    }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Time({}, {})", self.julian_day, self.seconds)
    }
}

/// A signed span of time in whole seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeDelta(i64);

impl TimeDelta {
    pub const ZERO: TimeDelta = TimeDelta(0);

    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    pub const fn from_minutes(minutes: i64) -> Self {
        Self(minutes * 60)
    }

    pub const fn from_hours(hours: i64) -> Self {
        Self(hours * SECONDS_IN_HOUR)
    }

    pub const fn from_days(days: i64) -> Self {
        Self(days * SECONDS_IN_DAY)
    }

    pub fn seconds(&self) -> i64 {
        self.0
    }

    pub fn whole_days(&self) -> i64 {
        self.0 / SECONDS_IN_DAY
    }

    /// Fractional number of days, used for pixel-space mapping.
    pub fn days_f64(&self) -> f64 {
        self.0 as f64 / SECONDS_IN_DAY as f64
    }

    pub fn half(&self) -> Self {
        Self(self.0 / 2)
    }

    /// The margin used around fitted periods, one twenty-fourth of the span.
    pub fn margin(&self) -> Self {
        Self(self.0 / 24)
    }

    /// Scale by a rational factor, rounding toward zero.
    pub fn scale(&self, factor: f64) -> Self {
        Self((self.0 as f64 * factor) as i64)
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }
}

impl Add<TimeDelta> for Time {
    type Output = Time;

    fn add(self, delta: TimeDelta) -> Time {
        Time::from_total_seconds(self.total_seconds() + delta.0)
    }
}

impl Sub<TimeDelta> for Time {
    type Output = Time;

    fn sub(self, delta: TimeDelta) -> Time {
        Time::from_total_seconds(self.total_seconds() - delta.0)
    }
}

impl Sub<Time> for Time {
    type Output = TimeDelta;

    fn sub(self, other: Time) -> TimeDelta {
        TimeDelta(self.total_seconds() - other.total_seconds())
    }
}

impl Add for TimeDelta {
    type Output = TimeDelta;

    fn add(self, other: TimeDelta) -> TimeDelta {
        TimeDelta(self.0 + other.0)
    }
}

impl Sub for TimeDelta {
    type Output = TimeDelta;

    fn sub(self, other: TimeDelta) -> TimeDelta {
        TimeDelta(self.0 - other.0)
    }
}

impl Mul<i64> for TimeDelta {
    type Output = TimeDelta;

    fn mul(self, factor: i64) -> TimeDelta {
        TimeDelta(self.0 * factor)
    }
}

/// Ratio between two deltas, used to map times into pixel space.
impl Div for TimeDelta {
    type Output = f64;

    fn div(self, other: TimeDelta) -> f64 {
        self.0 as f64 / other.0 as f64
    }
}

impl Neg for TimeDelta {
    type Output = TimeDelta;

    fn neg(self) -> TimeDelta {
        TimeDelta(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_order_lexicographically() {
        assert!(Time::new(10, 0) < Time::new(10, 1));
        assert!(Time::new(9, 86399) < Time::new(10, 0));
        assert!(Time::new(-5, 100) < Time::new(0, 0));
    }

    #[test]
    fn add_then_subtract_delta_is_identity() {
        let samples = [Time::new(0, 0), Time::new(2_451_545, 43_200), Time::new(-100, 1)];
        let deltas = [
            TimeDelta::from_seconds(1),
            TimeDelta::from_days(400),
            TimeDelta::from_seconds(-86_401),
        ];
        for t in samples {
            for d in deltas {
                assert_eq!((t + d) - d, t);
            }
        }
    }

    #[test]
    fn crossing_midnight_normalizes_seconds() {
        let t = Time::new(100, 86_399) + TimeDelta::from_seconds(2);
        assert_eq!(t, Time::new(101, 1));
        let t = Time::new(0, 0) - TimeDelta::from_seconds(1);
        assert_eq!(t, Time::new(-1, 86_399));
    }

    #[test]
    fn delta_between_times() {
        let a = Time::new(10, 100);
        let b = Time::new(11, 50);
        assert_eq!(b - a, TimeDelta::from_seconds(SECONDS_IN_DAY - 50));
        assert_eq!(a - b, -TimeDelta::from_seconds(SECONDS_IN_DAY - 50));
    }

    #[test]
    fn delta_division_is_rational() {
        let ratio = TimeDelta::from_hours(6) / TimeDelta::from_days(1);
        assert!((ratio - 0.25).abs() < 1e-12);
    }

    #[test]
    fn hms_splits_seconds_of_day() {
        let t = Time::new(0, 9 * 3600 + 30 * 60 + 15);
        assert_eq!(t.hms(), (9, 30, 15));
    }
}
