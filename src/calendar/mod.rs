/// The polymorphic calendar contract.
///
/// Every calendar system (Gregorian, the fictional Bosparanian one, plain
/// numeric time) implements [`TimeType`]; all higher layers dispatch through
/// it and never branch on a concrete calendar.
pub mod bosparanian;
pub mod gregorian;
pub mod numeric;

use std::fmt::Debug;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::time::{Time, TimeDelta, TimePeriod};

/// A navigation menu entry, or a separator hint between groups.
pub enum NavigationItem {
    Separator,
    Entry {
        label: &'static str,
        func: fn(&TimePeriod) -> Result<TimePeriod>,
    },
}

/// A "duplicate event" placement rule: move `period` by `count` units, or
/// `None` when the target date does not exist (e.g. Jan 31 + 1 month).
pub struct DuplicateFunction {
    pub label: &'static str,
    pub func: fn(&TimePeriod, i64) -> Option<TimePeriod>,
}

/// An axis subdivision: rounds times down to strip boundaries, steps to the
/// next boundary and labels each strip.
pub trait Strip {
    /// Round down to the boundary at or before `time`.
    fn start(&self, time: Time) -> Time;
    /// The boundary following `time`'s strip.
    fn increment(&self, time: Time) -> Time;
    /// Label for the strip starting at `time`. Major strips get the verbose
    /// form.
    fn label(&self, time: Time, major: bool) -> String;
}

pub trait TimeType: Debug {
    /// The on-disk `<timetype>` name.
    fn name(&self) -> &'static str;

    /// Round-trip text form for the on-disk format.
    fn time_string(&self, time: Time) -> String;
    fn parse_time(&self, text: &str) -> Result<Time>;

    /// Human display forms.
    fn format_period(&self, period: &TimePeriod) -> String;
    fn format_delta(&self, delta: TimeDelta) -> String;

    /// Inclusive bounds; arithmetic beyond them fails with TimeOutOfRange.
    fn min_time(&self) -> Time;
    fn max_time(&self) -> Time;

    fn now(&self) -> Time;

    fn min_zoom_delta(&self) -> TimeDelta;
    fn max_zoom_delta(&self) -> Option<TimeDelta>;

    /// Whether times carry a time-of-day worth displaying.
    fn is_date_time(&self) -> bool;

    fn navigation_functions(&self) -> Vec<NavigationItem>;
    fn duplicate_functions(&self) -> Vec<DuplicateFunction>;

    /// Pick (major, minor) strips for the current zoom level given the pixel
    /// width of one day.
    fn choose_strips(&self, day_px: f64, config: &Config) -> (Box<dyn Strip>, Box<dyn Strip>);
}

/// Look up a time type by its on-disk name.
pub fn time_type_by_name(name: &str) -> Option<Arc<dyn TimeType>> {
    match name {
        gregorian::TIME_TYPE_NAME => Some(Arc::new(gregorian::GregorianTimeType)),
        bosparanian::TIME_TYPE_NAME => Some(Arc::new(bosparanian::BosparanianTimeType)),
        numeric::TIME_TYPE_NAME => Some(Arc::new(numeric::NumericTimeType)),
        _ => None,
    }
}

pub fn gregorian_time_type() -> Arc<dyn TimeType> {
    Arc::new(gregorian::GregorianTimeType)
}

/// The whole valid range of a time type as a period.
pub fn valid_period(time_type: &dyn TimeType) -> TimePeriod {
    TimePeriod::new(time_type.min_time(), time_type.max_time())
        .expect("time type bounds are ordered")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_all_calendars() {
        for name in ["gregoriantime", "bosparaniantime", "numtime"] {
            let time_type = time_type_by_name(name).unwrap();
            assert_eq!(time_type.name(), name);
        }
        assert!(time_type_by_name("klingon").is_none());
    }
}
