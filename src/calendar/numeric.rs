/// Plain-integer time. One unit maps onto one julian day of the shared time
/// representation; there is no time of day and no calendar structure beyond
/// arithmetic progressions.
use crate::calendar::{DuplicateFunction, NavigationItem, Strip, TimeType};
use crate::config::Config;
use crate::error::{Result, TimelineError};
use crate::time::{Time, TimeDelta, TimePeriod};

pub const TIME_TYPE_NAME: &str = "numtime";

const MIN_VALUE: i64 = -10_000_000_000;
const MAX_VALUE: i64 = 10_000_000_000;

const OUT_OF_RANGE_LEFT: &str = "can't display values below the numeric minimum";
const OUT_OF_RANGE_RIGHT: &str = "can't display values above the numeric maximum";

fn from_value(value: i64) -> Time {
    Time::new(value, 0)
}

fn value_of(time: Time) -> i64 {
    time.julian_day()
}

fn min_time() -> Time {
    from_value(MIN_VALUE)
}

fn max_time() -> Time {
    from_value(MAX_VALUE)
}

fn ensure_in_range(period: TimePeriod) -> Result<TimePeriod> {
    if period.start() < min_time() {
        Err(TimelineError::TimeOutOfRangeLeft(OUT_OF_RANGE_LEFT.into()))
    } else if period.end() > max_time() {
        Err(TimelineError::TimeOutOfRangeRight(OUT_OF_RANGE_RIGHT.into()))
    } else {
        Ok(period)
    }
}

fn go_to_zero(period: &TimePeriod) -> Result<TimePeriod> {
    ensure_in_range(period.center(from_value(0)))
}

fn backward(period: &TimePeriod) -> Result<TimePeriod> {
    ensure_in_range(period.move_delta(-period.delta()))
}

fn forward(period: &TimePeriod) -> Result<TimePeriod> {
    ensure_in_range(period.move_delta(period.delta()))
}

fn fit_block(period: &TimePeriod, block: i64) -> Result<TimePeriod> {
    let mean = value_of(period.mean_time());
    let start = mean.div_euclid(block) * block;
    ensure_in_range(TimePeriod::new(from_value(start), from_value(start + block))?)
}

fn fit_ten(period: &TimePeriod) -> Result<TimePeriod> {
    fit_block(period, 10)
}

fn fit_hundred(period: &TimePeriod) -> Result<TimePeriod> {
    fit_block(period, 100)
}

fn fit_thousand(period: &TimePeriod) -> Result<TimePeriod> {
    fit_block(period, 1000)
}

fn move_by_period(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    ensure_in_range(period.move_delta(period.delta() * count)).ok()
}

fn move_by_one(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    ensure_in_range(period.move_delta(TimeDelta::from_days(count))).ok()
}

/// Strips of a fixed integer size; the major strip is ten times the minor.
struct NumStrip {
    size: i64,
}

impl Strip for NumStrip {
    fn start(&self, time: Time) -> Time {
        from_value(value_of(time).div_euclid(self.size) * self.size)
    }

    fn increment(&self, time: Time) -> Time {
        from_value(self.start(time).julian_day() + self.size)
    }

    fn label(&self, time: Time, _major: bool) -> String {
        format!("{}", value_of(time))
    }
}

/// Smallest power of ten whose strip is at least `min_px` wide.
fn strip_size_for(unit_px: f64, min_px: f64) -> i64 {
    let mut size: i64 = 1;
    while (size as f64) * unit_px < min_px && size < MAX_VALUE {
        size *= 10;
    }
    size
}

#[derive(Debug)]
pub struct NumericTimeType;

impl TimeType for NumericTimeType {
    fn name(&self) -> &'static str {
        TIME_TYPE_NAME
    }

    fn time_string(&self, time: Time) -> String {
        format!("{}", value_of(time))
    }

    fn parse_time(&self, text: &str) -> Result<Time> {
        text.trim()
            .parse::<i64>()
            .map(from_value)
            .map_err(|_| TimelineError::Parse(format!("bad numeric time '{text}'")))
    }

    fn format_period(&self, period: &TimePeriod) -> String {
        if period.is_point() {
            self.time_string(period.start())
        } else {
            format!(
                "{} to {}",
                self.time_string(period.start()),
                self.time_string(period.end())
            )
        }
    }

    fn format_delta(&self, delta: TimeDelta) -> String {
        format!("{}", delta.seconds().abs() / crate::time::SECONDS_IN_DAY)
    }

    fn min_time(&self) -> Time {
        min_time()
    }

    fn max_time(&self) -> Time {
        max_time()
    }

    fn now(&self) -> Time {
        from_value(0)
    }

    fn min_zoom_delta(&self) -> TimeDelta {
        TimeDelta::from_days(1)
    }

    fn max_zoom_delta(&self) -> Option<TimeDelta> {
        None
    }

    fn is_date_time(&self) -> bool {
        false
    }

    fn navigation_functions(&self) -> Vec<NavigationItem> {
        use NavigationItem::{Entry, Separator};
        vec![
            Entry { label: "Go to Zero", func: go_to_zero },
            Separator,
            Entry { label: "Backward", func: backward },
            Entry { label: "Forward", func: forward },
            Separator,
            Entry { label: "Fit 10", func: fit_ten },
            Entry { label: "Fit 100", func: fit_hundred },
            Entry { label: "Fit 1000", func: fit_thousand },
        ]
    }

    fn duplicate_functions(&self) -> Vec<DuplicateFunction> {
        vec![
            DuplicateFunction { label: "Period", func: move_by_period },
            DuplicateFunction { label: "Unit", func: move_by_one },
        ]
    }

    fn choose_strips(&self, day_px: f64, _config: &Config) -> (Box<dyn Strip>, Box<dyn Strip>) {
        let minor = strip_size_for(day_px, 25.0);
        (Box::new(NumStrip { size: minor * 10 }), Box::new(NumStrip { size: minor }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_round_trip() {
        let tt = NumericTimeType;
        for text in ["0", "42", "-17", "1000000"] {
            assert_eq!(tt.time_string(tt.parse_time(text).unwrap()), text);
        }
        assert!(tt.parse_time("3.5").is_err());
        assert!(tt.parse_time("ten").is_err());
    }

    #[test]
    fn navigation_is_an_arithmetic_progression() {
        let p = TimePeriod::new(from_value(0), from_value(10)).unwrap();
        let next = forward(&p).unwrap();
        assert_eq!(value_of(next.start()), 10);
        assert_eq!(value_of(next.end()), 20);
        let prev = backward(&p).unwrap();
        assert_eq!(value_of(prev.start()), -10);
    }

    #[test]
    fn fit_functions_align_to_blocks() {
        let p = TimePeriod::new(from_value(234), from_value(236)).unwrap();
        let ten = fit_ten(&p).unwrap();
        assert_eq!((value_of(ten.start()), value_of(ten.end())), (230, 240));
        let hundred = fit_hundred(&p).unwrap();
        assert_eq!((value_of(hundred.start()), value_of(hundred.end())), (200, 300));
    }

    #[test]
    fn strip_size_scales_with_zoom() {
        assert_eq!(strip_size_for(30.0, 25.0), 1);
        assert_eq!(strip_size_for(3.0, 25.0), 10);
        assert_eq!(strip_size_for(0.03, 25.0), 1000);
    }

    #[test]
    fn strips_align_on_multiples() {
        let strip = NumStrip { size: 10 };
        assert_eq!(value_of(strip.start(from_value(37))), 30);
        assert_eq!(value_of(strip.start(from_value(-37))), -40);
        assert_eq!(value_of(strip.increment(from_value(37))), 40);
    }
}
