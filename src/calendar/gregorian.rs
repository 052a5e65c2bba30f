/// The Gregorian calendar, reference implementation of the TimeType contract.
///
/// Conversion between (year, month, day) and julian day numbers uses the
/// Fliegel-Van Flandern integer algorithm over the proleptic Gregorian
/// calendar with astronomical year numbering (year 0 exists; BC display is a
/// label concern only).
use chrono::{Datelike, Local, Timelike};

use crate::calendar::{DuplicateFunction, NavigationItem, Strip, TimeType};
use crate::config::Config;
use crate::error::{Result, TimelineError};
use crate::time::{SECONDS_IN_HOUR, Time, TimeDelta, TimePeriod};

pub const TIME_TYPE_NAME: &str = "gregoriantime";

const MONTH_NAMES_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const WEEKDAY_NAMES_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const OUT_OF_RANGE_LEFT: &str = "can't display dates before year 4713 BC";
const OUT_OF_RANGE_RIGHT: &str = "can't display dates after year 9989";

pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn ymd_to_julian_day(year: i64, month: u32, day: u32) -> i64 {
    let a = i64::from(14 - month) / 12;
    let y = year + 4800 - a;
    let m = i64::from(month) + 12 * a - 3;
    i64::from(day) + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045
}

pub fn julian_day_to_ymd(julian_day: i64) -> (i64, u32, u32) {
    let a = julian_day + 32044;
    let b = (4 * a + 3) / 146097;
    let c = a - (146097 * b) / 4;
    let d = (4 * c + 3) / 1461;
    let e = c - (1461 * d) / 4;
    let m = (5 * e + 2) / 153;
    let day = e - (153 * m + 2) / 5 + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = 100 * b + d - 4800 + m / 10;
    (year, month as u32, day as u32)
}

/// Weekday index for a julian day, 0 = Monday.
pub fn weekday(julian_day: i64) -> usize {
    julian_day.rem_euclid(7) as usize
}

/// A broken-down Gregorian date and time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GregorianDateTime {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl GregorianDateTime {
    pub fn new(year: i64, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Result<Self> {
        if month < 1 || month > 12 || day < 1 || day > days_in_month(year, month) {
            return Err(TimelineError::Parse(format!(
                "invalid date {year}-{month}-{day}"
            )));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(TimelineError::Parse(format!(
                "invalid time of day {hour}:{minute}:{second}"
            )));
        }
        Ok(Self { year, month, day, hour, minute, second })
    }

    pub fn from_time(time: Time) -> Self {
        let (year, month, day) = julian_day_to_ymd(time.julian_day());
        let (hour, minute, second) = time.hms();
        Self { year, month, day, hour, minute, second }
    }

    pub fn to_time(&self) -> Time {
        Time::new(
            ymd_to_julian_day(self.year, self.month, self.day),
            self.hour * 3600 + self.minute * 60 + self.second,
        )
    }
}

/// Midnight at the first day of the given year.
fn year_start(year: i64) -> Time {
    Time::new(ymd_to_julian_day(year, 1, 1), 0)
}

fn month_start(year: i64, month: u32) -> Time {
    Time::new(ymd_to_julian_day(year, month, 1), 0)
}

/// Shift a date by whole months, keeping the day of month and time of day.
/// Returns `None` when the target month is too short.
fn shift_months(date: &GregorianDateTime, months: i64) -> Option<GregorianDateTime> {
    let total = date.year * 12 + i64::from(date.month) - 1 + months;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;
    if date.day > days_in_month(year, month) {
        return None;
    }
    Some(GregorianDateTime { year, month, ..*date })
}

fn format_year(year: i64, bc: bool) -> String {
    if bc && year <= 0 {
        format!("{} BC", 1 - year)
    } else {
        format!("{year}")
    }
}

fn min_time() -> Time {
    Time::new(0, 0)
}

fn max_time() -> Time {
    year_start(9990)
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

fn now_time() -> Time {
    let now = Local::now();
    let jd = ymd_to_julian_day(i64::from(now.year()), now.month(), now.day());
    Time::new(jd, now.num_seconds_from_midnight())
}

// Navigation functions. Each consumes the displayed period and produces the
// new one, or a TimeOutOfRange error that leaves the caller's state alone.

fn go_to_today(period: &TimePeriod) -> Result<TimePeriod> {
    ensure_in_range(period.center(now_time()))
}

/// Center the displayed period on an explicit date.
pub fn go_to_date(period: &TimePeriod, time: Time) -> Result<TimePeriod> {
    ensure_in_range(period.center(time))
}

/// True when the period spans whole years exactly.
fn is_whole_years(period: &TimePeriod) -> bool {
    let start = GregorianDateTime::from_time(period.start());
    let end = GregorianDateTime::from_time(period.end());
    period.start() == year_start(start.year)
        && period.end() == year_start(end.year)
        && end.year > start.year
}

fn is_whole_months(period: &TimePeriod) -> bool {
    let start = GregorianDateTime::from_time(period.start());
    let end = GregorianDateTime::from_time(period.end());
    period.start() == month_start(start.year, start.month)
        && period.end() == month_start(end.year, end.month)
}

/// Page-smart move: whole years stay whole years, whole months stay whole
/// months, anything else moves by its own length.
fn move_page_smart(period: &TimePeriod, direction: i64) -> Result<TimePeriod> {
    if is_whole_years(period) {
        let start = GregorianDateTime::from_time(period.start());
        let end = GregorianDateTime::from_time(period.end());
        let span = end.year - start.year;
        let new_start = year_start(start.year + direction * span);
        let new_end = year_start(end.year + direction * span);
        return ensure_in_range(TimePeriod::new(new_start, new_end)?);
    }
    if is_whole_months(period) {
        let start = GregorianDateTime::from_time(period.start());
        let end = GregorianDateTime::from_time(period.end());
        let span = (end.year * 12 + i64::from(end.month))
            - (start.year * 12 + i64::from(start.month));
        let new_start = shift_months(&start, direction * span)
            .expect("day 1 exists in every month");
        let new_end = shift_months(&end, direction * span)
            .expect("day 1 exists in every month");
        return ensure_in_range(TimePeriod::new(new_start.to_time(), new_end.to_time())?);
    }
    ensure_in_range(period.move_delta(period.delta() * direction))
}

fn backward(period: &TimePeriod) -> Result<TimePeriod> {
    move_page_smart(period, -1)
}

fn forward(period: &TimePeriod) -> Result<TimePeriod> {
    move_page_smart(period, 1)
}

fn move_period_days(period: &TimePeriod, days: i64) -> Result<TimePeriod> {
    ensure_in_range(period.move_delta(TimeDelta::from_days(days)))
}

fn backward_one_week(period: &TimePeriod) -> Result<TimePeriod> {
    move_period_days(period, -7)
}

fn forward_one_week(period: &TimePeriod) -> Result<TimePeriod> {
    move_period_days(period, 7)
}

fn move_period_months(period: &TimePeriod, months: i64) -> Result<TimePeriod> {
    let start = shift_months(&GregorianDateTime::from_time(period.start()), months);
    let end = shift_months(&GregorianDateTime::from_time(period.end()), months);
    match (start, end) {
        (Some(start), Some(end)) => {
            ensure_in_range(TimePeriod::new(start.to_time(), end.to_time())?)
        }
        // Day-of-month does not exist in the target month; fall back to a
        // 30-day shift so the verb still does something sensible.
        _ => move_period_days(period, months * 30),
    }
}

fn backward_one_month(period: &TimePeriod) -> Result<TimePeriod> {
    move_period_months(period, -1)
}

fn forward_one_month(period: &TimePeriod) -> Result<TimePeriod> {
    move_period_months(period, 1)
}

fn backward_one_year(period: &TimePeriod) -> Result<TimePeriod> {
    move_period_months(period, -12)
}

fn forward_one_year(period: &TimePeriod) -> Result<TimePeriod> {
    move_period_months(period, 12)
}

fn fit_year_block(period: &TimePeriod, block: i64) -> Result<TimePeriod> {
    let mean = GregorianDateTime::from_time(period.mean_time());
    let start_year = mean.year.div_euclid(block) * block;
    ensure_in_range(TimePeriod::new(
        year_start(start_year),
        year_start(start_year + block),
    )?)
}

fn fit_millennium(period: &TimePeriod) -> Result<TimePeriod> {
    fit_year_block(period, 1000)
}

fn fit_century(period: &TimePeriod) -> Result<TimePeriod> {
    fit_year_block(period, 100)
}

fn fit_decade(period: &TimePeriod) -> Result<TimePeriod> {
    fit_year_block(period, 10)
}

fn fit_year(period: &TimePeriod) -> Result<TimePeriod> {
    fit_year_block(period, 1)
}

fn fit_month(period: &TimePeriod) -> Result<TimePeriod> {
    let mean = GregorianDateTime::from_time(period.mean_time());
    let start = month_start(mean.year, mean.month);
    let end = shift_months(
        &GregorianDateTime { day: 1, hour: 0, minute: 0, second: 0, ..mean },
        1,
    )
    .expect("day 1 exists in every month")
    .to_time();
    ensure_in_range(TimePeriod::new(start, end)?)
}

fn fit_week(period: &TimePeriod) -> Result<TimePeriod> {
    let mean = period.mean_time();
    let monday = mean.julian_day() - weekday(mean.julian_day()) as i64;
    ensure_in_range(TimePeriod::new(Time::new(monday, 0), Time::new(monday + 7, 0))?)
}

fn fit_day(period: &TimePeriod) -> Result<TimePeriod> {
    let day = period.mean_time().julian_day();
    ensure_in_range(TimePeriod::new(Time::new(day, 0), Time::new(day + 1, 0))?)
}

// Duplicate-placement functions.

fn move_by_period(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    let moved = period.move_delta(period.delta() * count);
    ensure_in_range(moved).ok()
}

fn move_by_days(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    ensure_in_range(period.move_delta(TimeDelta::from_days(count))).ok()
}

fn move_by_weeks(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    move_by_days(period, count * 7)
}

fn move_by_months(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    let start = shift_months(&GregorianDateTime::from_time(period.start()), count)?;
    let end = shift_months(&GregorianDateTime::from_time(period.end()), count)?;
    let moved = TimePeriod::new(start.to_time(), end.to_time()).ok()?;
    ensure_in_range(moved).ok()
}

fn move_by_years(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    move_by_months(period, count * 12)
}

// Strips.

struct CenturyStrip {
    bc: bool,
}

impl Strip for CenturyStrip {
    fn start(&self, time: Time) -> Time {
        let (year, _, _) = julian_day_to_ymd(time.julian_day());
        year_start(year.div_euclid(100) * 100)
    }

    fn increment(&self, time: Time) -> Time {
        let (year, _, _) = julian_day_to_ymd(time.julian_day());
        year_start(year + 100)
    }

    fn label(&self, time: Time, _major: bool) -> String {
        let (year, _, _) = julian_day_to_ymd(time.julian_day());
        if self.bc && year < 0 {
            format!("{}s BC", -year)
        } else {
            format!("{year}s")
        }
    }
}

struct DecadeStrip;

impl Strip for DecadeStrip {
    fn start(&self, time: Time) -> Time {
        let (year, _, _) = julian_day_to_ymd(time.julian_day());
        year_start(year.div_euclid(10) * 10)
    }

    fn increment(&self, time: Time) -> Time {
        let (year, _, _) = julian_day_to_ymd(time.julian_day());
        year_start(year + 10)
    }

    fn label(&self, time: Time, _major: bool) -> String {
        let (year, _, _) = julian_day_to_ymd(time.julian_day());
        format!("{year}s")
    }
}

struct YearStrip {
    bc: bool,
}

impl Strip for YearStrip {
    fn start(&self, time: Time) -> Time {
        let (year, _, _) = julian_day_to_ymd(time.julian_day());
        year_start(year)
    }

    fn increment(&self, time: Time) -> Time {
        let (year, _, _) = julian_day_to_ymd(time.julian_day());
        year_start(year + 1)
    }

    fn label(&self, time: Time, _major: bool) -> String {
        let (year, _, _) = julian_day_to_ymd(time.julian_day());
        format_year(year, self.bc)
    }
}

struct MonthStrip {
    bc: bool,
}

impl Strip for MonthStrip {
    fn start(&self, time: Time) -> Time {
        let (year, month, _) = julian_day_to_ymd(time.julian_day());
        month_start(year, month)
    }

    fn increment(&self, time: Time) -> Time {
        let (year, month, _) = julian_day_to_ymd(time.julian_day());
        if month == 12 {
            month_start(year + 1, 1)
        } else {
            month_start(year, month + 1)
        }
    }

    fn label(&self, time: Time, major: bool) -> String {
        let (year, month, _) = julian_day_to_ymd(time.julian_day());
        let name = MONTH_NAMES_SHORT[(month - 1) as usize];
        if major {
            format!("{name} {}", format_year(year, self.bc))
        } else {
            name.to_string()
        }
    }
}

struct WeekStrip;

impl Strip for WeekStrip {
    fn start(&self, time: Time) -> Time {
        let monday = time.julian_day() - weekday(time.julian_day()) as i64;
        Time::new(monday, 0)
    }

    fn increment(&self, time: Time) -> Time {
        Time::new(self.start(time).julian_day() + 7, 0)
    }

    fn label(&self, time: Time, _major: bool) -> String {
        let (year, _, _) = julian_day_to_ymd(time.julian_day());
        let days_into_year = time.julian_day() - year_start(year).julian_day();
        format!("Week {}", days_into_year / 7 + 1)
    }
}

struct DayStrip {
    bc: bool,
}

impl Strip for DayStrip {
    fn start(&self, time: Time) -> Time {
        time.start_of_day()
    }

    fn increment(&self, time: Time) -> Time {
        Time::new(time.julian_day() + 1, 0)
    }

    fn label(&self, time: Time, major: bool) -> String {
        let (year, month, day) = julian_day_to_ymd(time.julian_day());
        if major {
            format!(
                "{} {day} {} {}",
                WEEKDAY_NAMES_SHORT[weekday(time.julian_day())],
                MONTH_NAMES_SHORT[(month - 1) as usize],
                format_year(year, self.bc),
            )
        } else {
            format!("{day}")
        }
    }
}

struct WeekdayStrip;

impl Strip for WeekdayStrip {
    fn start(&self, time: Time) -> Time {
        time.start_of_day()
    }

    fn increment(&self, time: Time) -> Time {
        Time::new(time.julian_day() + 1, 0)
    }

    fn label(&self, time: Time, _major: bool) -> String {
        let (_, _, day) = julian_day_to_ymd(time.julian_day());
        format!("{} {day}", WEEKDAY_NAMES_SHORT[weekday(time.julian_day())])
    }
}

struct HourStrip;

impl Strip for HourStrip {
    fn start(&self, time: Time) -> Time {
        Time::new(time.julian_day(), time.seconds() / 3600 * 3600)
    }

    fn increment(&self, time: Time) -> Time {
        self.start(time) + TimeDelta::from_hours(1)
    }

    fn label(&self, time: Time, _major: bool) -> String {
        format!("{}", time.seconds() / 3600)
    }
}

#[derive(Debug)]
pub struct GregorianTimeType;

impl TimeType for GregorianTimeType {
    fn name(&self) -> &'static str {
        TIME_TYPE_NAME
    }

    fn time_string(&self, time: Time) -> String {
        let dt = GregorianDateTime::from_time(time);
        format!(
            "{}-{:02}-{:02} {:02}:{:02}:{:02}",
            dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
        )
    }

    fn parse_time(&self, text: &str) -> Result<Time> {
        let bad = || TimelineError::Parse(format!("bad time string '{text}'"));
        let (date_part, time_part) = text.split_once(' ').ok_or_else(bad)?;
        let (negative, date_digits) = match date_part.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, date_part),
        };
        let date: Vec<&str> = date_digits.split('-').collect();
        let clock: Vec<&str> = time_part.split(':').collect();
        if date.len() != 3 || clock.len() != 3 {
            return Err(bad());
        }
        let num = |s: &str| -> Result<i64> { s.parse().map_err(|_| bad()) };
        let mut year = num(date[0])?;
        if negative {
            year = -year;
        }
        let dt = GregorianDateTime::new(
            year,
            num(date[1])? as u32,
            num(date[2])? as u32,
            num(clock[0])? as u32,
            num(clock[1])? as u32,
            num(clock[2])? as u32,
        )?;
        Ok(dt.to_time())
    }

    fn format_period(&self, period: &TimePeriod) -> String {
        let label = |time: Time| {
            let dt = GregorianDateTime::from_time(time);
            let date = format!(
                "{} {} {}",
                dt.day,
                MONTH_NAMES_SHORT[(dt.month - 1) as usize],
                format_year(dt.year, true)
            );
            if time.is_midnight() {
                date
            } else {
                format!("{date} {:02}:{:02}", dt.hour, dt.minute)
            }
        };
        if period.is_point() {
            label(period.start())
        } else {
            format!("{} to {}", label(period.start()), label(period.end()))
        }
    }

    fn format_delta(&self, delta: TimeDelta) -> String {
        let total = delta.seconds().abs();
        let days = total / 86_400;
        let hours = total % 86_400 / 3_600;
        let minutes = total % 3_600 / 60;
        let mut parts = Vec::new();
        if days == 1 {
            parts.push("1 day".to_string());
        } else if days > 1 {
            parts.push(format!("{days} days"));
        }
        if hours > 0 {
            parts.push(format!("{hours} h"));
        }
        if minutes > 0 {
            parts.push(format!("{minutes} min"));
        }
        if parts.is_empty() {
            parts.push("0 min".to_string());
        }
        parts.join(" ")
    }

    fn min_time(&self) -> Time {
        min_time()
    }

    fn max_time(&self) -> Time {
        max_time()
    }

    fn now(&self) -> Time {
        now_time()
    }

    fn min_zoom_delta(&self) -> TimeDelta {
        TimeDelta::from_seconds(SECONDS_IN_HOUR)
    }

    fn max_zoom_delta(&self) -> Option<TimeDelta> {
        Some(max_time() - min_time())
    }

    fn is_date_time(&self) -> bool {
        true
    }

    fn navigation_functions(&self) -> Vec<NavigationItem> {
        use NavigationItem::{Entry, Separator};
        vec![
            Entry { label: "Go to Today", func: go_to_today },
            Separator,
            Entry { label: "Backward", func: backward },
            Entry { label: "Forward", func: forward },
            Separator,
            Entry { label: "Backward One Week", func: backward_one_week },
            Entry { label: "Forward One Week", func: forward_one_week },
            Entry { label: "Backward One Month", func: backward_one_month },
            Entry { label: "Forward One Month", func: forward_one_month },
            Entry { label: "Backward One Year", func: backward_one_year },
            Entry { label: "Forward One Year", func: forward_one_year },
            Separator,
            Entry { label: "Fit Millennium", func: fit_millennium },
            Entry { label: "Fit Century", func: fit_century },
            Entry { label: "Fit Decade", func: fit_decade },
            Entry { label: "Fit Year", func: fit_year },
            Entry { label: "Fit Month", func: fit_month },
            Entry { label: "Fit Week", func: fit_week },
            Entry { label: "Fit Day", func: fit_day },
        ]
    }

    fn duplicate_functions(&self) -> Vec<DuplicateFunction> {
        vec![
            DuplicateFunction { label: "Period", func: move_by_period },
            DuplicateFunction { label: "Day", func: move_by_days },
            DuplicateFunction { label: "Week", func: move_by_weeks },
            DuplicateFunction { label: "Month", func: move_by_months },
            DuplicateFunction { label: "Year", func: move_by_years },
        ]
    }

    fn choose_strips(&self, day_px: f64, config: &Config) -> (Box<dyn Strip>, Box<dyn Strip>) {
        let bc = config.use_bc_notation;
        if day_px >= 600.0 {
            (Box::new(DayStrip { bc }), Box::new(HourStrip))
        } else if day_px >= 45.0 {
            (Box::new(WeekStrip), Box::new(WeekdayStrip))
        } else if day_px >= 25.0 {
            (Box::new(MonthStrip { bc }), Box::new(DayStrip { bc }))
        } else if day_px >= 1.5 {
            (Box::new(YearStrip { bc }), Box::new(MonthStrip { bc }))
        } else if day_px >= 0.12 {
            (Box::new(DecadeStrip), Box::new(YearStrip { bc }))
        } else if day_px >= 0.012 {
            (Box::new(CenturyStrip { bc }), Box::new(DecadeStrip))
        } else {
            (Box::new(CenturyStrip { bc }), Box::new(CenturyStrip { bc }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(year: i64, month: u32, day: u32, h: u32, m: u32, s: u32) -> Time {
        GregorianDateTime::new(year, month, day, h, m, s).unwrap().to_time()
    }

    fn period(start: Time, end: Time) -> TimePeriod {
        TimePeriod::new(start, end).unwrap()
    }

    #[test]
    fn julian_day_round_trip() {
        for &(y, m, d) in &[
            (2000, 1, 1),
            (2020, 2, 29),
            (1582, 10, 15),
            (-44, 3, 15),
            (-4713, 11, 24),
            (9989, 12, 31),
        ] {
            let jd = ymd_to_julian_day(y, m, d);
            assert_eq!(julian_day_to_ymd(jd), (y, m, d), "for {y}-{m}-{d}");
        }
        assert_eq!(ymd_to_julian_day(2000, 1, 1), 2_451_545);
        assert_eq!(ymd_to_julian_day(-4713, 11, 24), 0);
    }

    #[test]
    fn weekday_of_known_dates() {
        // 2000-01-01 was a Saturday, 2020-01-01 a Wednesday.
        assert_eq!(weekday(ymd_to_julian_day(2000, 1, 1)), 5);
        assert_eq!(weekday(ymd_to_julian_day(2020, 1, 1)), 2);
    }

    #[test]
    fn leap_year_rules() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2020));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2019));
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
    }

    #[test]
    fn time_string_round_trip() {
        let tt = GregorianTimeType;
        for text in ["2020-01-01 09:00:00", "-44-03-15 23:59:59", "9989-12-31 00:00:01"] {
            let parsed = tt.parse_time(text).unwrap();
            assert_eq!(tt.time_string(parsed), text);
        }
    }

    #[test]
    fn parse_rejects_invalid_dates() {
        let tt = GregorianTimeType;
        assert!(tt.parse_time("2020-02-30 00:00:00").is_err());
        assert!(tt.parse_time("2020-13-01 00:00:00").is_err());
        assert!(tt.parse_time("2020-01-01 24:00:00").is_err());
        assert!(tt.parse_time("2020-01-01").is_err());
        assert!(tt.parse_time("next tuesday").is_err());
    }

    #[test]
    fn page_smart_forward_whole_month() {
        let p = period(time(2020, 1, 1, 0, 0, 0), time(2020, 2, 1, 0, 0, 0));
        let next = forward(&p).unwrap();
        assert_eq!(next.start(), time(2020, 2, 1, 0, 0, 0));
        assert_eq!(next.end(), time(2020, 3, 1, 0, 0, 0));
    }

    #[test]
    fn page_smart_forward_whole_years() {
        let p = period(time(2000, 1, 1, 0, 0, 0), time(2002, 1, 1, 0, 0, 0));
        let next = forward(&p).unwrap();
        assert_eq!(next.start(), time(2002, 1, 1, 0, 0, 0));
        assert_eq!(next.end(), time(2004, 1, 1, 0, 0, 0));
    }

    #[test]
    fn page_smart_plain_period_moves_own_length() {
        let p = period(time(2020, 1, 10, 6, 0, 0), time(2020, 1, 12, 6, 0, 0));
        let next = forward(&p).unwrap();
        assert_eq!(next.start(), time(2020, 1, 12, 6, 0, 0));
        assert_eq!(next.end(), time(2020, 1, 14, 6, 0, 0));
    }

    #[test]
    fn forward_past_max_is_out_of_range_right() {
        let p = period(time(9989, 12, 1, 0, 0, 0), time(9990, 1, 1, 0, 0, 0));
        match forward(&p) {
            Err(TimelineError::TimeOutOfRangeRight(_)) => {}
            other => panic!("expected TimeOutOfRangeRight, got {other:?}"),
        }
    }

    #[test]
    fn backward_past_min_is_out_of_range_left() {
        let min = min_time();
        let p = period(min, min + TimeDelta::from_days(30));
        match backward(&p) {
            Err(TimelineError::TimeOutOfRangeLeft(_)) => {}
            other => panic!("expected TimeOutOfRangeLeft, got {other:?}"),
        }
    }

    #[test]
    fn fit_functions_produce_aligned_periods() {
        let p = period(time(2020, 5, 10, 0, 0, 0), time(2020, 5, 20, 0, 0, 0));
        let year = fit_year(&p).unwrap();
        assert_eq!(year.start(), time(2020, 1, 1, 0, 0, 0));
        assert_eq!(year.end(), time(2021, 1, 1, 0, 0, 0));
        let month = fit_month(&p).unwrap();
        assert_eq!(month.start(), time(2020, 5, 1, 0, 0, 0));
        assert_eq!(month.end(), time(2020, 6, 1, 0, 0, 0));
        let day = fit_day(&p).unwrap();
        assert_eq!(day.delta(), TimeDelta::from_days(1));
        let week = fit_week(&p).unwrap();
        assert_eq!(weekday(week.start().julian_day()), 0);
        assert_eq!(week.delta(), TimeDelta::from_days(7));
        let century = fit_century(&p).unwrap();
        assert_eq!(century.start(), time(2000, 1, 1, 0, 0, 0));
    }

    #[test]
    fn duplicate_month_skips_missing_days() {
        let p = period(time(2020, 1, 31, 0, 0, 0), time(2020, 1, 31, 0, 0, 0));
        assert!(move_by_months(&p, 1).is_none());
        let ok = move_by_months(&p, 2).unwrap();
        assert_eq!(ok.start(), time(2020, 3, 31, 0, 0, 0));
    }

    #[test]
    fn strip_choice_thresholds() {
        let tt = GregorianTimeType;
        let config = Config::default();
        let label_at = |day_px: f64| {
            let (major, minor) = tt.choose_strips(day_px, &config);
            let t = time(2020, 6, 15, 13, 30, 0);
            (major.label(major.start(t), true), minor.label(minor.start(t), false))
        };
        // Boundary values select the finer pairing (>=, not >).
        assert_eq!(label_at(600.0).1, "13");
        assert_eq!(label_at(45.0).0, "Week 24");
        assert_eq!(label_at(25.0).1, "15");
        assert_eq!(label_at(1.5).0, "2020");
        assert_eq!(label_at(0.12).0, "2020s");
        assert_eq!(label_at(0.012).0, "2000s");
        assert_eq!(label_at(0.001).1, "2000s");
    }

    #[test]
    fn month_strip_boundaries() {
        let strip = MonthStrip { bc: true };
        let t = time(2020, 12, 15, 8, 0, 0);
        assert_eq!(strip.start(t), time(2020, 12, 1, 0, 0, 0));
        assert_eq!(strip.increment(t), time(2021, 1, 1, 0, 0, 0));
        assert_eq!(strip.label(t, true), "Dec 2020");
    }

    #[test]
    fn bc_years_label_without_year_zero() {
        assert_eq!(format_year(0, true), "1 BC");
        assert_eq!(format_year(-43, true), "44 BC");
        assert_eq!(format_year(2020, true), "2020");
        assert_eq!(format_year(0, false), "0");
    }

    #[test]
    fn format_delta_breaks_into_units() {
        let tt = GregorianTimeType;
        assert_eq!(tt.format_delta(TimeDelta::from_days(2)), "2 days");
        assert_eq!(
            tt.format_delta(TimeDelta::from_seconds(90_060)),
            "1 day 1 h 1 min"
        );
        assert_eq!(tt.format_delta(TimeDelta::ZERO), "0 min");
    }
}
