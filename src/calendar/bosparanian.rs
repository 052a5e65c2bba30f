/// The Bosparanian calendar, a fictional 13-month system.
///
/// Twelve months of 30 days are followed by the five Nameless Days; years are
/// always 365 days long. The mapping onto julian days applies a fixed offset
/// of 73 centuries and a -3 day shift that aligns Bosparanian weekdays with
/// their reference day. Both constants are part of this calendar's contract
/// and must not change, or existing timeline files shift.
use crate::calendar::{DuplicateFunction, NavigationItem, Strip, TimeType};
use crate::config::Config;
use crate::error::{Result, TimelineError};
use crate::time::{SECONDS_IN_HOUR, Time, TimeDelta, TimePeriod};

pub const TIME_TYPE_NAME: &str = "bosparaniantime";

const DAYS_IN_YEAR: i64 = 365;
const CENTURY_OFFSET_DAYS: i64 = 73 * 100 * DAYS_IN_YEAR;
const WEEKDAY_ALIGNMENT_DAYS: i64 = -3;
const EPOCH_SHIFT: i64 = CENTURY_OFFSET_DAYS - WEEKDAY_ALIGNMENT_DAYS;

const MONTH_NAMES: [&str; 13] = [
    "Praios", "Rondra", "Efferd", "Travia", "Boron", "Hesinde", "Firun", "Tsa", "Phex",
    "Peraine", "Ingerimm", "Rahja", "Namenlose",
];
const WEEKDAY_NAMES: [&str; 7] = [
    "Windstag", "Erdtag", "Markttag", "Praiostag", "Rohalstag", "Feuertag", "Wassertag",
];

const OUT_OF_RANGE_LEFT: &str = "can't display dates before Bosparanian year 0";
const OUT_OF_RANGE_RIGHT: &str = "can't display dates after Bosparanian year 16999";

pub fn days_in_month(month: u32) -> u32 {
    if month == 13 { 5 } else { 30 }
}

/// Day count since the Bosparanian epoch for a date.
fn ymd_to_day_count(year: i64, month: u32, day: u32) -> i64 {
    year * DAYS_IN_YEAR + i64::from(month - 1) * 30 + i64::from(day) - 1
}

fn day_count_to_ymd(day_count: i64) -> (i64, u32, u32) {
    let year = day_count.div_euclid(DAYS_IN_YEAR);
    let of_year = day_count.rem_euclid(DAYS_IN_YEAR) as u32;
    let month = (of_year / 30).min(12) + 1;
    let day = of_year - (month - 1) * 30 + 1;
    (year, month, day)
}

pub fn ymd_to_julian_day(year: i64, month: u32, day: u32) -> i64 {
    ymd_to_day_count(year, month, day) - EPOCH_SHIFT
}

pub fn julian_day_to_ymd(julian_day: i64) -> (i64, u32, u32) {
    day_count_to_ymd(julian_day + EPOCH_SHIFT)
}

/// Weekday index, 0 = Windstag. The -3 alignment shift puts the first of
/// Praios 7300 on a Windstag.
pub fn weekday(julian_day: i64) -> usize {
    (julian_day - WEEKDAY_ALIGNMENT_DAYS).rem_euclid(7) as usize
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BosparanianDateTime {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl BosparanianDateTime {
    pub fn new(year: i64, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Result<Self> {
        if month < 1 || month > 13 || day < 1 || day > days_in_month(month) {
            return Err(TimelineError::Parse(format!(
                "invalid Bosparanian date {year}-{month}-{day}"
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

fn year_start(year: i64) -> Time {
    Time::new(ymd_to_julian_day(year, 1, 1), 0)
}

fn month_start(year: i64, month: u32) -> Time {
    Time::new(ymd_to_julian_day(year, month, 1), 0)
}

fn min_time() -> Time {
    year_start(0)
}

fn max_time() -> Time {
    year_start(17_000)
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
    // The fictional "today" tracks the real wall clock through the epoch
    // shift, so opening a Bosparanian timeline lands on a stable date.
    super::gregorian::GregorianTimeType.now()
}

fn shift_months(date: &BosparanianDateTime, months: i64) -> Option<BosparanianDateTime> {
    let total = date.year * 13 + i64::from(date.month) - 1 + months;
    let year = total.div_euclid(13);
    let month = (total.rem_euclid(13) + 1) as u32;
    if date.day > days_in_month(month) {
        return None;
    }
    Some(BosparanianDateTime { year, month, ..*date })
}

fn go_to_today(period: &TimePeriod) -> Result<TimePeriod> {
    ensure_in_range(period.center(now_time()))
}

fn is_whole_years(period: &TimePeriod) -> bool {
    let start = BosparanianDateTime::from_time(period.start());
    let end = BosparanianDateTime::from_time(period.end());
    period.start() == year_start(start.year)
        && period.end() == year_start(end.year)
        && end.year > start.year
}

fn move_page_smart(period: &TimePeriod, direction: i64) -> Result<TimePeriod> {
    if is_whole_years(period) {
        let start = BosparanianDateTime::from_time(period.start());
        let end = BosparanianDateTime::from_time(period.end());
        let span = end.year - start.year;
        return ensure_in_range(TimePeriod::new(
            year_start(start.year + direction * span),
            year_start(end.year + direction * span),
        )?);
    }
    ensure_in_range(period.move_delta(period.delta() * direction))
}

fn backward(period: &TimePeriod) -> Result<TimePeriod> {
    move_page_smart(period, -1)
}

fn forward(period: &TimePeriod) -> Result<TimePeriod> {
    move_page_smart(period, 1)
}

fn fit_year(period: &TimePeriod) -> Result<TimePeriod> {
    let mean = BosparanianDateTime::from_time(period.mean_time());
    ensure_in_range(TimePeriod::new(year_start(mean.year), year_start(mean.year + 1))?)
}

fn fit_month(period: &TimePeriod) -> Result<TimePeriod> {
    let mean = BosparanianDateTime::from_time(period.mean_time());
    let end = if mean.month == 13 {
        year_start(mean.year + 1)
    } else {
        month_start(mean.year, mean.month + 1)
    };
    ensure_in_range(TimePeriod::new(month_start(mean.year, mean.month), end)?)
}

fn fit_day(period: &TimePeriod) -> Result<TimePeriod> {
    let day = period.mean_time().julian_day();
    ensure_in_range(TimePeriod::new(Time::new(day, 0), Time::new(day + 1, 0))?)
}

fn move_by_period(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    ensure_in_range(period.move_delta(period.delta() * count)).ok()
}

fn move_by_days(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    ensure_in_range(period.move_delta(TimeDelta::from_days(count))).ok()
}

fn move_by_months(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    let start = shift_months(&BosparanianDateTime::from_time(period.start()), count)?;
    let end = shift_months(&BosparanianDateTime::from_time(period.end()), count)?;
    ensure_in_range(TimePeriod::new(start.to_time(), end.to_time()).ok()?).ok()
}

fn move_by_years(period: &TimePeriod, count: i64) -> Option<TimePeriod> {
    move_by_months(period, count * 13)
}

struct CenturyStrip;

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
        format!("{year}s BF")
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

struct YearStrip;

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
        format!("{year}")
    }
}

struct MonthStrip;

impl Strip for MonthStrip {
    fn start(&self, time: Time) -> Time {
        let (year, month, _) = julian_day_to_ymd(time.julian_day());
        month_start(year, month)
    }

    fn increment(&self, time: Time) -> Time {
        let (year, month, _) = julian_day_to_ymd(time.julian_day());
        if month == 13 {
            month_start(year + 1, 1)
        } else {
            month_start(year, month + 1)
        }
    }

    fn label(&self, time: Time, major: bool) -> String {
        let (year, month, _) = julian_day_to_ymd(time.julian_day());
        let name = MONTH_NAMES[(month - 1) as usize];
        if major {
            format!("{name} {year}")
        } else {
            name.to_string()
        }
    }
}

struct WeekStrip;

impl Strip for WeekStrip {
    fn start(&self, time: Time) -> Time {
        let first = time.julian_day() - weekday(time.julian_day()) as i64;
        Time::new(first, 0)
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

struct DayStrip;

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
                "{} {day} {} {year}",
                WEEKDAY_NAMES[weekday(time.julian_day())],
                MONTH_NAMES[(month - 1) as usize],
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
        format!("{} {day}", WEEKDAY_NAMES[weekday(time.julian_day())])
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
pub struct BosparanianTimeType;

impl TimeType for BosparanianTimeType {
    fn name(&self) -> &'static str {
        TIME_TYPE_NAME
    }

    fn time_string(&self, time: Time) -> String {
        let dt = BosparanianDateTime::from_time(time);
        format!(
            "{}-{:02}-{:02} {:02}:{:02}:{:02}",
            dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
        )
    }

    fn parse_time(&self, text: &str) -> Result<Time> {
        let bad = || TimelineError::Parse(format!("bad time string '{text}'"));
        let (date_part, time_part) = text.split_once(' ').ok_or_else(bad)?;
        let date: Vec<&str> = date_part.split('-').collect();
        let clock: Vec<&str> = time_part.split(':').collect();
        if date.len() != 3 || clock.len() != 3 {
            return Err(bad());
        }
        let num = |s: &str| -> Result<i64> { s.parse().map_err(|_| bad()) };
        let dt = BosparanianDateTime::new(
            num(date[0])?,
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
            let dt = BosparanianDateTime::from_time(time);
            let date = format!("{} {} {}", dt.day, MONTH_NAMES[(dt.month - 1) as usize], dt.year);
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
        super::gregorian::GregorianTimeType.format_delta(delta)
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
            Entry { label: "Fit Year", func: fit_year },
            Entry { label: "Fit Month", func: fit_month },
            Entry { label: "Fit Day", func: fit_day },
        ]
    }

    fn duplicate_functions(&self) -> Vec<DuplicateFunction> {
        vec![
            DuplicateFunction { label: "Period", func: move_by_period },
            DuplicateFunction { label: "Day", func: move_by_days },
            DuplicateFunction { label: "Month", func: move_by_months },
            DuplicateFunction { label: "Year", func: move_by_years },
        ]
    }

    fn choose_strips(&self, day_px: f64, _config: &Config) -> (Box<dyn Strip>, Box<dyn Strip>) {
        if day_px >= 600.0 {
            (Box::new(DayStrip), Box::new(HourStrip))
        } else if day_px >= 45.0 {
            (Box::new(WeekStrip), Box::new(WeekdayStrip))
        } else if day_px >= 25.0 {
            (Box::new(MonthStrip), Box::new(DayStrip))
        } else if day_px >= 1.5 {
            (Box::new(YearStrip), Box::new(MonthStrip))
        } else if day_px >= 0.12 {
            (Box::new(DecadeStrip), Box::new(YearStrip))
        } else {
            (Box::new(CenturyStrip), Box::new(DecadeStrip))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_round_trip_through_julian_days() {
        for &(y, m, d) in &[
            (7300, 1, 1),
            (14040, 6, 15),
            (9999, 13, 5),
            (8000, 12, 30),
            (0, 1, 1),
        ] {
            let jd = ymd_to_julian_day(y, m, d);
            assert_eq!(julian_day_to_ymd(jd), (y, m, d), "for {y}-{m}-{d}");
        }
    }

    #[test]
    fn epoch_shift_applies_contract_constants() {
        // 73 centuries of 365-day years, shifted 3 days for weekday
        // alignment.
        assert_eq!(ymd_to_julian_day(7300, 1, 1), WEEKDAY_ALIGNMENT_DAYS);
        assert_eq!(julian_day_to_ymd(0), (7300, 1, 1 + 3));
    }

    #[test]
    fn thirteenth_month_has_five_days() {
        assert_eq!(days_in_month(13), 5);
        assert_eq!(days_in_month(12), 30);
        // Day after the last Nameless Day is New Year.
        let last = ymd_to_julian_day(9999, 13, 5);
        assert_eq!(julian_day_to_ymd(last + 1), (10_000, 1, 1));
    }

    #[test]
    fn weekdays_cycle_over_the_alignment() {
        let jd = ymd_to_julian_day(7300, 1, 1);
        assert_eq!(weekday(jd), 0);
        assert_eq!(weekday(jd + 8), 1);
    }

    #[test]
    fn time_string_round_trip() {
        let tt = BosparanianTimeType;
        for text in ["14040-01-01 00:00:00", "9999-13-05 23:59:59", "7301-07-15 12:30:00"] {
            let parsed = tt.parse_time(text).unwrap();
            assert_eq!(tt.time_string(parsed), text);
        }
    }

    #[test]
    fn parse_rejects_invalid_dates() {
        let tt = BosparanianTimeType;
        assert!(tt.parse_time("14040-13-06 00:00:00").is_err());
        assert!(tt.parse_time("14040-14-01 00:00:00").is_err());
        assert!(tt.parse_time("14040-01-31 00:00:00").is_err());
    }

    #[test]
    fn duplicate_month_respects_short_month() {
        let t = BosparanianDateTime::new(14040, 12, 30, 0, 0, 0).unwrap().to_time();
        let p = TimePeriod::point(t);
        // Month 13 only has 5 days, day 30 cannot land there.
        assert!(move_by_months(&p, 1).is_none());
        let two = move_by_months(&p, 2).unwrap();
        let dt = BosparanianDateTime::from_time(two.start());
        assert_eq!((dt.year, dt.month, dt.day), (14041, 1, 30));
    }

    #[test]
    fn whole_year_page_navigation() {
        let p = TimePeriod::new(year_start(14040), year_start(14041)).unwrap();
        let next = forward(&p).unwrap();
        assert_eq!(next.start(), year_start(14041));
        assert_eq!(next.end(), year_start(14042));
    }
}
