//! Working-day calendars.
//!
//! A calendar decides which dates are public holidays for a locale; weekends
//! are never working days. The leave duration calculator only depends on the
//! [`HolidayCalendar`] trait so tests can swap calendars freely.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashSet;
use strum_macros::{Display, EnumString};

pub trait HolidayCalendar: std::fmt::Debug + Send + Sync {
    /// Human-readable name (e.g. `"Greece"`).
    fn name(&self) -> &str;

    /// `true` if `date` is a public holiday, regardless of weekday.
    fn is_holiday(&self, date: NaiveDate) -> bool;

    fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.is_holiday(date)
    }

    /// Working days from `start` to `end`, both inclusive.
    /// Returns 0 when `start > end`.
    fn working_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_working_day(*d))
            .count() as u32
    }
}

/// Saturdays and Sundays only, no public holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendsOnly;

impl HolidayCalendar for WeekendsOnly {
    fn name(&self) -> &str {
        "Weekends Only"
    }

    fn is_holiday(&self, _date: NaiveDate) -> bool {
        false
    }
}

/// Greek public holidays.
///
/// Fixed-date holidays:
/// * New Year's Day (Jan 1)
/// * Epiphany (Jan 6)
/// * Independence Day (Mar 25)
/// * Labour Day (May 1)
/// * Assumption of Mary (Aug 15)
/// * Ochi Day (Oct 28)
/// * Christmas Day (Dec 25)
/// * Synaxis of the Theotokos (Dec 26)
///
/// Movable holidays, relative to Orthodox Easter Sunday (`e`):
/// * Clean Monday (e-48)
/// * Good Friday (e-2)
/// * Easter Sunday and Easter Monday (e, e+1)
/// * Whit Monday (e+50)
#[derive(Debug, Clone, Copy, Default)]
pub struct Greece;

impl HolidayCalendar for Greece {
    fn name(&self) -> &str {
        "Greece"
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        let (d, m) = (date.day(), date.month());

        let fixed = (d == 1 && m == 1)
            || (d == 6 && m == 1)
            || (d == 25 && m == 3)
            || (d == 1 && m == 5)
            || (d == 15 && m == 8)
            || (d == 28 && m == 10)
            || (d == 25 && m == 12)
            || (d == 26 && m == 12);
        if fixed {
            return true;
        }

        let Some(easter) = orthodox_easter(date.year()) else {
            return false;
        };
        let offset = (date - easter).num_days();
        matches!(offset, -48 | -2 | 0 | 1 | 50)
    }
}

/// Orthodox Easter Sunday for `year`, as a Gregorian date.
///
/// Uses the Julian computus (Meeus) and shifts by the Julian/Gregorian
/// drift of that century.
pub fn orthodox_easter(year: i32) -> Option<NaiveDate> {
    if year < 1583 {
        return None;
    }
    let a = year % 4;
    let b = year % 7;
    let c = year % 19;
    let d = (19 * c + 15) % 30;
    let e = (2 * a + 4 * b - d + 34) % 7;
    let month = (d + e + 114) / 31;
    let day = (d + e + 114) % 31 + 1;
    let drift = year / 100 - year / 400 - 2;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .map(|julian| julian + Duration::days(drift as i64))
}

/// A base calendar plus explicitly declared non-working days, for one-off
/// closures or holidays that vary from year to year.
#[derive(Debug)]
pub struct BespokeCalendar {
    name: String,
    base: Box<dyn HolidayCalendar>,
    extra: HashSet<NaiveDate>,
}

impl BespokeCalendar {
    pub fn new(base: Box<dyn HolidayCalendar>) -> Self {
        let name = format!("{} (bespoke)", base.name());
        Self {
            name,
            base,
            extra: HashSet::new(),
        }
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.extra.insert(date);
    }
}

impl HolidayCalendar for BespokeCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.extra.contains(&date) || self.base.is_holiday(date)
    }

    fn is_weekend(&self, date: NaiveDate) -> bool {
        self.base.is_weekend(date)
    }
}

/// Calendar selection from configuration (`HOLIDAY_CALENDAR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CalendarKind {
    #[default]
    Greece,
    WeekendsOnly,
}

impl CalendarKind {
    pub fn build(self, extra_holidays: &[NaiveDate]) -> Box<dyn HolidayCalendar> {
        let base: Box<dyn HolidayCalendar> = match self {
            CalendarKind::Greece => Box::new(Greece),
            CalendarKind::WeekendsOnly => Box::new(WeekendsOnly),
        };
        if extra_holidays.is_empty() {
            return base;
        }
        let mut calendar = BespokeCalendar::new(base);
        for date in extra_holidays {
            calendar.add_holiday(*date);
        }
        Box::new(calendar)
    }
}
