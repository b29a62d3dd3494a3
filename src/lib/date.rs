//! Day-precision time management, with a focus on edge cases
//!
//! Dates are `YYYY-Mmm-DD`, not number of seconds, and provide an interface
//! for dealing with durations that are expressed in number of days, weeks or months.
//!
//! They also support weekday calculations, and jumping to the boundaries of
//! a time frame (see for example `start_of_week` or `end_of_month`).
//!
//! The calendar itself is delegated to `chrono`, this module only adds the
//! vocabulary the analytics need on top of it.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A date with day-precision
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:02}", self.year(), self.month(), self.day())
    }
}

/// Serialized as ISO 8601 (`2024-02-20`) since that is what consumers of
/// the JSON output will parse
impl Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

/// Twelve months in the year, identified by their 3-letter abbreviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, PartialOrd, Ord)]
pub enum Month {
    Jan = 0,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// Month from its number in the year, `1` is `Jan`
    pub fn from_number(n: u32) -> Option<Self> {
        Self::from_u32(n.checked_sub(1)?)
    }

    /// Number in the year, `Jan` is `1`
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Number of days in this month of the given year
    pub fn count(self, year: i32) -> u32 {
        use Month::*;
        match self {
            Jan | Mar | May | Jul | Aug | Oct | Dec => 31,
            Apr | Jun | Sep | Nov => 30,
            Feb => {
                if is_leap(year) {
                    29
                } else {
                    28
                }
            }
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Month {
    type Err = ();

    /// Parse a month from its stringified name (`"Jan"`, `"Feb"`, `"Mar"`, ...)
    fn from_str(s: &str) -> Result<Self, ()> {
        use Month::*;
        Ok(match s {
            "Jan" => Jan,
            "Feb" => Feb,
            "Mar" => Mar,
            "Apr" => Apr,
            "May" => May,
            "Jun" => Jun,
            "Jul" => Jul,
            "Aug" => Aug,
            "Sep" => Sep,
            "Oct" => Oct,
            "Nov" => Nov,
            "Dec" => Dec,
            _ => return Err(()),
        })
    }
}

/// Weekday with Monday-first week convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum Weekday {
    Mon = 0,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// Index in a Sunday-first week: `Sun` is 0, `Sat` is 6
    pub fn from_sunday(self) -> u8 {
        (self as u8 + 1) % 7
    }

    /// Inverse of `from_sunday`
    pub fn nth_from_sunday(n: u8) -> Option<Self> {
        if n < 7 {
            Self::from_u8((n + 6) % 7)
        } else {
            None
        }
    }

    pub fn full_name(self) -> &'static str {
        use Weekday::*;
        match self {
            Mon => "Monday",
            Tue => "Tuesday",
            Wed => "Wednesday",
            Thu => "Thursday",
            Fri => "Friday",
            Sat => "Saturday",
            Sun => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Ways in which a date taken from user input can be wrong
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateError {
    /// year is outside of 1000..=9999
    UnsupportedYear(i32),
    /// Feb 29 of a non-leap year
    NotBissextile(i32),
    /// Feb 30 or Feb 31 or 31st day of a 30-day month
    MonthTooShort(Month, u32),
    /// day outside of 1..=31
    InvalidDay(u32),
}

impl Date {
    /// Earliest representable date
    pub const MIN: Self = Self(NaiveDate::MIN);
    /// Latest representable date
    pub const MAX: Self = Self(NaiveDate::MAX);

    /// Validate year-month-day into date
    pub fn from(year: i32, month: Month, day: u32) -> Result<Self, DateError> {
        if !(1000..=9999).contains(&year) {
            Err(DateError::UnsupportedYear(year))
        } else if day == 0 || day > 31 {
            Err(DateError::InvalidDay(day))
        } else if day <= month.count(year) {
            NaiveDate::from_ymd_opt(year, month.number(), day)
                .map(Self)
                .ok_or(DateError::InvalidDay(day))
        } else if day >= 30 {
            Err(DateError::MonthTooShort(month, day))
        } else {
            Err(DateError::NotBissextile(year))
        }
    }

    /// The calendar date that `instant` falls on in timezone `zone`
    pub fn resolve(instant: DateTime<Utc>, zone: FixedOffset) -> Self {
        Self(instant.with_timezone(&zone).date_naive())
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    pub fn month(self) -> Month {
        // chrono months are always within 1..=12
        Month::from_number(self.0.month()).unwrap_or(Month::Jan)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Get day of week
    pub fn weekday(self) -> Weekday {
        Weekday::from_u32(self.0.weekday().num_days_from_monday()).unwrap_or(Weekday::Mon)
    }

    pub fn prev(self) -> Self {
        self.0.pred_opt().map(Self).unwrap_or(Self::MIN)
    }

    /// `count` days before/after current date, saturating at the
    /// representable range
    pub fn jump_day(self, count: i64) -> Self {
        let target = if count >= 0 {
            self.0.checked_add_days(chrono::Days::new(count as u64))
        } else {
            self.0.checked_sub_days(chrono::Days::new(count.unsigned_abs()))
        };
        target
            .map(Self)
            .unwrap_or(if count < 0 { Self::MIN } else { Self::MAX })
    }

    /// `count` months before/after current date
    ///
    /// Day will be truncated to fit in the new month:
    /// adding one month to `2000-Jan-31` makes it `2000-Feb-29`
    pub fn jump_month(self, count: i32) -> Self {
        let absolute = self.year() as i64 * 12 + self.month() as i64 + count as i64;
        let year = absolute.div_euclid(12);
        let month = Month::from_i64(absolute.rem_euclid(12)).unwrap_or(Month::Jan);
        let saturated = if count < 0 { Self::MIN } else { Self::MAX };
        let year = match i32::try_from(year) {
            Ok(year) => year,
            Err(_) => return saturated,
        };
        NaiveDate::from_ymd_opt(year, month.number(), self.day().min(month.count(year)))
            .map(Self)
            .unwrap_or(saturated)
    }

    /// Get date of the first day of the current month
    pub fn start_of_month(self) -> Self {
        self.with_day(1)
    }

    /// Get date of the last day of the current month
    pub fn end_of_month(self) -> Self {
        self.with_day(self.month().count(self.year()))
    }

    /// Jan 1st of the current year
    pub fn start_of_year(self) -> Self {
        NaiveDate::from_ymd_opt(self.year(), 1, 1)
            .map(Self)
            .unwrap_or(self)
    }

    /// Dec 31st of the current year
    pub fn end_of_year(self) -> Self {
        NaiveDate::from_ymd_opt(self.year(), 12, 31)
            .map(Self)
            .unwrap_or(self)
    }

    /// First Monday before the current date
    pub fn start_of_week(self) -> Self {
        self.jump_day(-(self.weekday() as i64))
    }

    fn with_day(self, day: u32) -> Self {
        self.0.with_day(day).map(Self).unwrap_or(self)
    }
}

fn is_leap(year: i32) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DateError::*;
        match self {
            UnsupportedYear(y) => write!(f, "{} is outside of the supported range for years", y),
            NotBissextile(y) => write!(f, "{} is not bissextile, Feb 29 does not exist", y),
            MonthTooShort(m, d) => write!(f, "{} is a short month, it does not have a {}th day", m, d),
            InvalidDay(d) => write!(f, "{} is not a valid day", d),
        }
    }
}

impl DateError {
    /// What message to show to help fix the date error
    pub fn fix_hint(&self) -> String {
        use DateError::*;
        match *self {
            UnsupportedYear(_) => "year should be between 1000 and 9999 inclusive".to_string(),
            NotBissextile(y) => format!("did you mean {y}-Feb-28 or {y}-Mar-01 ?", y = y),
            MonthTooShort(m, d) => format!(
                "{} is only {} days long",
                m,
                if m == Month::Feb { 28.max(d - 1) } else { 30 }
            ),
            InvalidDay(d) => format!("{} is not in the range 1 ..= 31", d),
        }
    }
}
