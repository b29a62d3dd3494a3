//! Inclusive date ranges and the named windows of the dashboard
//!
//! All windows are derived from a single reference date, never from the
//! system clock: see `Windows::at`.

use serde::Serialize;
use std::fmt;

use crate::lib::date::{Date, Month};

/// Inclusive range of dates, `start <= end` always holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    start: Date,
    end: Date,
}

/// Calendar step used to split a window into buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    Day,
    Week,
    Month,
}

impl TimeWindow {
    /// Every representable date, for aggregations over the full history
    pub const ALL: Self = Self {
        start: Date::MIN,
        end: Date::MAX,
    };

    /// # Panics
    ///
    /// If `end` is strictly before `start`
    pub fn new(start: Date, end: Date) -> Self {
        assert!(start <= end, "window {}..{} is reversed", start, end);
        Self { start, end }
    }

    /// A window of a single day
    pub fn day(date: Date) -> Self {
        Self::new(date, date)
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Successive disjoint sub-windows of `count` units each, covering
    /// the whole window; the last one is truncated to the window end.
    pub fn split(&self, duration: Duration, count: u32) -> Vec<Self> {
        let count = count.max(1);
        let step = |date: Date| match duration {
            Duration::Day => date.jump_day(count as i64),
            Duration::Week => date.jump_day(count as i64 * 7),
            Duration::Month => date.jump_month(count as i32),
        };
        let mut items = Vec::new();
        let mut start = self.start;
        loop {
            let next = step(start);
            if next <= start {
                // saturated at the end of the calendar
                items.push(Self::new(start, self.end));
                break;
            }
            let end = next.prev().min(self.end);
            items.push(Self::new(start, end));
            if end == self.end {
                break;
            }
            start = next;
        }
        items
    }
}

/// Compact notation that only writes the fields that differ between
/// both ends: `2024-Jan-15..Mar-17`, `2024-Feb`, `2023-Sep..2024-Feb-20`
impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (a, b) = (self.start, self.end);
        let full_month_start = a.day() == 1;
        let full_month_end = b.day() == b.month().count(b.year());
        let write_end_day = |f: &mut fmt::Formatter| {
            if full_month_end {
                Ok(())
            } else {
                write!(f, "-{}", b.day())
            }
        };
        let write_start_day = |f: &mut fmt::Formatter| {
            if full_month_start {
                Ok(())
            } else {
                write!(f, "-{}", a.day())
            }
        };
        if *self == Self::ALL {
            return write!(f, "..");
        }
        if a.year() != b.year() {
            write!(f, "{}", a.year())?;
            if a.month() != Month::Jan || !full_month_start {
                write!(f, "-{}", a.month())?;
                write_start_day(f)?;
            }
            write!(f, "..{}", b.year())?;
            if b.month() != Month::Dec || !full_month_end {
                write!(f, "-{}", b.month())?;
                write_end_day(f)?;
            }
            return Ok(());
        }
        write!(f, "{}", a.year())?;
        if a.month() == Month::Jan && full_month_start && b.month() == Month::Dec && full_month_end {
            Ok(())
        } else if a.month() != b.month() {
            write!(f, "-{}", a.month())?;
            write_start_day(f)?;
            write!(f, "..{}", b.month())?;
            write_end_day(f)
        } else if full_month_start && full_month_end {
            write!(f, "-{}", a.month())
        } else if a.day() == b.day() {
            write!(f, "-{}-{}", a.month(), a.day())
        } else {
            write!(f, "-{}-{}..{}", a.month(), a.day(), b.day())
        }
    }
}

/// Resolver for all the named windows relative to one reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    now: Date,
}

impl Windows {
    pub fn at(now: Date) -> Self {
        Self { now }
    }

    pub fn today(&self) -> TimeWindow {
        TimeWindow::day(self.now)
    }

    /// Whole calendar month of the reference date, including days after it
    pub fn current_month(&self) -> TimeWindow {
        TimeWindow::new(self.now.start_of_month(), self.now.end_of_month())
    }

    /// Whole calendar month immediately preceding `current_month`
    pub fn previous_month(&self) -> TimeWindow {
        let start = self.now.start_of_month().jump_month(-1);
        TimeWindow::new(start, start.end_of_month())
    }

    /// Whole calendar year of the reference date
    pub fn current_year(&self) -> TimeWindow {
        TimeWindow::new(self.now.start_of_year(), self.now.end_of_year())
    }

    /// Exactly `n` days ending today (`n == 0` is treated as 1)
    pub fn trailing_days(&self, n: u32) -> TimeWindow {
        let n = n.max(1) as i64;
        TimeWindow::new(self.now.jump_day(-(n - 1)), self.now)
    }

    /// `n` calendar months ending with the current one, truncated at today
    pub fn trailing_months(&self, n: u32) -> TimeWindow {
        let n = n.max(1) as i32;
        TimeWindow::new(self.now.start_of_month().jump_month(-(n - 1)), self.now)
    }

    /// `n` Monday-first weeks ending with the current one, truncated at today
    pub fn trailing_weeks(&self, n: u32) -> TimeWindow {
        let n = n.max(1) as i64;
        TimeWindow::new(self.now.start_of_week().jump_day(-7 * (n - 1)), self.now)
    }
}

#[cfg(test)]
#[rustfmt::skip]
mod test {
    use super::*;
    use crate::lib::date::{Month::*, Weekday};

    macro_rules! dt {
        ( $y:tt - $m:tt - $d:tt ) => {{
            Date::from($y, $m, $d).unwrap()
        }}
    }

    /// Number of calendar days covered
    fn len_days(w: TimeWindow) -> usize {
        w.split(Duration::Day, 1).len()
    }

    macro_rules! pp {
        ( $start:expr, $end:expr => $fmt:expr ) => {{
            assert_eq!(&format!("{}", TimeWindow::new($start, $end)), $fmt);
        }}
    }

    #[test]
    fn window_fmt() {
        pp!(dt!(2020-Jan-15), dt!(2021-Mar-17) => "2020-Jan-15..2021-Mar-17");
        pp!(dt!(2020-Jan-15), dt!(2020-Mar-17) => "2020-Jan-15..Mar-17");
        pp!(dt!(2020-Jan-15), dt!(2020-Jan-17) => "2020-Jan-15..17");
        pp!(dt!(2020-Jan-15), dt!(2020-Jan-15) => "2020-Jan-15");
        pp!(dt!(2020-Jan-1), dt!(2020-Jan-31) => "2020-Jan");
        pp!(dt!(2020-Jan-1), dt!(2020-Feb-29) => "2020-Jan..Feb");
        pp!(dt!(2020-Jan-1), dt!(2020-Dec-31) => "2020");
        pp!(dt!(2023-Sep-1), dt!(2024-Feb-20) => "2023-Sep..2024-Feb-20");
        pp!(dt!(2020-Jan-1), dt!(2023-Dec-31) => "2020..2023");
        assert_eq!(format!("{}", TimeWindow::ALL), "..");
    }

    #[test]
    #[should_panic]
    fn reversed_window() {
        TimeWindow::new(dt!(2020-Jan-2), dt!(2020-Jan-1));
    }

    #[test]
    fn calendar_windows() {
        let w = Windows::at(dt!(2024-Feb-20));
        assert_eq!(w.today(), TimeWindow::day(dt!(2024-Feb-20)));
        assert_eq!(w.current_month(), TimeWindow::new(dt!(2024-Feb-1), dt!(2024-Feb-29)));
        assert_eq!(w.previous_month(), TimeWindow::new(dt!(2024-Jan-1), dt!(2024-Jan-31)));
        assert_eq!(w.current_year(), TimeWindow::new(dt!(2024-Jan-1), dt!(2024-Dec-31)));
        // January wraps to the previous year
        let w = Windows::at(dt!(2024-Jan-31));
        assert_eq!(w.previous_month(), TimeWindow::new(dt!(2023-Dec-1), dt!(2023-Dec-31)));
    }

    #[test]
    fn trailing_windows() {
        let w = Windows::at(dt!(2024-Mar-1));
        assert_eq!(w.trailing_days(7), TimeWindow::new(dt!(2024-Feb-24), dt!(2024-Mar-1)));
        assert_eq!(len_days(w.trailing_days(7)), 7);
        assert_eq!(len_days(w.trailing_days(30)), 30);
        assert_eq!(len_days(w.trailing_days(90)), 90);
        assert_eq!(w.trailing_days(0), w.today());
        assert_eq!(w.trailing_months(6), TimeWindow::new(dt!(2023-Oct-1), dt!(2024-Mar-1)));
        assert_eq!(w.trailing_months(1), TimeWindow::new(dt!(2024-Mar-1), dt!(2024-Mar-1)));
        // 2024-Mar-1 is a Friday, its week starts on Feb 26
        let weeks = w.trailing_weeks(8);
        assert_eq!(weeks.start(), dt!(2024-Jan-8));
        assert_eq!(weeks.start().weekday(), Weekday::Mon);
        assert_eq!(weeks.end(), dt!(2024-Mar-1));
    }

    #[test]
    fn split_months() {
        let parts = TimeWindow::new(dt!(2023-Nov-1), dt!(2024-Feb-20)).split(Duration::Month, 1);
        assert_eq!(parts, vec![
            TimeWindow::new(dt!(2023-Nov-1), dt!(2023-Nov-30)),
            TimeWindow::new(dt!(2023-Dec-1), dt!(2023-Dec-31)),
            TimeWindow::new(dt!(2024-Jan-1), dt!(2024-Jan-31)),
            TimeWindow::new(dt!(2024-Feb-1), dt!(2024-Feb-20)),
        ]);
    }

    #[test]
    fn split_days_and_weeks() {
        let days = Windows::at(dt!(2024-Feb-20)).trailing_days(7).split(Duration::Day, 1);
        assert_eq!(days.len(), 7);
        assert!(days.iter().all(|d| d.start() == d.end()));
        let weeks = Windows::at(dt!(2024-Feb-20)).trailing_weeks(3).split(Duration::Week, 1);
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0], TimeWindow::new(dt!(2024-Feb-5), dt!(2024-Feb-11)));
        assert_eq!(weeks[2], TimeWindow::new(dt!(2024-Feb-19), dt!(2024-Feb-20)));
    }

    #[test]
    fn containment() {
        let month = TimeWindow::new(dt!(2024-Feb-1), dt!(2024-Feb-29));
        assert!(month.contains(dt!(2024-Feb-29)));
        assert!(!month.contains(dt!(2024-Mar-1)));
    }
}
