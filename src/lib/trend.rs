//! Ordered time series and period-over-period comparisons
//!
//! All series are built from a `Calendar` over one of the named windows,
//! so a record can only ever land in a single bucket.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::cmp::Ordering;

use crate::lib::{
    date::{Date, Weekday},
    entry::{Amount, ExpenseRecord},
    period::{Duration, TimeWindow, Windows},
    stats,
    summary::{self, Calendar, CategoryTotal, Summary},
};

/// Months covered by the monthly trend
pub const TREND_MONTHS: u32 = 6;
/// Months searched for the month-over-month comparison
pub const COMPARISON_MONTHS: u32 = 12;
/// Days covered by the weekly series
pub const SERIES_DAYS: u32 = 7;
/// Days covered by the average daily spending
pub const AVERAGE_DAYS: u32 = 30;
/// Days covered by the weekday pattern
pub const PATTERN_DAYS: u32 = 90;
/// Weeks covered by the spending velocity
pub const VELOCITY_WEEKS: u32 = 8;

const DAYS_PER_WEEK: i64 = 7;

/// Total of one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    /// `Jan` in the trend, `Jan 2024` in the comparison
    pub month: String,
    pub month_start: Date,
    pub total: Amount,
    #[serde(skip)]
    pub count: usize,
}

/// Total of one day of the weekly series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub day: String,
    pub date: Date,
    pub total: Amount,
}

/// Change of a category between the previous and the current month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGrowth {
    pub category: String,
    pub current: Amount,
    pub previous: Amount,
    /// Percentage, rounded to 2 decimal places
    pub growth_rate: Decimal,
}

/// Spending habits of one day of the week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayBucket {
    pub day_name: String,
    /// 0 is Sunday
    pub day_num: u8,
    pub avg_amount: Amount,
    pub frequency: usize,
}

/// Per-day rates over one Monday-first week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekVelocity {
    /// Monday that starts the week
    pub week: Date,
    pub expenses_per_day: Decimal,
    pub amount_per_day: Amount,
}

impl MonthBucket {
    fn short(sum: &Summary) -> Self {
        let start = sum.window().start();
        Self {
            month: start.month().to_string(),
            month_start: start,
            total: sum.total(),
            count: sum.count(),
        }
    }

    fn with_year(sum: &Summary) -> Self {
        let start = sum.window().start();
        Self {
            month: format!("{} {}", start.month(), start.year()),
            ..Self::short(sum)
        }
    }
}

fn calendar(records: &[ExpenseRecord], window: TimeWindow, duration: Duration) -> Calendar {
    let mut cal = Calendar::from_spacing(window, duration, 1);
    cal.register(records);
    cal
}

/// Totals of the months of `window` that contain at least one record,
/// oldest first
pub fn active_months(records: &[ExpenseRecord], window: TimeWindow) -> Vec<MonthBucket> {
    calendar(records, window, Duration::Month)
        .nonempty()
        .map(MonthBucket::short)
        .collect()
}

/// Month totals over the trailing `TREND_MONTHS` months, oldest first
///
/// Months without any record are omitted rather than reported as zero.
pub fn monthly_trend(records: &[ExpenseRecord], windows: &Windows) -> Vec<MonthBucket> {
    active_months(records, windows.trailing_months(TREND_MONTHS))
}

/// Daily totals of the last `SERIES_DAYS` days, oldest first,
/// with days without records reported as zero
pub fn weekly_series(records: &[ExpenseRecord], windows: &Windows) -> Vec<DayBucket> {
    calendar(records, windows.trailing_days(SERIES_DAYS), Duration::Day)
        .contents()
        .iter()
        .map(|sum| {
            let date = sum.window().start();
            DayBucket {
                day: date.weekday().to_string(),
                date,
                total: sum.total(),
            }
        })
        .collect()
}

/// Totals over the whole history in alphabetical order of category
pub fn category_bar(records: &[ExpenseRecord]) -> Vec<CategoryTotal> {
    summary::sum_by_category_name(records, TimeWindow::ALL)
}

/// The two most recent months with at least one record within the last
/// `COMPARISON_MONTHS` months, newest first
pub fn month_comparison(records: &[ExpenseRecord], windows: &Windows) -> Vec<MonthBucket> {
    calendar(records, windows.trailing_months(COMPARISON_MONTHS), Duration::Month)
        .nonempty()
        .rev()
        .take(2)
        .map(MonthBucket::with_year)
        .collect()
}

/// Percentage change from `previous` to `current`
///
/// A category that had nothing to compare against counts as a 100% increase.
/// Rates beyond the range of `Decimal` saturate at `Decimal::MAX`/`MIN`.
pub fn growth_rate(current: Amount, previous: Amount) -> Decimal {
    if previous.0.is_zero() {
        return Decimal::ONE_HUNDRED;
    }
    let rate = current
        .0
        .checked_div(previous.0)
        .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
        .and_then(|change| change.checked_mul(Decimal::ONE_HUNDRED));
    match rate {
        Some(rate) => rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        // only a ratio of huge magnitude can overflow, its sign decides
        None if current.0.is_sign_positive() == previous.0.is_sign_positive() => Decimal::MAX,
        None => Decimal::MIN,
    }
}

/// Growth of every category present in the current or the previous month,
/// fastest growing first, equal rates by category name
pub fn category_growth(records: &[ExpenseRecord], windows: &Windows) -> Vec<CategoryGrowth> {
    let current = summary::sum_by_category(records, windows.current_month());
    let previous = summary::sum_by_category(records, windows.previous_month());
    let lookup = |totals: &[CategoryTotal], name: &str| {
        totals
            .iter()
            .find(|c| c.category == name)
            .map(|c| c.total)
            .unwrap_or(Amount::ZERO)
    };
    let mut growth = current
        .iter()
        .chain(previous.iter().filter(|p| !current.iter().any(|c| c.category == p.category)))
        .map(|c| {
            let cur = lookup(&current, &c.category);
            let prev = lookup(&previous, &c.category);
            CategoryGrowth {
                category: c.category.clone(),
                current: cur,
                previous: prev,
                growth_rate: growth_rate(cur, prev),
            }
        })
        .collect::<Vec<_>>();
    growth.sort_by(|a, b| match b.growth_rate.cmp(&a.growth_rate) {
        Ordering::Equal => a.category.cmp(&b.category),
        ord => ord,
    });
    growth
}

/// Average record amount and record count per day of the week over the
/// last `PATTERN_DAYS` days, Sunday first, days without records omitted
pub fn weekday_pattern(records: &[ExpenseRecord], windows: &Windows) -> Vec<WeekdayBucket> {
    let window = windows.trailing_days(PATTERN_DAYS);
    let mut days = [(Amount::ZERO, 0usize); 7];
    for record in records.iter().filter(|r| window.contains(r.date)) {
        let slot = &mut days[record.date.weekday().from_sunday() as usize];
        slot.0 += record.amount;
        slot.1 += 1;
    }
    days.iter()
        .enumerate()
        .filter_map(|(num, &(total, frequency))| {
            let avg_amount = total.per(frequency)?;
            let day = Weekday::nth_from_sunday(num as u8)?;
            Some(WeekdayBucket {
                day_name: day.full_name().to_string(),
                day_num: num as u8,
                avg_amount,
                frequency,
            })
        })
        .collect()
}

/// Per-day amount and record count of each of the last `VELOCITY_WEEKS`
/// weeks that has at least one record, newest first
///
/// The current week is normalized by 7 days even though it is not over yet.
pub fn spending_velocity(records: &[ExpenseRecord], windows: &Windows) -> Vec<WeekVelocity> {
    let days = Decimal::from(DAYS_PER_WEEK);
    calendar(records, windows.trailing_weeks(VELOCITY_WEEKS), Duration::Week)
        .nonempty()
        .rev()
        .map(|sum| WeekVelocity {
            week: sum.window().start(),
            expenses_per_day: Decimal::from(sum.count()) / days,
            amount_per_day: Amount(sum.total().0 / days),
        })
        .collect()
}

/// Mean of the daily totals over the days of the last `AVERAGE_DAYS` days
/// that have at least one record, zero if there are none
pub fn average_daily(records: &[ExpenseRecord], windows: &Windows) -> Amount {
    let totals = calendar(records, windows.trailing_days(AVERAGE_DAYS), Duration::Day)
        .nonempty()
        .map(|s| s.total())
        .collect::<Vec<_>>();
    stats::mean(&totals).unwrap_or(Amount::ZERO)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        date::Month::*,
        summary::test::{amt, records},
    };

    macro_rules! dt {
        ( $y:tt - $m:tt - $d:tt ) => {
            Date::from($y, $m, $d).unwrap()
        };
    }

    fn at(now: Date) -> Windows {
        Windows::at(now)
    }

    #[test]
    fn trend_omits_empty_months() {
        let recs = records(&[
            ("10", "Food", dt!(2023-Aug-31)),
            ("20", "Food", dt!(2023-Sep-1)),
            ("5", "Food", dt!(2023-Nov-3)),
            ("7", "Rent", dt!(2023-Nov-20)),
            ("30", "Food", dt!(2024-Feb-20)),
            ("99", "Food", dt!(2024-Feb-21)),
        ]);
        let trend = monthly_trend(&recs, &at(dt!(2024-Feb-20)));
        let months = trend.iter().map(|m| m.month.as_str()).collect::<Vec<_>>();
        assert_eq!(months, vec!["Sep", "Nov", "Feb"]);
        assert_eq!(trend[1].total, amt("12"));
        assert_eq!(trend[1].count, 2);
        // records after today are not part of the trend
        assert_eq!(trend[2].total, amt("30"));
        assert_eq!(trend[0].month_start, dt!(2023-Sep-1));
    }

    #[test]
    fn weekly_series_is_dense() {
        let recs = records(&[("4", "Food", dt!(2024-Feb-17)), ("6", "Food", dt!(2024-Feb-17))]);
        let series = weekly_series(&recs, &at(dt!(2024-Feb-20)));
        assert_eq!(series.len(), 7);
        let days = series.iter().map(|d| d.day.as_str()).collect::<Vec<_>>();
        assert_eq!(days, vec!["Wed", "Thu", "Fri", "Sat", "Sun", "Mon", "Tue"]);
        assert_eq!(series[3].total, amt("10"));
        assert_eq!(series[3].date, dt!(2024-Feb-17));
        assert!(series.iter().enumerate().all(|(i, d)| i == 3 || d.total == Amount::ZERO));
        assert_eq!(weekly_series(&[], &at(dt!(2024-Feb-20))).len(), 7);
    }

    #[test]
    fn comparison_two_latest_months() {
        let recs = records(&[
            ("1", "Food", dt!(2023-Jan-5)),
            ("2", "Food", dt!(2023-Jun-5)),
            ("3", "Food", dt!(2023-Oct-5)),
            ("4", "Food", dt!(2023-Oct-9)),
        ]);
        let cmp = month_comparison(&recs, &at(dt!(2024-Feb-20)));
        assert_eq!(cmp.len(), 2);
        assert_eq!(cmp[0].month, "Oct 2023");
        assert_eq!(cmp[0].total, amt("7"));
        assert_eq!(cmp[1].month, "Jun 2023");
        assert!(cmp[0].month_start >= cmp[1].month_start);
        let single = month_comparison(&recs[..1], &at(dt!(2023-Jan-20)));
        assert_eq!(single.len(), 1);
        assert!(month_comparison(&recs, &at(dt!(2025-Feb-20))).is_empty());
    }

    #[test]
    fn growth_rates() {
        assert_eq!(growth_rate(amt("200"), amt("100")), Decimal::ONE_HUNDRED);
        assert_eq!(growth_rate(amt("5"), Amount::ZERO), Decimal::ONE_HUNDRED);
        assert_eq!(growth_rate(amt("50"), amt("200")), "-75".parse::<Decimal>().unwrap());
        assert_eq!(growth_rate(amt("1"), amt("3")), "-66.67".parse::<Decimal>().unwrap());
        assert_eq!(growth_rate(amt("2"), amt("3")), "-33.33".parse::<Decimal>().unwrap());
        // midpoints round away from zero
        assert_eq!(growth_rate(amt("1.00125"), amt("1")), "0.13".parse::<Decimal>().unwrap());
    }

    #[test]
    fn growth_rate_saturates() {
        let big = amt("10000000000000000000000000");
        let tiny = amt("0.0001");
        assert_eq!(growth_rate(big, tiny), Decimal::MAX);
        assert_eq!(growth_rate(Amount(-big.0), tiny), Decimal::MIN);
        // opposite extremes still have a finite rate
        assert_eq!(growth_rate(Amount(Decimal::MAX), Amount(Decimal::MIN)), Decimal::from(-200));
    }

    #[test]
    fn category_growth_union() {
        let recs = records(&[
            ("100", "Food", dt!(2024-Jan-15)),
            ("200", "Food", dt!(2024-Feb-15)),
            ("50", "Rent", dt!(2024-Jan-3)),
            ("10", "Books", dt!(2024-Feb-1)),
            ("30", "Games", dt!(2024-Feb-2)),
            ("60", "Games", dt!(2024-Jan-2)),
            ("999", "Food", dt!(2023-Dec-31)),
        ]);
        let growth = category_growth(&recs, &at(dt!(2024-Feb-20)));
        let rows = growth
            .iter()
            .map(|g| (g.category.as_str(), g.growth_rate))
            .collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![
                ("Books", Decimal::from(100)),
                ("Food", Decimal::from(100)),
                ("Games", Decimal::from(-50)),
                ("Rent", Decimal::from(-100)),
            ]
        );
        assert_eq!(growth[1].current, amt("200"));
        assert_eq!(growth[1].previous, amt("100"));
        assert_eq!(growth[3].current, Amount::ZERO);
    }

    #[test]
    fn weekday_pattern_sunday_first() {
        let recs = records(&[
            ("10", "Food", dt!(2024-Feb-18)), // Sun
            ("30", "Food", dt!(2024-Feb-11)), // Sun
            ("7", "Food", dt!(2024-Feb-17)),  // Sat
            ("1", "Food", dt!(2024-Feb-20)),  // Tue
            ("500", "Food", dt!(2023-Nov-19)), // Sun, out of the 90 days
        ]);
        let pattern = weekday_pattern(&recs, &at(dt!(2024-Feb-20)));
        let nums = pattern.iter().map(|p| p.day_num).collect::<Vec<_>>();
        assert_eq!(nums, vec![0, 2, 6]);
        assert_eq!(pattern[0].day_name, "Sunday");
        assert_eq!(pattern[0].avg_amount, amt("20"));
        assert_eq!(pattern[0].frequency, 2);
        assert_eq!(pattern[2].day_name, "Saturday");
        assert!(weekday_pattern(&[], &at(dt!(2024-Feb-20))).is_empty());
    }

    #[test]
    fn velocity_per_day() {
        // eight consecutive weeks with 70 spent in each
        let now = dt!(2024-Feb-25); // a Sunday
        let items = (0..8)
            .flat_map(|w| {
                let monday = now.start_of_week().jump_day(-7 * w);
                vec![("30", "Food", monday), ("40", "Rent", monday.jump_day(3))]
            })
            .collect::<Vec<_>>();
        let recs = records(&items);
        let velocity = spending_velocity(&recs, &at(now));
        assert_eq!(velocity.len(), 8);
        assert!(velocity.iter().all(|v| v.amount_per_day == amt("10")));
        assert!(velocity.windows(2).all(|w| w[0].week > w[1].week));
        assert_eq!(velocity[0].week, dt!(2024-Feb-19));
        assert_eq!(velocity[0].expenses_per_day, Decimal::from(2) / Decimal::from(7));
    }

    #[test]
    fn velocity_skips_empty_weeks() {
        let recs = records(&[("14", "Food", dt!(2024-Feb-6)), ("7", "Food", dt!(2023-Dec-1))]);
        let velocity = spending_velocity(&recs, &at(dt!(2024-Feb-20)));
        assert_eq!(velocity.len(), 1);
        assert_eq!(velocity[0].week, dt!(2024-Feb-5));
        assert_eq!(velocity[0].amount_per_day, amt("2"));
    }

    #[test]
    fn average_of_active_days() {
        let recs = records(&[
            ("10", "Food", dt!(2024-Feb-20)),
            ("20", "Food", dt!(2024-Feb-20)),
            ("10", "Food", dt!(2024-Feb-1)),
            ("1000", "Food", dt!(2024-Jan-1)),
        ]);
        assert_eq!(average_daily(&recs, &at(dt!(2024-Feb-20))), amt("20"));
        assert_eq!(average_daily(&[], &at(dt!(2024-Feb-20))), Amount::ZERO);
    }
}
