//! One-shot assembly of every dashboard statistic
//!
//! `snapshot` is a pure function of the records and the reference date:
//! calling it twice with the same inputs gives identical outputs.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::lib::{
    date::Date,
    entry::{Amount, ExpenseRecord},
    period::{TimeWindow, Windows},
    stats::{self, BudgetRecommendation},
    summary::{self, CategoryTotal},
    trend::{self, CategoryGrowth, DayBucket, MonthBucket, WeekVelocity, WeekdayBucket},
};

/// UTC offset of Asia/Kolkata, which does not observe daylight saving
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Tunables of the analytics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Timezone in which "now" is turned into a calendar date
    pub zone: FixedOffset,
    /// Length of the list of largest expenses
    pub top_expenses: usize,
    /// Multiplier from the mean monthly spending to the recommended budget
    pub budget_margin: Decimal,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zone: FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix()),
            top_expenses: 5,
            budget_margin: stats::default_margin(),
        }
    }
}

/// Every statistic shown on the dashboard, computed for one reference date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub as_of: Date,
    pub today_total: Amount,
    pub month_total: Amount,
    pub year_total: Amount,
    pub top_category: String,
    pub category_breakdown: Vec<CategoryTotal>,
    pub monthly_trend: Vec<MonthBucket>,
    pub weekly_series: Vec<DayBucket>,
    pub category_bar: Vec<CategoryTotal>,
    pub expense_count: usize,
    pub avg_daily_spending: Amount,
    pub top_expenses: Vec<ExpenseRecord>,
    pub month_comparison: Vec<MonthBucket>,
    pub category_growth: Vec<CategoryGrowth>,
    pub weekday_pattern: Vec<WeekdayBucket>,
    pub spending_velocity: Vec<WeekVelocity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_recommendation: Option<BudgetRecommendation>,
}

/// Compute the dashboard as seen on calendar date `now`
///
/// `records` are all the records of a single user, in any order. Ties in
/// rankings are resolved by their order in `records`.
pub fn snapshot(records: &[ExpenseRecord], now: Date, settings: &Settings) -> AnalyticsSnapshot {
    let _span = tracing::debug_span!("snapshot", as_of = %now, records = records.len()).entered();
    let windows = Windows::at(now);

    let category_breakdown = summary::sum_by_category(records, TimeWindow::ALL);
    let top_category = summary::top_category(records, TimeWindow::ALL);
    let monthly_trend = trend::monthly_trend(records, &windows);
    let monthly_totals = monthly_trend.iter().map(|m| m.total).collect::<Vec<_>>();
    let budget_recommendation = stats::recommend(&monthly_totals, settings.budget_margin);
    debug!(
        categories = category_breakdown.len(),
        months = monthly_totals.len(),
        "grouped history"
    );

    let snapshot = AnalyticsSnapshot {
        as_of: now,
        today_total: summary::sum_in_window(records, windows.today()),
        month_total: summary::sum_in_window(records, windows.current_month()),
        year_total: summary::sum_in_window(records, windows.current_year()),
        top_category,
        category_breakdown,
        monthly_trend,
        weekly_series: trend::weekly_series(records, &windows),
        category_bar: trend::category_bar(records),
        expense_count: summary::count_in_window(records, TimeWindow::ALL),
        avg_daily_spending: trend::average_daily(records, &windows),
        top_expenses: summary::top_n_expenses(records, settings.top_expenses)
            .into_iter()
            .cloned()
            .collect(),
        month_comparison: trend::month_comparison(records, &windows),
        category_growth: trend::category_growth(records, &windows),
        weekday_pattern: trend::weekday_pattern(records, &windows),
        spending_velocity: trend::spending_velocity(records, &windows),
        budget_recommendation,
    };
    debug!(
        month_total = %snapshot.month_total,
        top_category = %snapshot.top_category,
        "snapshot ready"
    );
    snapshot
}

/// Same as `snapshot`, with "now" resolved from an instant in the
/// configured timezone
pub fn snapshot_at(
    records: &[ExpenseRecord],
    instant: DateTime<Utc>,
    settings: &Settings,
) -> AnalyticsSnapshot {
    snapshot(records, Date::resolve(instant, settings.zone), settings)
}
