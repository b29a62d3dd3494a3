//! Terminal rendering of a dashboard snapshot

use rust_decimal::Decimal;
use std::fmt;

use crate::cli::table::Table;
use crate::lib::{entry::Amount, snapshot::AnalyticsSnapshot};

/// All the tables of a snapshot, one per section
pub struct Report<'s> {
    data: &'s AnalyticsSnapshot,
}

impl<'s> Report<'s> {
    pub fn from(data: &'s AnalyticsSnapshot) -> Self {
        Self { data }
    }

    fn overview(&self) -> Table {
        let s = self.data;
        let mut table = Table::new("", &[""]).with_title(format!("Dashboard as of {}", s.as_of));
        table.push_line("Today", vec![s.today_total.to_string()]);
        table.push_line("This month", vec![s.month_total.to_string()]);
        table.push_line("This year", vec![s.year_total.to_string()]);
        table.push_line("Expenses", vec![s.expense_count.to_string()]);
        table.push_line("Daily average", vec![s.avg_daily_spending.to_string()]);
        table.push_line("Top category", vec![s.top_category.clone()]);
        table
    }

    fn categories(&self) -> Table {
        let all: Amount = self.data.category_breakdown.iter().map(|c| c.total).sum();
        let mut table = Table::new("Category", &["Total", "Share"]).with_title("Categories");
        for c in &self.data.category_breakdown {
            table.push_line(&c.category, vec![c.total.to_string(), share(c.total, all)]);
        }
        table
    }

    fn monthly_trend(&self) -> Table {
        let mut table = Table::new("Month", &["Total"]).with_title("Monthly trend");
        for m in &self.data.monthly_trend {
            table.push_line(&m.month, vec![m.total.to_string()]);
        }
        table
    }

    fn weekly_series(&self) -> Table {
        let mut table = Table::new("Day", &["Date", "Total"]).with_title("Last 7 days");
        for d in &self.data.weekly_series {
            table.push_line(&d.day, vec![d.date.to_string(), d.total.to_string()]);
        }
        table
    }

    fn month_comparison(&self) -> Table {
        let mut table = Table::new("Month", &["Total"]).with_title("Month over month");
        for m in &self.data.month_comparison {
            table.push_line(&m.month, vec![m.total.to_string()]);
        }
        table
    }

    fn category_growth(&self) -> Table {
        let mut table = Table::new("Category", &["Previous", "Current", "Growth %"])
            .with_title("Category growth");
        for g in &self.data.category_growth {
            table.push_line(
                &g.category,
                vec![
                    g.previous.to_string(),
                    g.current.to_string(),
                    format!("{:.2}", g.growth_rate),
                ],
            );
        }
        table
    }

    fn weekday_pattern(&self) -> Table {
        let mut table = Table::new("Day", &["Average", "Count"]).with_title("Weekday pattern");
        for w in &self.data.weekday_pattern {
            table.push_line(&w.day_name, vec![w.avg_amount.to_string(), w.frequency.to_string()]);
        }
        table
    }

    fn spending_velocity(&self) -> Table {
        let mut table =
            Table::new("Week of", &["Per day", "Expenses/day"]).with_title("Spending velocity");
        for v in &self.data.spending_velocity {
            table.push_line(
                v.week,
                vec![
                    v.amount_per_day.to_string(),
                    format!("{:.2}", v.expenses_per_day.round_dp(2)),
                ],
            );
        }
        table
    }

    fn top_expenses(&self) -> Table {
        let mut table =
            Table::new("Date", &["Category", "Amount", "Note"]).with_title("Largest expenses");
        for r in &self.data.top_expenses {
            table.push_line(
                r.date,
                vec![
                    r.category.clone(),
                    r.amount.to_string(),
                    r.note.clone().unwrap_or_default(),
                ],
            );
        }
        table
    }

    fn budget(&self) -> Table {
        let mut table = Table::new("", &[""]).with_title("Budget recommendation");
        if let Some(b) = &self.data.budget_recommendation {
            table.push_line("Recommended", vec![b.recommended_budget.to_string()]);
            table.push_line("Average month", vec![b.average.to_string()]);
            table.push_line("Highest month", vec![b.highest_month.to_string()]);
            table.push_line("Lowest month", vec![b.lowest_month.to_string()]);
            table.push_line(
                "Volatility",
                vec![b
                    .volatility
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string())],
            );
            table.push_line("Months", vec![b.months.to_string()]);
        }
        table
    }
}

/// Percentage of `part` in `all`, blank when it cannot be computed
fn share(part: Amount, all: Amount) -> String {
    part.0
        .checked_div(all.0)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| format!("{:.1}%", pct.round_dp(1)))
        .unwrap_or_default()
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.overview())?;
        let sections = [
            self.categories(),
            self.monthly_trend(),
            self.weekly_series(),
            self.month_comparison(),
            self.category_growth(),
            self.weekday_pattern(),
            self.spending_velocity(),
            self.top_expenses(),
            self.budget(),
        ];
        for table in sections.iter().filter(|t| !t.is_empty()) {
            writeln!(f, "{}", table)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        date::{Date, Month::*},
        snapshot::{snapshot, Settings},
        summary::test::records,
    };

    #[test]
    fn empty_sections_are_hidden() {
        let snap = snapshot(&[], Date::from(2024, Feb, 20).unwrap(), &Settings::default());
        let text = Report::from(&snap).to_string();
        assert!(text.contains("Dashboard as of 2024-Feb-20"));
        assert!(text.contains("Top category  │ None"));
        // the daily series is always shown
        assert!(text.contains("Last 7 days"));
        assert!(!text.contains("Categories"));
        assert!(!text.contains("Budget recommendation"));
    }

    #[test]
    fn full_report() {
        let feb = |d| Date::from(2024, Feb, d).unwrap();
        let recs = records(&[("30", "Food", feb(20)), ("10", "Books", feb(19))]);
        let snap = snapshot(&recs, feb(20), &Settings::default());
        let text = Report::from(&snap).to_string();
        assert!(text.contains("75.0%"));
        assert!(text.contains("Budget recommendation"));
        assert!(text.contains("Largest expenses"));
        assert!(text.contains("2024-Feb-19"));
    }

    #[test]
    fn shares() {
        assert_eq!(share(Amount::from(1), Amount::from(3)), "33.3%");
        assert_eq!(share(Amount::from(1), Amount::ZERO), "");
        assert_eq!(share(Amount(Decimal::MAX), Amount("0.5".parse().unwrap())), "");
    }
}
