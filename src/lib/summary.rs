//! Sums, counts and groupings of records over a window
//!
//! Every grouping puts a record in exactly one bucket, and orderings are
//! stable: among equal keys, the record or category seen first in the input
//! comes first.

use serde::Serialize;
use std::collections::HashMap;
use std::ops;

use crate::lib::{
    entry::{Amount, ExpenseRecord},
    period::{Duration, TimeWindow},
};

/// Placeholder category when there is nothing to rank
pub const NO_CATEGORY: &str = "None";

/// Total spent in one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
}

/// Total and count of the records of one window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    window: TimeWindow,
    total: Amount,
    count: usize,
}

impl Summary {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            total: Amount::ZERO,
            count: 0,
        }
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl ops::AddAssign<&ExpenseRecord> for Summary {
    fn add_assign(&mut self, record: &ExpenseRecord) {
        if self.window.contains(record.date) {
            self.total += record.amount;
            self.count += 1;
        }
    }
}

/// A collection of disjoint summaries in chronological order
#[derive(Debug)]
pub struct Calendar {
    items: Vec<Summary>,
}

impl Calendar {
    /// Split `window` into consecutive buckets of `count` units of `duration`
    pub fn from_spacing(window: TimeWindow, duration: Duration, count: u32) -> Self {
        Self {
            items: window
                .split(duration, count)
                .into_iter()
                .map(Summary::new)
                .collect(),
        }
    }

    /// Add each record to the unique bucket that contains its date, if any
    pub fn register(&mut self, records: &[ExpenseRecord]) {
        for record in records {
            // buckets are sorted and disjoint
            let idx = self
                .items
                .partition_point(|s| s.window.end() < record.date);
            if let Some(sum) = self.items.get_mut(idx) {
                *sum += record;
            }
        }
    }

    pub fn contents(&self) -> &[Summary] {
        &self.items
    }

    /// Buckets that received at least one record
    pub fn nonempty(&self) -> impl DoubleEndedIterator<Item = &Summary> + '_ {
        self.items.iter().filter(|s| !s.is_empty())
    }
}

fn in_window<'r>(
    records: &'r [ExpenseRecord],
    window: TimeWindow,
) -> impl Iterator<Item = &'r ExpenseRecord> {
    records.iter().filter(move |r| window.contains(r.date))
}

/// Total amount of the records dated within `window`, zero if there are none
pub fn sum_in_window(records: &[ExpenseRecord], window: TimeWindow) -> Amount {
    in_window(records, window).map(|r| r.amount).sum()
}

/// Number of records dated within `window`
pub fn count_in_window(records: &[ExpenseRecord], window: TimeWindow) -> usize {
    in_window(records, window).count()
}

/// Per-category totals in order of first appearance
fn group_by_category(records: &[ExpenseRecord], window: TimeWindow) -> Vec<CategoryTotal> {
    let mut index = HashMap::<&str, usize>::new();
    let mut groups = Vec::<CategoryTotal>::new();
    for record in in_window(records, window) {
        match index.get(record.category.as_str()) {
            Some(&i) => groups[i].total += record.amount,
            None => {
                index.insert(&record.category, groups.len());
                groups.push(CategoryTotal {
                    category: record.category.clone(),
                    total: record.amount,
                });
            }
        }
    }
    groups
}

/// Per-category totals, largest first; equal totals keep the order in
/// which their category first appears in `records`
pub fn sum_by_category(records: &[ExpenseRecord], window: TimeWindow) -> Vec<CategoryTotal> {
    let mut groups = group_by_category(records, window);
    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups
}

/// Per-category totals in alphabetical order of the category
pub fn sum_by_category_name(records: &[ExpenseRecord], window: TimeWindow) -> Vec<CategoryTotal> {
    let mut groups = group_by_category(records, window);
    groups.sort_by(|a, b| a.category.cmp(&b.category));
    groups
}

/// Category with the largest total, `NO_CATEGORY` if the window is empty
pub fn top_category(records: &[ExpenseRecord], window: TimeWindow) -> String {
    sum_by_category(records, window)
        .into_iter()
        .next()
        .map(|c| c.category)
        .unwrap_or_else(|| NO_CATEGORY.to_string())
}

/// The `n` largest records, ties in input order
pub fn top_n_expenses(records: &[ExpenseRecord], n: usize) -> Vec<&ExpenseRecord> {
    let mut sorted = records.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| b.amount.cmp(&a.amount));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::lib::{
        date::{Date, Month::*},
        entry::{RecordId, UserId},
    };

    macro_rules! dt {
        ( $y:tt - $m:tt - $d:tt ) => {
            Date::from($y, $m, $d).unwrap()
        };
    }

    /// Shorthand for building a record list with ids in order
    pub fn records(items: &[(&str, &str, Date)]) -> Vec<ExpenseRecord> {
        items
            .iter()
            .enumerate()
            .map(|(i, (amount, category, date))| ExpenseRecord {
                id: RecordId(i as u64 + 1),
                user: UserId(1),
                amount: amt(amount),
                category: category.to_string(),
                date: *date,
                note: None,
            })
            .collect()
    }

    pub fn amt(s: &str) -> Amount {
        Amount(s.parse().unwrap())
    }

    fn sample() -> Vec<ExpenseRecord> {
        records(&[
            ("12.50", "Food", dt!(2024-Feb-1)),
            ("40", "Rent", dt!(2024-Feb-3)),
            ("7.50", "Food", dt!(2024-Feb-3)),
            ("40", "Travel", dt!(2024-Jan-30)),
            ("3", "Books", dt!(2024-Feb-10)),
        ])
    }

    #[test]
    fn sums_and_counts() {
        let recs = sample();
        let feb = TimeWindow::new(dt!(2024-Feb-1), dt!(2024-Feb-29));
        assert_eq!(sum_in_window(&recs, feb), amt("63"));
        assert_eq!(count_in_window(&recs, feb), 4);
        assert_eq!(sum_in_window(&recs, TimeWindow::ALL), amt("103"));
        let empty = TimeWindow::day(dt!(2023-Feb-1));
        assert_eq!(sum_in_window(&recs, empty), Amount::ZERO);
        assert_eq!(count_in_window(&recs, empty), 0);
    }

    #[test]
    fn category_ordering() {
        let recs = sample();
        let by_total = sum_by_category(&recs, TimeWindow::ALL);
        let names = by_total.iter().map(|c| c.category.as_str()).collect::<Vec<_>>();
        // Rent and Travel tie at 40, Rent appears first
        assert_eq!(names, vec!["Rent", "Travel", "Food", "Books"]);
        assert_eq!(by_total[2].total, amt("20"));
        let by_name = sum_by_category_name(&recs, TimeWindow::ALL);
        let names = by_name.iter().map(|c| c.category.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Books", "Food", "Rent", "Travel"]);
    }

    #[test]
    fn category_totals_preserve_sum() {
        let recs = sample();
        let grouped: Amount = sum_by_category(&recs, TimeWindow::ALL)
            .into_iter()
            .map(|c| c.total)
            .sum();
        let direct: Amount = recs.iter().map(|r| r.amount).sum();
        assert_eq!(grouped, direct);
    }

    #[test]
    fn top_category_sentinel() {
        assert_eq!(top_category(&[], TimeWindow::ALL), NO_CATEGORY);
        assert_eq!(top_category(&sample(), TimeWindow::ALL), "Rent");
        let jan = TimeWindow::new(dt!(2024-Jan-1), dt!(2024-Jan-31));
        assert_eq!(top_category(&sample(), jan), "Travel");
    }

    #[test]
    fn top_expenses_stable() {
        let recs = sample();
        let top = top_n_expenses(&recs, 3);
        let ids = top.iter().map(|r| r.id.0).collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 4, 1]);
        assert_eq!(top_n_expenses(&recs, 10).len(), 5);
        assert!(top_n_expenses(&[], 5).is_empty());
    }

    #[test]
    fn calendar_buckets() {
        let recs = sample();
        let window = TimeWindow::new(dt!(2024-Jan-29), dt!(2024-Feb-4));
        let mut cal = Calendar::from_spacing(window, Duration::Day, 1);
        cal.register(&recs);
        let totals = cal.contents().iter().map(|s| s.total()).collect::<Vec<_>>();
        assert_eq!(totals.len(), 7);
        assert_eq!(totals[1], amt("40"));
        assert_eq!(totals[3], amt("12.50"));
        assert_eq!(totals[5], amt("47.50"));
        assert_eq!(cal.contents()[5].count(), 2);
        assert_eq!(cal.nonempty().count(), 3);
        // the Feb-10 record is outside every bucket
        let counted: usize = cal.contents().iter().map(|s| s.count()).sum();
        assert_eq!(counted, 4);
    }
}
