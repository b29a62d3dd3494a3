use rust_decimal::Decimal;
use serde::Serialize;
use std::{fmt, iter, ops};

use crate::lib::date::Date;

/// Exact monetary value
///
/// Never a float: sums over thousands of records must stay exact.
/// Arithmetic saturates at the bounds of `Decimal` instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(pub Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn nonzero(self) -> bool {
        !self.0.is_zero()
    }

    /// Divide by a count, `None` for a count of zero
    pub fn per(self, count: usize) -> Option<Self> {
        if count == 0 {
            None
        } else {
            self.0.checked_div(Decimal::from(count)).map(Self)
        }
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self(Decimal::from(units))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl ops::Add for Amount {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl ops::AddAssign for Amount {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl ops::Sub for Amount {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl iter::Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, a| acc + a)
    }
}

/// Identifier of a record, unique within a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

/// Owner of a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One dated, categorized expense
///
/// Read-only as far as the analytics are concerned. The category is
/// expected to be non-empty but nothing downstream relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseRecord {
    pub id: RecordId,
    #[serde(skip)]
    pub user: UserId,
    pub amount: Amount,
    pub category: String,
    pub date: Date,
    pub note: Option<String>,
}
