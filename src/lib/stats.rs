//! Descriptive statistics over monthly totals and the budget derived from them

use rust_decimal::{Decimal, MathematicalOps};
use serde::Serialize;

use crate::lib::entry::Amount;

/// Multiplier applied to the mean monthly spending to get a budget: 1.1
pub fn default_margin() -> Decimal {
    Decimal::new(11, 1)
}

/// Suggested monthly budget and the spread of the months it is based on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecommendation {
    pub recommended_budget: Amount,
    pub average: Amount,
    pub highest_month: Amount,
    pub lowest_month: Amount,
    /// Sample standard deviation, absent with fewer than two months
    pub volatility: Option<Amount>,
    pub months: usize,
}

/// Arithmetic mean, `None` for an empty input
pub fn mean(values: &[Amount]) -> Option<Amount> {
    values.iter().copied().sum::<Amount>().per(values.len())
}

/// Sample standard deviation (divides by `n - 1`), `None` below two values
/// or when the squared deviations do not fit in a `Decimal`
pub fn sample_std_dev(values: &[Amount]) -> Option<Amount> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?.0;
    let squares = values.iter().try_fold(Decimal::ZERO, |acc, v| {
        let dev = v.0.checked_sub(avg)?;
        acc.checked_add(dev.checked_mul(dev)?)
    })?;
    let variance = squares.checked_div(Decimal::from(values.len() - 1))?;
    variance.sqrt().map(Amount)
}

/// Budget recommendation from one total per month, `None` when there is
/// no month to base it on
pub fn recommend(monthly_totals: &[Amount], margin: Decimal) -> Option<BudgetRecommendation> {
    let average = mean(monthly_totals)?;
    Some(BudgetRecommendation {
        recommended_budget: Amount(average.0.saturating_mul(margin)),
        average,
        highest_month: monthly_totals.iter().copied().max()?,
        lowest_month: monthly_totals.iter().copied().min()?,
        volatility: sample_std_dev(monthly_totals),
        months: monthly_totals.len(),
    })
}
