//! Convert the contents of a ledger file into expense records

#![allow(clippy::upper_case_acronyms)]

use pest::Parser;
use pest_derive::*;
use rust_decimal::Decimal;
use tracing::warn;

/// Wrapper around Pest's `Pair`
type Pair<'i> = pest::iterators::Pair<'i, Rule>;
/// Wrapper around Pest's `Pairs`
type Pairs<'i> = pest::iterators::Pairs<'i, Rule>;

use crate::lib::{
    date::{Date, Month},
    entry::{Amount, ExpenseRecord, RecordId, UserId},
};
use crate::load::error;

/// Pest-generated parser
#[derive(Parser)]
#[grammar = "load/ledger.pest"]
pub struct LedgerParser;

/// Records of an unnamed block
pub const DEFAULT_USER: UserId = UserId(0);

// extract contents of wrapper rule
macro_rules! subrule {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No subrule"));
        assert!(items.next().is_none(), "Several subrules");
        fst
    }};
}

// extract three-element inner
macro_rules! triplet {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No 1st"));
        let snd = items.next().unwrap_or_else(|| panic!("No 2nd"));
        let thr = items.next().unwrap_or_else(|| panic!("No 3rd"));
        assert!(items.next().is_none());
        (fst, snd, thr)
    }};
}

/// Hands out record ids in file order
struct Ids(u64);

impl Ids {
    fn next(&mut self) -> RecordId {
        self.0 += 1;
        RecordId(self.0)
    }
}

/// Get the records of file `path` whose text is `contents`
///
/// Syntax errors are fatal and yield no record at all. Records that parse
/// but carry an impossible value are skipped with a warning, the others
/// are still returned.
///
/// Caller should determine the success of this function not through its
/// return value but by querying `errs` (e.g. with `errs.is_fatal()`).
pub fn extract(path: &str, errs: &mut error::Record, contents: &str) -> Vec<ExpenseRecord> {
    match LedgerParser::parse(Rule::program, contents) {
        Ok(pairs) => validate(path, errs, pairs),
        Err(e) => {
            errs.make("Parsing failure").from(e.with_path(path));
            Vec::new()
        }
    }
}

/// Sequentially validate each record, accumulating the correct ones
fn validate(path: &str, errs: &mut error::Record, pairs: Pairs) -> Vec<ExpenseRecord> {
    let mut ids = Ids(0);
    let mut records = Vec::new();
    for pair in pairs {
        match pair.as_rule() {
            Rule::user_block => {
                let mut inner = pair.into_inner();
                let head = inner.next().unwrap_or_else(|| panic!("No user id"));
                let user = match validate_user(path, errs, head) {
                    Some(user) => user,
                    None => continue,
                };
                for item in inner {
                    if let Some(rec) = validate_record(path, errs, &mut ids, user, item) {
                        records.push(rec);
                    }
                }
            }
            Rule::record => {
                if let Some(rec) = validate_record(path, errs, &mut ids, DEFAULT_USER, pair) {
                    records.push(rec);
                }
            }
            Rule::EOI => break,
            _ => unreachable!(),
        }
    }
    records
}

fn validate_user(path: &str, errs: &mut error::Record, pair: Pair) -> Option<UserId> {
    assert_eq!(pair.as_rule(), Rule::user_id);
    match pair.as_str().parse::<u64>() {
        Ok(id) => Some(UserId(id)),
        Err(e) => {
            let loc = (path, pair.as_span());
            errs.make("Invalid user id")
                .nonfatal()
                .span(&loc, "provided here")
                .text(format!("'{}' is not a valid user id: {}", pair.as_str(), e))
                .hint("the whole block is skipped");
            warn!(user = pair.as_str(), "skipping block with invalid user id");
            None
        }
    }
}

/// Check one record, `None` if it was skipped
fn validate_record(
    path: &str,
    errs: &mut error::Record,
    ids: &mut Ids,
    user: UserId,
    pair: Pair,
) -> Option<ExpenseRecord> {
    assert_eq!(pair.as_rule(), Rule::record);
    let loc = (path, pair.as_span());
    let mut inner = pair.into_inner();
    let date = inner.next().unwrap_or_else(|| panic!("No date"));
    let category = inner.next().unwrap_or_else(|| panic!("No category"));
    let amount = inner.next().unwrap_or_else(|| panic!("No amount"));
    let note = inner.next().map(|n| read_quoted(subrule!(n)).to_string());

    let date = validate_date(path, errs, date);
    let category = validate_category(path, errs, category);
    let amount = validate_amount(path, errs, amount);
    match (date, category, amount) {
        (Some(date), Some(category), Some(amount)) => Some(ExpenseRecord {
            id: ids.next(),
            user,
            amount,
            category,
            date,
            note,
        }),
        _ => {
            warn!(record = loc.1.as_str(), "skipping malformed record");
            None
        }
    }
}

fn validate_date(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Date> {
    assert_eq!(pair.as_rule(), Rule::date);
    let loc = (path, pair.as_span());
    let (year, month, day) = triplet!(pair);
    // grammar ensures 4 digits and 1 or 2 digits
    let year = year.as_str().parse::<i32>().ok()?;
    let day = day.as_str().parse::<u32>().ok()?;
    let month = match month.as_str().parse::<Month>() {
        Ok(month) => month,
        Err(()) => {
            errs.make("Invalid month")
                .nonfatal()
                .span(&loc, "provided here")
                .text(format!("'{}' is not a valid month", month.as_str()))
                .hint("Months are 'Jan', 'Feb', ..., 'Dec'")
                .hint("record is skipped");
            return None;
        }
    };
    match Date::from(year, month, day) {
        Ok(date) => Some(date),
        Err(e) => {
            errs.make("Invalid date")
                .nonfatal()
                .span(&loc, "provided here")
                .text(format!("{}", e))
                .hint(e.fix_hint())
                .hint("record is skipped");
            None
        }
    }
}

fn validate_category(path: &str, errs: &mut error::Record, pair: Pair) -> Option<String> {
    assert_eq!(pair.as_rule(), Rule::category);
    let loc = (path, pair.as_span());
    let inner = subrule!(pair);
    let name = match inner.as_rule() {
        Rule::identifier => inner.as_str(),
        Rule::quoted => read_quoted(inner).trim(),
        _ => unreachable!(),
    };
    if name.is_empty() {
        errs.make("Empty category")
            .nonfatal()
            .span(&loc, "provided here")
            .text("Every record needs a category")
            .hint("record is skipped");
        None
    } else {
        Some(name.to_string())
    }
}

/// Exclusive bound on the magnitude of a single amount: 10^15
///
/// Far beyond any real expense, and small enough that totals and squared
/// deviations over a ledger stay within the range of `Decimal`.
fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000_000_u64)
}

fn validate_amount(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Amount> {
    assert_eq!(pair.as_rule(), Rule::money_amount);
    match pair.as_str().parse::<Decimal>() {
        Ok(value) if value.abs() < max_amount() => Some(Amount(value)),
        Ok(_) => {
            let loc = (path, pair.as_span());
            errs.make("Amount too large")
                .nonfatal()
                .span(&loc, "provided here")
                .text(format!("'{}' exceeds the largest accepted amount", pair.as_str()))
                .hint(format!("amounts must stay below {}", max_amount()))
                .hint("record is skipped");
            None
        }
        Err(e) => {
            let loc = (path, pair.as_span());
            errs.make("Invalid amount")
                .nonfatal()
                .span(&loc, "provided here")
                .text(format!("'{}' cannot be represented: {}", pair.as_str(), e))
                .hint("use at most 28 significant digits")
                .hint("record is skipped");
            None
        }
    }
}

/// Contents of a quoted string, without the quotes
fn read_quoted(pair: Pair) -> &str {
    assert_eq!(pair.as_rule(), Rule::quoted);
    subrule!(pair).as_str()
}
