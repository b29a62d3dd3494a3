//! Ledger files: the expense store behind the command line
//!
//! Reading a ledger never fails on a single bad record, see `parse::extract`.

pub mod error;
pub mod parse;

use tracing::{debug, info};

use crate::error::Error;
use crate::lib::entry::{ExpenseRecord, UserId};

/// All the records of a ledger file, for every user
#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<ExpenseRecord>,
}

impl Ledger {
    pub fn from_records(records: Vec<ExpenseRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct owners of the records, in increasing order
    pub fn users(&self) -> Vec<UserId> {
        let mut users = self.records.iter().map(|r| r.user).collect::<Vec<_>>();
        users.sort_unstable();
        users.dedup();
        users
    }

    /// All records of `user`, most recent first; records of the same day
    /// stay in file order
    pub fn records_for(&self, user: UserId) -> Vec<ExpenseRecord> {
        let mut records = self
            .records
            .iter()
            .filter(|r| r.user == user)
            .cloned()
            .collect::<Vec<_>>();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        debug!(%user, count = records.len(), "fetched records");
        records
    }
}

/// Parse the text of a ledger, `None` if a fatal diagnostic was emitted
pub fn parse_ledger(filename: &str, contents: &str, errs: &mut error::Record) -> Option<Ledger> {
    let records = parse::extract(filename, errs, contents);
    if errs.is_fatal() {
        None
    } else {
        Some(Ledger::from_records(records))
    }
}

/// Read and parse ledger file `filename`
///
/// Diagnostics are accumulated in `errs` whether or not this succeeds.
pub fn read_ledger(filename: &str, errs: &mut error::Record) -> Result<Ledger, Error> {
    let contents = std::fs::read_to_string(filename).map_err(|source| Error::Io {
        path: filename.to_string(),
        source,
    })?;
    let ledger = parse_ledger(filename, &contents, errs).ok_or(Error::Load {
        path: filename.to_string(),
        errors: errs.count_errors(),
    })?;
    info!(
        file = filename,
        records = ledger.len(),
        warnings = errs.count_warnings(),
        "ledger loaded"
    );
    Ok(ledger)
}
