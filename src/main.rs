mod cli;
mod error;
mod lib;
mod load;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{
    args::{Config, Format},
    report::Report,
};
use error::Error;
use lib::{
    entry::{ExpenseRecord, UserId},
    snapshot::{snapshot, snapshot_at},
};
use load::Ledger;

fn main() {
    if let Err(e) = Config::from_args(std::env::args_os()).and_then(|config| run(&config)) {
        match e {
            // --help and --version land here too
            Error::Cli(e) => e.exit(),
            e => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run(config: &Config) -> Result<(), Error> {
    init_logging(config.verbosity);

    let mut errs = load::error::Record::new();
    let ledger = load::read_ledger(&config.file, &mut errs);
    eprint!("{}", errs);
    let ledger = ledger?;

    let records = select_records(&ledger, config.user)?;
    let snap = match config.today {
        Some(today) => snapshot(&records, today, &config.settings),
        None => snapshot_at(&records, Utc::now(), &config.settings),
    };

    match config.format {
        Format::Table => print!("{}", Report::from(&snap)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&snap)?),
    }
    Ok(())
}

/// Records of the requested user, or of the only user in the ledger
fn select_records(ledger: &Ledger, user: Option<UserId>) -> Result<Vec<ExpenseRecord>, Error> {
    if ledger.is_empty() {
        warn!("ledger holds no records");
        return Ok(Vec::new());
    }
    if let Some(user) = user {
        return Ok(ledger.records_for(user));
    }
    match ledger.users().as_slice() {
        [only] => {
            info!(user = %only, "single user in ledger");
            Ok(ledger.records_for(*only))
        }
        many => Err(Error::AmbiguousUser(
            many.iter()
                .map(|u| u.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )),
    }
}

/// Diagnostics go to stderr, `RUST_LOG` overrides the `-v` count
fn init_logging(verbosity: u64) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod test {
    use super::*;

    fn ledger(text: &str) -> Ledger {
        let mut errs = load::error::Record::new();
        load::parse_ledger("test.led", text, &mut errs).unwrap()
    }

    #[test]
    fn user_selection() {
        let two = ledger("user 1 { 2024-Jan-01 Food 1; } user 2 { 2024-Jan-02 Food 2; }");
        assert!(matches!(
            select_records(&two, None),
            Err(Error::AmbiguousUser(ref s)) if s == "1, 2"
        ));
        assert_eq!(select_records(&two, Some(UserId(2))).unwrap().len(), 1);
        assert!(select_records(&two, Some(UserId(9))).unwrap().is_empty());

        let one = ledger("user 4 { 2024-Jan-01 Food 1; 2024-Jan-03 Food 1; }");
        assert_eq!(select_records(&one, None).unwrap().len(), 2);

        let empty = ledger("// nothing yet\n");
        assert!(select_records(&empty, None).unwrap().is_empty());
        assert!(select_records(&empty, Some(UserId(1))).unwrap().is_empty());
    }
}
