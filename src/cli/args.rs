//! Command line configuration

use chrono::{Datelike, FixedOffset, NaiveDate};
use clap::{App, Arg, ArgMatches};
use rust_decimal::Decimal;
use std::ffi::OsString;

use crate::error::Error;
use crate::lib::{
    date::{Date, Month},
    entry::UserId,
    snapshot::Settings,
};

/// How to print the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
}

/// Everything the command line decides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file: String,
    pub user: Option<UserId>,
    /// Pinned reference date, otherwise the clock is read at startup
    pub today: Option<Date>,
    pub format: Format,
    pub verbosity: u64,
    pub settings: Settings,
}

pub fn app() -> App<'static, 'static> {
    App::new("billig-dash")
        .version(clap::crate_version!())
        .about("Dashboard analytics over an expense ledger")
        .arg(
            Arg::with_name("FILE")
                .help("Ledger file to read")
                .index(1)
                .default_value("expenses.led"),
        )
        .arg(
            Arg::with_name("user")
                .help("Only consider the records of this user")
                .long("user")
                .short("u")
                .takes_value(true)
                .value_name("ID"),
        )
        .arg(
            Arg::with_name("today")
                .help("Compute the dashboard as seen on this date")
                .long("today")
                .takes_value(true)
                .value_name("YYYY-MM-DD"),
        )
        .arg(
            Arg::with_name("utc-offset")
                .help("Timezone used to decide what today is")
                .long("utc-offset")
                .takes_value(true)
                .allow_hyphen_values(true)
                .value_name("+HH:MM")
                .default_value("+05:30"),
        )
        .arg(
            Arg::with_name("top")
                .help("How many of the largest expenses to list")
                .long("top")
                .takes_value(true)
                .value_name("N")
                .default_value("5"),
        )
        .arg(
            Arg::with_name("margin")
                .help("Multiplier from the average month to the recommended budget")
                .long("margin")
                .takes_value(true)
                .value_name("DECIMAL")
                .default_value("1.1"),
        )
        .arg(
            Arg::with_name("format")
                .help("Output format")
                .long("format")
                .short("f")
                .takes_value(true)
                .possible_values(&["table", "json"])
                .default_value("table"),
        )
        .arg(
            Arg::with_name("verbose")
                .help("Log more (repeat for even more), RUST_LOG takes precedence")
                .short("v")
                .multiple(true),
        )
}

impl Config {
    /// Parse an explicit argument list, the first item is the program name
    pub fn from_args<I, T>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = app().get_matches_from_safe(args)?;
        Self::from_matches(&matches)
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self, Error> {
        let user = match matches.value_of("user") {
            Some(u) => Some(UserId(u.parse().map_err(|_| {
                Error::Config(format!("'{}' is not a valid user id", u))
            })?)),
            None => None,
        };
        let today = matches.value_of("today").map(parse_date).transpose()?;
        let zone = parse_offset(matches.value_of("utc-offset").unwrap_or("+05:30"))?;
        let top = matches.value_of("top").unwrap_or("5");
        let top_expenses = top
            .parse::<usize>()
            .map_err(|_| Error::Config(format!("'{}' is not a valid count", top)))?;
        let margin = matches.value_of("margin").unwrap_or("1.1");
        let budget_margin = margin
            .parse::<Decimal>()
            .map_err(|_| Error::Config(format!("'{}' is not a valid decimal", margin)))?;
        if budget_margin.is_sign_negative() {
            return Err(Error::Config(format!("margin {} must not be negative", margin)));
        }
        let format = match matches.value_of("format") {
            Some("json") => Format::Json,
            _ => Format::Table,
        };
        Ok(Self {
            file: matches.value_of("FILE").unwrap_or("expenses.led").to_string(),
            user,
            today,
            format,
            verbosity: matches.occurrences_of("verbose"),
            settings: Settings {
                zone,
                top_expenses,
                budget_margin,
            },
        })
    }
}

/// `YYYY-MM-DD`
fn parse_date(s: &str) -> Result<Date, Error> {
    let invalid = || Error::Config(format!("'{}' is not a valid YYYY-MM-DD date", s));
    let naive = s.parse::<NaiveDate>().map_err(|_| invalid())?;
    let month = Month::from_number(naive.month()).ok_or_else(invalid)?;
    Date::from(naive.year(), month, naive.day())
        .map_err(|e| Error::Config(format!("'{}': {}", s, e)))
}

/// `+HH:MM`, `-HH:MM`, `Z` or `UTC`
fn parse_offset(s: &str) -> Result<FixedOffset, Error> {
    let invalid = || Error::Config(format!("'{}' is not a valid UTC offset (+HH:MM)", s));
    if s == "Z" || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours = hours.parse::<i32>().map_err(|_| invalid())?;
    let minutes = minutes.parse::<i32>().map_err(|_| invalid())?;
    if hours > 14 || minutes >= 60 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
