//! Pretty-printing facility for ledger diagnostics
//!
//! A thin layer over `pest::error::Error::new_from_span`: pest handles the
//! source excerpt, `Diagnostic` adds notes, hints and colors, and `Record`
//! aggregates the diagnostics of one file.
//!
//! # Example
//!
//! ```rust
//! errs.make("Invalid date")
//!     .nonfatal()
//!     .span(&loc, "provided here")
//!     .text("2023 is not bissextile, Feb 29 does not exist")
//!     .hint("record is skipped");
//! ```
//!
//! ```txt
//! --> Warning: Invalid date
//!  |     --> expenses.led:3:5
//!  |      |
//!  |    3 |     2023-Feb-29 Food 12;
//!  |      |     ^---------^
//!  |      |
//!  |      = provided here
//!  |  2023 is not bissextile, Feb 29 does not exist
//!  |      ? hint: record is skipped
//! ```

use std::fmt;

use crate::load::parse::Rule;

/// Location of a diagnostic: the file and the precise span within it
pub type Loc<'i> = (&'i str, pest::Span<'i>);

/// Report for a single problem
///
/// All messages should fit in a single line, use several `text` or `hint`
/// calls rather than embedded newlines.
#[must_use]
#[derive(Debug)]
pub struct Diagnostic {
    /// determines the label (warning/error) and the color (yellow/red)
    fatal: bool,
    label: String,
    items: Vec<Item>,
}

#[derive(Debug)]
enum Item {
    /// source excerpt
    Block(Box<pest::error::Error<Rule>>),
    /// important message
    Text(String),
    /// recommendation for a fix
    Hint(String),
}

/// All diagnostics emitted while reading one ledger
#[must_use]
#[derive(Debug, Default)]
pub struct Record {
    contents: Vec<Diagnostic>,
}

impl Diagnostic {
    fn new<S>(msg: S) -> Self
    where
        S: ToString,
    {
        Self {
            fatal: true,
            label: msg.to_string(),
            items: Vec::new(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Mark as a warning rather than a fatal error
    pub fn nonfatal(&mut self) -> &mut Self {
        self.fatal = false;
        self
    }

    /// Include a parsing failure reported by pest
    pub fn from(&mut self, err: pest::error::Error<Rule>) -> &mut Self {
        self.items
            .push(Item::Block(Box::new(err.renamed_rules(rule_rename))));
        self
    }

    /// Add a source excerpt and its associated message
    pub fn span<S>(&mut self, loc: &Loc, msg: S) -> &mut Self
    where
        S: ToString,
    {
        let block = pest::error::Error::new_from_span(
            pest::error::ErrorVariant::CustomError {
                message: msg.to_string(),
            },
            loc.1.clone(),
        )
        .with_path(loc.0);
        self.items.push(Item::Block(Box::new(block)));
        self
    }

    /// Add an important note
    pub fn text<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Text(msg.to_string()));
        self
    }

    /// Add a hint on how to fix
    pub fn hint<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Hint(msg.to_string()));
        self
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fatal diagnostic, use `nonfatal` to turn it into a warning
    pub fn make<S>(&mut self, msg: S) -> &mut Diagnostic
    where
        S: ToString,
    {
        let idx = self.contents.len();
        self.contents.push(Diagnostic::new(msg));
        &mut self.contents[idx]
    }

    /// Checks if any of the recorded diagnostics are fatal
    pub fn is_fatal(&self) -> bool {
        self.iter().any(Diagnostic::is_fatal)
    }

    pub fn count_errors(&self) -> usize {
        self.iter().filter(|d| d.is_fatal()).count()
    }

    pub fn count_warnings(&self) -> usize {
        self.contents.len() - self.count_errors()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.contents.iter()
    }
}

const RED: &str = "\x1b[0;91;1m";
const YELLOW: &str = "\x1b[0;93;1m";
const BLUE: &str = "\x1b[0;96;1m";
const WHITE: &str = "\x1b[0;1m";
const NONE: &str = "\x1b[0m";

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (color, header) = if self.fatal {
            (RED, "--> Error")
        } else {
            (YELLOW, "--> Warning")
        };
        writeln!(f, "{}{}:{} {}{}", color, header, WHITE, self.label(), NONE)?;
        for item in &self.items {
            match item {
                Item::Block(err) => {
                    for line in err.to_string().lines() {
                        writeln!(f, " {}|{}  {}{}", color, BLUE, line, NONE)?;
                    }
                }
                Item::Text(txt) => {
                    writeln!(f, " {}|  {}{}{}", color, WHITE, txt, NONE)?;
                }
                Item::Hint(txt) => {
                    writeln!(f, " {}|      {}? hint: {}{}", color, BLUE, NONE, txt)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contents.is_empty() {
            return Ok(());
        }
        // only print the diagnostics with the maximum fatality
        let fatal = self.is_fatal();
        let count = if fatal {
            self.count_errors()
        } else {
            self.count_warnings()
        };
        let color = if fatal { RED } else { YELLOW };
        let trunc = 10;
        for diag in self.iter().filter(|d| d.is_fatal() == fatal).take(trunc) {
            writeln!(f, "{}", diag)?;
        }
        if count > trunc {
            writeln!(f, "{} And {} more.", color, count - trunc)?;
        }
        let plural = if count > 1 { "s" } else { "" };
        let (kind, what) = if fatal {
            ("Fatal", "error")
        } else {
            ("Nonfatal", "warning")
        };
        writeln!(
            f,
            "{}{}: {}{} {}{} emitted{}",
            color, kind, WHITE, count, what, plural, NONE
        )
    }
}

fn rule_rename(r: &Rule) -> String {
    String::from(match r {
        Rule::EOI => "EOF",
        Rule::year => "a 4-digit year",
        Rule::month => "a month ('Jan' ... 'Dec')",
        Rule::day => "a 1- or 2-digit day number",
        Rule::date => "a date ('YYYY-Mmm-DD')",
        Rule::money_amount => "a monetary value ('XXX.XX')",
        Rule::string => "a string of non-'\"' characters",
        Rule::quoted => "a quoted string ('\"foo\"')",
        Rule::identifier => "an identifier composed of a..zA..Z0..9-_",
        Rule::category => "a category ('Food' or '\"Eating out\"')",
        Rule::note => "a note ('\"foo\"')",
        Rule::record => "a record ('YYYY-Mmm-DD Category XXX.XX \"note\";')",
        Rule::user_id => "a numeric user id",
        Rule::user_block => "a user block ('user 1 { ... }')",
        _ => return format!("{:?}", r),
    })
}
