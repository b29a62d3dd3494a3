//! Failures that stop the program
//!
//! The analytics themselves cannot fail, everything here comes from the
//! command line, the filesystem or the ledger contents.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid value for one of the settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected command line
    #[error("{0}")]
    Cli(#[from] clap::Error),

    /// Ledger file could not be read
    #[error("Could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Ledger file has syntax errors
    #[error("Could not load '{path}': {errors} fatal error(s)")]
    Load { path: String, errors: usize },

    /// Several users in the ledger and no way to pick one
    #[error("Ledger holds records of several users ({0}), select one with --user")]
    AmbiguousUser(String),

    /// Report could not be written as JSON
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
