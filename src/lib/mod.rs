//! Implementations that are useful accross the whole project
//!
//! Date management, expense records, and the dashboard analytics
//! computed over them

pub mod date;
pub mod entry;
pub mod period;
pub mod snapshot;
pub mod stats;
pub mod summary;
pub mod trend;
