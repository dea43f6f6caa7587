//! Core workflows of the gym platform: trainer assignment and change requests,
//! plan authoring, workout logging with progress tracking, and statistics.
//!
//! Every function takes the database connection explicitly and returns a
//! [`error::DomainError`] classified for the HTTP layer.

pub mod assignment;
pub mod error;
pub mod plans;
pub mod progress;
pub mod stats;

#[cfg(test)]
mod testing;

pub use error::{DomainError, Result};

use chrono::{NaiveDateTime, Utc};

/// Current UTC time as stored in the database.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
