//! Error types for recurrence rule construction.
//!
//! These are the only failures in the crate. A rule that was built successfully
//! never makes the engine fail; "no further occurrence" is `None`, not an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Invalid interval: {0} (must be at least 1)")]
    InvalidInterval(u32),

    #[error("Weekday set is empty")]
    EmptyWeekdays,

    #[error("Invalid weekday code: {0} (expected 1 = Sunday through 7 = Saturday)")]
    InvalidWeekday(u8),

    #[error("Invalid day of month: {0} (expected 1-31)")]
    InvalidDayOfMonth(u32),

    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, RuleError>;
