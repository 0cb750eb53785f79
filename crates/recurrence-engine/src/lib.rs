//! # recurrence-engine
//!
//! Next-occurrence computation for recurring tasks and habits.
//!
//! Given a [`RecurrenceRule`] and the date of the last occurrence, the engine
//! computes the next one: advancing by whole calendar units in the rule's own
//! time zone, then selecting weekdays, clamping month-end days, applying the
//! preferred time of day and checking the end date. The same five steps run for
//! every frequency; frequency only picks the calendar unit and which modifiers
//! apply.
//!
//! The engine is pure and stateless. Persisting results, counting elapsed
//! occurrences, and scheduling notifications belong to the caller.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use recurrence_engine::{next_occurrence, Frequency, RecurrenceRule};
//!
//! let rule = RecurrenceRule::builder(Frequency::Monthly)
//!     .day_of_month(31)
//!     .build()
//!     .unwrap();
//! let after = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
//! let next = next_occurrence(&rule, after).unwrap();
//! assert_eq!(next, Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`rule`] — the validated rule value, its builder and serialized form
//! - [`engine`] — `next_occurrence`, `matches`, `occurrences`
//! - [`occurrences`] — the lazy occurrence iterator
//! - [`calendar`] — calendar arithmetic trait and the Gregorian calendar
//! - [`dst`] — resolving wall-clock times across DST transitions
//! - [`weekday`] — weekday sets and 1-7 weekday codes
//! - [`error`] — Error types

pub mod calendar;
mod context;
pub mod dst;
pub mod engine;
pub mod error;
mod ical;
pub mod occurrences;
pub mod rule;
pub mod weekday;

pub use calendar::{Calendar, CalendarUnit, Gregorian};
pub use dst::DstPolicy;
pub use engine::{matches, next_occurrence, occurrences, RecurrenceEngine};
pub use error::RuleError;
pub use occurrences::Occurrences;
pub use rule::{Frequency, RecurrenceRule, RecurrenceRuleBuilder};
pub use weekday::WeekdaySet;
