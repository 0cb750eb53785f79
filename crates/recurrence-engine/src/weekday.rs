//! Weekday sets and the numeric weekday codes used in serialized rules.
//!
//! Codes run 1 = Sunday through 7 = Saturday. Inside the crate weekdays are
//! always `chrono::Weekday`; codes only exist at the serialization boundary.

use std::fmt;

use chrono::Weekday;

use crate::error::{Result, RuleError};

/// Convert a 1-7 code (Sunday = 1) into a weekday.
pub fn weekday_from_code(code: u8) -> Result<Weekday> {
    match code {
        1 => Ok(Weekday::Sun),
        2 => Ok(Weekday::Mon),
        3 => Ok(Weekday::Tue),
        4 => Ok(Weekday::Wed),
        5 => Ok(Weekday::Thu),
        6 => Ok(Weekday::Fri),
        7 => Ok(Weekday::Sat),
        other => Err(RuleError::InvalidWeekday(other)),
    }
}

/// Convert a weekday into its 1-7 code (Sunday = 1).
pub fn weekday_code(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8 + 1
}

/// Number of days from `start` forward to `day` within one week (0..=6).
pub(crate) fn days_after(start: Weekday, day: Weekday) -> u32 {
    (day.num_days_from_sunday() + 7 - start.num_days_from_sunday()) % 7
}

/// A small set of weekdays, stored as a bitmask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    /// Build a set from 1-7 codes, rejecting any code out of range.
    pub fn from_codes(codes: &[u8]) -> Result<Self> {
        codes
            .iter()
            .try_fold(Self::EMPTY, |set, &code| Ok(set.with(weekday_from_code(code)?)))
    }

    #[must_use]
    pub fn with(self, day: Weekday) -> Self {
        WeekdaySet(self.0 | Self::bit(day))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in chronological order for a week beginning on `week_start`.
    pub fn iter_from(&self, week_start: Weekday) -> impl Iterator<Item = Weekday> + '_ {
        let mut day = week_start;
        (0..7).filter_map(move |_| {
            let current = day;
            day = day.succ();
            self.contains(current).then_some(current)
        })
    }

    /// Members in code order (Sunday first).
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.iter_from(Weekday::Sun)
    }

    /// The 1-7 codes of the members, ascending.
    pub fn codes(&self) -> Vec<u8> {
        self.iter().map(weekday_code).collect()
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_sunday()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, WeekdaySet::with)
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
