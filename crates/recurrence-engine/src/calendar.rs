//! Calendar arithmetic behind a small trait.
//!
//! The engine only ever asks a calendar three things: add N units to a date,
//! how long a month is, and which weekday a date falls on. All dates here are
//! local (zone-free) dates; zone handling happens in [`crate::dst`].

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

/// The calendar component a rule advances by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarUnit {
    Day,
    Week,
    Month,
    Year,
}

/// Component arithmetic on local dates.
///
/// Implementations must clamp month and year arithmetic to the last day of the
/// target month (Jan 31 + 1 month = Feb 28 or 29), never rolling over into the
/// following month. `None` means the result is outside the representable range.
pub trait Calendar {
    fn add(&self, date: NaiveDate, unit: CalendarUnit, amount: u32) -> Option<NaiveDate>;

    fn days_in_month(&self, year: i32, month: u32) -> u32;

    fn weekday(&self, date: NaiveDate) -> Weekday;

    /// Move `date` to `day` of its month, rounding down to the month's last day.
    fn with_day_clamped(&self, date: NaiveDate, day: u32) -> Option<NaiveDate> {
        let last = self.days_in_month(date.year(), date.month());
        NaiveDate::from_ymd_opt(date.year(), date.month(), day.min(last))
    }

    /// Move `date` to `month` of its year, keeping the day where possible.
    fn with_month_clamped(&self, date: NaiveDate, month: u32) -> Option<NaiveDate> {
        let last = self.days_in_month(date.year(), month);
        NaiveDate::from_ymd_opt(date.year(), month, date.day().min(last))
    }
}

/// The proleptic Gregorian calendar, as implemented by `chrono`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gregorian;

impl Calendar for Gregorian {
    fn add(&self, date: NaiveDate, unit: CalendarUnit, amount: u32) -> Option<NaiveDate> {
        match unit {
            CalendarUnit::Day => date.checked_add_days(Days::new(u64::from(amount))),
            CalendarUnit::Week => date.checked_add_days(Days::new(u64::from(amount) * 7)),
            // chrono clamps month arithmetic to the end of the target month.
            CalendarUnit::Month => date.checked_add_months(Months::new(amount)),
            CalendarUnit::Year => date.checked_add_months(Months::new(amount.checked_mul(12)?)),
        }
    }

    fn days_in_month(&self, year: i32, month: u32) -> u32 {
        match month {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(year) => 29,
            2 => 28,
            _ => 31,
        }
    }

    fn weekday(&self, date: NaiveDate) -> Weekday {
        date.weekday()
    }
}

/// Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
