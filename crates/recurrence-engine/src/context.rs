//! The per-call calculation context and the date-level modifiers.
//!
//! Frequency only matters in two places: the unit lookup in
//! [`CalculationContext::new`] and the decision of which modifiers apply.
//! Everything else runs the same code for every frequency.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use crate::calendar::{Calendar, CalendarUnit};
use crate::dst::DstPolicy;
use crate::rule::{Frequency, RecurrenceRule};
use crate::weekday::{days_after, WeekdaySet};

/// Everything one `next_occurrence` computation needs, derived from a rule.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CalculationContext {
    pub unit: CalendarUnit,
    pub interval: u32,
    pub weekdays: Option<WeekdaySet>,
    pub month: Option<u32>,
    pub day_of_month: Option<u32>,
    pub week_start: Weekday,
    pub time_zone: Tz,
    pub dst_policy: DstPolicy,
    pub preferred_time: Option<NaiveTime>,
    pub end_date: Option<DateTime<Utc>>,
}

impl CalculationContext {
    pub fn new(rule: &RecurrenceRule) -> Self {
        let frequency = rule.frequency();
        let unit = match frequency {
            Frequency::Daily => CalendarUnit::Day,
            Frequency::Weekly => CalendarUnit::Week,
            Frequency::Monthly => CalendarUnit::Month,
            Frequency::Yearly => CalendarUnit::Year,
        };
        let month_based = matches!(frequency, Frequency::Monthly | Frequency::Yearly);

        Self {
            unit,
            interval: rule.interval(),
            weekdays: rule.weekdays().filter(|_| frequency == Frequency::Weekly),
            month: rule.month().filter(|_| frequency == Frequency::Yearly),
            day_of_month: rule.day_of_month().filter(|_| month_based),
            week_start: rule.week_start(),
            time_zone: rule.time_zone(),
            dst_policy: rule.dst_policy(),
            preferred_time: rule.preferred_time(),
            end_date: rule.end_date(),
        }
    }

    /// Whether the day an occurrence lands on depends on the chain of earlier
    /// occurrences (month-end clamping without a pinned day of month).
    pub fn day_drifts(&self) -> bool {
        matches!(self.unit, CalendarUnit::Month | CalendarUnit::Year) && self.day_of_month.is_none()
    }

    /// Advance a local date by the interval and run the applicable modifiers.
    pub fn step_date<C: Calendar>(&self, calendar: &C, base: NaiveDate) -> Option<NaiveDate> {
        let advanced = calendar.add(base, self.unit, self.interval)?;

        let mut date = match self.weekdays {
            Some(days) => select_weekday(calendar, days, self.week_start, base, advanced)?,
            None => advanced,
        };
        if let Some(month) = self.month {
            date = calendar.with_month_clamped(date, month)?;
        }
        if let Some(day) = self.day_of_month {
            date = calendar.with_day_clamped(date, day)?;
        }
        Some(date)
    }
}

/// Pick the next selected weekday strictly after `base`.
///
/// A selected day later in `base`'s own week wins; otherwise the first selected
/// day of the week that `advanced` (base plus the interval in weeks) falls in.
fn select_weekday<C: Calendar>(
    calendar: &C,
    days: WeekdaySet,
    week_start: Weekday,
    base: NaiveDate,
    advanced: NaiveDate,
) -> Option<NaiveDate> {
    let position = days_after(week_start, calendar.weekday(base));

    let later_this_week = days
        .iter_from(week_start)
        .map(|day| days_after(week_start, day))
        .find(|&offset| offset > position);
    if let Some(offset) = later_this_week {
        return calendar.add(base, CalendarUnit::Day, offset - position);
    }

    let first = days.iter_from(week_start).next()?;
    let week_begin = advanced.checked_sub_days(Days::new(u64::from(
        days_after(week_start, calendar.weekday(advanced)),
    )))?;
    calendar.add(week_begin, CalendarUnit::Day, days_after(week_start, first))
}
