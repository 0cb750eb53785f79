//! Next-occurrence computation and occurrence matching.
//!
//! Every call is a fresh computation over its inputs: the engine holds nothing
//! but a calendar, so it can be shared freely across threads.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::calendar::{Calendar, CalendarUnit, Gregorian};
use crate::context::CalculationContext;
use crate::dst::resolve_local;
use crate::occurrences::Occurrences;
use crate::rule::RecurrenceRule;
use crate::weekday::days_after;

/// Computes occurrences of recurrence rules over a [`Calendar`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecurrenceEngine<C = Gregorian> {
    calendar: C,
}

impl RecurrenceEngine<Gregorian> {
    pub fn new() -> Self {
        Self { calendar: Gregorian }
    }
}

impl<C: Calendar> RecurrenceEngine<C> {
    pub fn with_calendar(calendar: C) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// The next occurrence of `rule` strictly after `after`.
    ///
    /// 1. Build the calculation context (frequency -> calendar unit).
    /// 2. Advance `after`'s local date in the rule's zone by the interval.
    /// 3. Apply weekday selection, month pinning and day-of-month clamping.
    /// 4. Apply the preferred time, or keep `after`'s local time of day, and
    ///    resolve the wall-clock time under the rule's DST policy.
    /// 5. Reject the candidate if it is on or after the rule's end date.
    ///
    /// Returns `None` when the rule has ended (or, for absurdly distant
    /// dates, when the result is outside chrono's range).
    pub fn next_occurrence(
        &self,
        rule: &RecurrenceRule,
        after: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let ctx = CalculationContext::new(rule);
        let local_after = after.with_timezone(&ctx.time_zone).naive_local();

        let date = ctx.step_date(&self.calendar, local_after.date())?;
        let time = ctx.preferred_time.unwrap_or(local_after.time());
        let candidate = resolve_local(ctx.time_zone, date.and_time(time), ctx.dst_policy)?;

        if ctx.end_date.is_some_and(|end| candidate >= end) {
            tracing::debug!(%candidate, end = ?ctx.end_date, "rule has ended");
            return None;
        }

        tracing::trace!(%after, %candidate, unit = ?ctx.unit, interval = ctx.interval, "next occurrence");
        Some(candidate)
    }

    /// Whether `date` falls on an occurrence day of `rule` started at `anchor`.
    ///
    /// Compared at day granularity in the rule's zone. Days before the anchor
    /// never match. The anchor's own day matches when the anchor itself fits
    /// the rule's pattern (selected weekday, day of month, pinned month) and
    /// precedes the end date. Any other day matches exactly when chaining
    /// [`next_occurrence`](Self::next_occurrence) from `anchor` lands on it.
    pub fn matches(&self, rule: &RecurrenceRule, date: DateTime<Utc>, anchor: DateTime<Utc>) -> bool {
        let ctx = CalculationContext::new(rule);
        let anchor_day = anchor.with_timezone(&ctx.time_zone).date_naive();
        let day = date.with_timezone(&ctx.time_zone).date_naive();

        if day < anchor_day {
            return false;
        }
        if day == anchor_day {
            let started = ctx.end_date.is_none_or(|end| anchor < end);
            return started && self.fits_pattern(&ctx, anchor_day);
        }

        let on_schedule = if ctx.day_drifts() {
            self.reached_by_stepping(&ctx, anchor_day, day)
        } else {
            self.on_stride(&ctx, anchor_day, day)
        };
        on_schedule && self.before_end(rule, &ctx, anchor, day)
    }

    /// A lazy, restartable sequence of at most `limit` occurrences after `after`.
    pub fn occurrences(
        &self,
        rule: &RecurrenceRule,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Occurrences<C>
    where
        C: Clone,
    {
        Occurrences::new(self.clone(), rule.clone(), after, limit)
    }

    /// Closed-form membership test for rules whose occurrence days do not
    /// depend on earlier occurrences.
    fn on_stride(&self, ctx: &CalculationContext, anchor: NaiveDate, day: NaiveDate) -> bool {
        let cal = &self.calendar;
        let interval = i64::from(ctx.interval);

        match ctx.unit {
            CalendarUnit::Day => (day - anchor).num_days() % interval == 0,
            CalendarUnit::Week => match ctx.weekdays {
                None => (day - anchor).num_days() % (7 * interval) == 0,
                Some(days) => {
                    if !days.contains(cal.weekday(day)) {
                        return false;
                    }
                    // Distance between the two week starts, kept as a day count so
                    // dates at the edge of chrono's range never need shifting.
                    let offset =
                        |d: NaiveDate| i64::from(days_after(ctx.week_start, cal.weekday(d)));
                    let weeks = ((day - anchor).num_days() + offset(anchor) - offset(day)) / 7;
                    weeks % interval == 0
                }
            },
            CalendarUnit::Month | CalendarUnit::Year => {
                let step_months = match ctx.unit {
                    CalendarUnit::Year => 12 * interval,
                    _ => interval,
                };
                let expected_month = ctx.month.unwrap_or(anchor.month());
                let months = month_index(day) - month_index(anchor);

                let month_ok = if ctx.month.is_some() {
                    // Pinned yearly rules land in the pinned month of anchor.year + k*interval.
                    let years = i64::from(day.year() - anchor.year());
                    day.month() == expected_month && years >= 1 && years % interval == 0
                } else {
                    months >= 1 && months % step_months == 0
                };
                if !month_ok {
                    return false;
                }

                ctx.day_of_month.is_some_and(|target| {
                    day.day() == target.min(cal.days_in_month(day.year(), day.month()))
                })
            }
        }
    }

    /// Walk the date-only part of the computation from `anchor` until it
    /// reaches or passes `day`. Used for month/year rules whose day drifts
    /// under month-end clamping.
    fn reached_by_stepping(&self, ctx: &CalculationContext, anchor: NaiveDate, day: NaiveDate) -> bool {
        let mut current = anchor;
        while current < day {
            match ctx.step_date(&self.calendar, current) {
                Some(next) => current = next,
                None => return false,
            }
        }
        current == day
    }

    /// Whether the anchor's own day is one the rule could produce.
    fn fits_pattern(&self, ctx: &CalculationContext, day: NaiveDate) -> bool {
        let cal = &self.calendar;
        let weekday_ok = ctx.weekdays.is_none_or(|days| days.contains(cal.weekday(day)));
        let month_ok = ctx.month.is_none_or(|month| day.month() == month);
        let day_ok = ctx.day_of_month.is_none_or(|target| {
            day.day() == target.min(cal.days_in_month(day.year(), day.month()))
        });
        weekday_ok && month_ok && day_ok
    }

    /// Whether the occurrence on `day` (already known to be on schedule)
    /// precedes the rule's end date.
    ///
    /// Only the end date's own local day needs the occurrence's time of day.
    /// Without a preferred time that time is whatever the chain carries, which
    /// a DST gap may have shifted, so the chain is followed up to that day.
    fn before_end(
        &self,
        rule: &RecurrenceRule,
        ctx: &CalculationContext,
        anchor: DateTime<Utc>,
        day: NaiveDate,
    ) -> bool {
        let Some(end) = ctx.end_date else {
            return true;
        };
        let end_day = end.with_timezone(&ctx.time_zone).date_naive();
        if day != end_day {
            return day < end_day;
        }

        match ctx.preferred_time {
            Some(time) => resolve_local(ctx.time_zone, day.and_time(time), ctx.dst_policy)
                .is_some_and(|at| at < end),
            None => self.chain_reaches(rule, anchor, day),
        }
    }

    /// Follow `next_occurrence` from `anchor` until it reaches or passes `day`
    /// in the rule's zone. Terminates because the rule has an end date.
    fn chain_reaches(&self, rule: &RecurrenceRule, anchor: DateTime<Utc>, day: NaiveDate) -> bool {
        let tz = rule.time_zone();
        let mut cursor = anchor;
        while let Some(next) = self.next_occurrence(rule, cursor) {
            let landed = next.with_timezone(&tz).date_naive();
            if landed >= day {
                return landed == day;
            }
            cursor = next;
        }
        false
    }
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// [`RecurrenceEngine::next_occurrence`] on the Gregorian calendar.
pub fn next_occurrence(rule: &RecurrenceRule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    RecurrenceEngine::new().next_occurrence(rule, after)
}

/// [`RecurrenceEngine::matches`] on the Gregorian calendar.
pub fn matches(rule: &RecurrenceRule, date: DateTime<Utc>, anchor: DateTime<Utc>) -> bool {
    RecurrenceEngine::new().matches(rule, date, anchor)
}

/// [`RecurrenceEngine::occurrences`] on the Gregorian calendar.
pub fn occurrences(rule: &RecurrenceRule, after: DateTime<Utc>, limit: usize) -> Occurrences {
    RecurrenceEngine::new().occurrences(rule, after, limit)
}
