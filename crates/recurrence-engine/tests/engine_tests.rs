//! Tests for next-occurrence computation.
//!
//! Covers the acceptance scenarios (month-end clamping, leap days, weekday
//! wrapping, intervals, end dates), preferred time handling, and DST.

use std::cell::Cell;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use recurrence_engine::{
    next_occurrence, Calendar, CalendarUnit, DstPolicy, Frequency, Gregorian, RecurrenceEngine,
    RecurrenceRule,
};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn midnight(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    utc(y, m, d, 0, 0)
}

// ---------------------------------------------------------------------------
// Acceptance scenarios
// ---------------------------------------------------------------------------

#[test]
fn monthly_31st_clamps_into_february() {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .day_of_month(31)
        .build()
        .unwrap();

    let next = next_occurrence(&rule, midnight(2025, 1, 31));
    assert_eq!(next, Some(midnight(2025, 2, 28)), "2025 is not a leap year");
}

#[test]
fn monthly_31st_recovers_after_short_month() {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .day_of_month(31)
        .build()
        .unwrap();

    let feb = next_occurrence(&rule, midnight(2025, 1, 31)).unwrap();
    let mar = next_occurrence(&rule, feb).unwrap();
    let apr = next_occurrence(&rule, mar).unwrap();
    assert_eq!(mar, midnight(2025, 3, 31));
    assert_eq!(apr, midnight(2025, 4, 30));
}

#[test]
fn monthly_31st_uses_leap_day_in_leap_year() {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .day_of_month(31)
        .build()
        .unwrap();

    assert_eq!(
        next_occurrence(&rule, midnight(2024, 1, 31)),
        Some(midnight(2024, 2, 29))
    );
}

#[test]
fn yearly_leap_day_falls_back_to_feb_28() {
    let rule = RecurrenceRule::builder(Frequency::Yearly)
        .day_of_month(29)
        .month(2)
        .build()
        .unwrap();

    let next = next_occurrence(&rule, midnight(2024, 2, 29)).unwrap();
    assert_eq!(next, midnight(2025, 2, 28), "not skipped to Mar 1");

    // The explicit day brings it back in the next leap year.
    let y2026 = next_occurrence(&rule, next).unwrap();
    let y2027 = next_occurrence(&rule, y2026).unwrap();
    let y2028 = next_occurrence(&rule, y2027).unwrap();
    assert_eq!(y2028, midnight(2028, 2, 29));
}

#[test]
fn weekly_mon_wed_fri_wraps_from_friday_to_monday() {
    let rule = RecurrenceRule::builder(Frequency::Weekly)
        .weekdays([Weekday::Mon, Weekday::Wed, Weekday::Fri])
        .build()
        .unwrap();

    // Fri 2025-01-10 -> Mon 2025-01-13
    let next = next_occurrence(&rule, utc(2025, 1, 10, 9, 0));
    assert_eq!(next, Some(utc(2025, 1, 13, 9, 0)));
}

#[test]
fn weekly_mon_wed_fri_stays_within_week_when_possible() {
    let rule = RecurrenceRule::builder(Frequency::Weekly)
        .weekdays([Weekday::Mon, Weekday::Wed, Weekday::Fri])
        .build()
        .unwrap();

    // Mon -> Wed -> Fri
    let wed = next_occurrence(&rule, utc(2025, 1, 6, 9, 0)).unwrap();
    let fri = next_occurrence(&rule, wed).unwrap();
    assert_eq!(wed, utc(2025, 1, 8, 9, 0));
    assert_eq!(fri, utc(2025, 1, 10, 9, 0));
}

#[test]
fn every_three_days() {
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .interval(3)
        .build()
        .unwrap();

    assert_eq!(
        next_occurrence(&rule, midnight(2025, 1, 1)),
        Some(midnight(2025, 1, 4))
    );
}

#[test]
fn end_date_excludes_later_occurrence() {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .day_of_month(15)
        .end_date(midnight(2025, 2, 1))
        .build()
        .unwrap();

    assert_eq!(next_occurrence(&rule, midnight(2025, 1, 15)), None);
}

#[test]
fn yearly_march_third() {
    let rule = RecurrenceRule::builder(Frequency::Yearly)
        .day_of_month(3)
        .month(3)
        .build()
        .unwrap();

    assert_eq!(
        next_occurrence(&rule, midnight(2025, 3, 3)),
        Some(midnight(2026, 3, 3))
    );
}

// ---------------------------------------------------------------------------
// End date boundary
// ---------------------------------------------------------------------------

#[test]
fn occurrence_exactly_on_end_date_is_excluded() {
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .end_date(midnight(2025, 1, 2))
        .build()
        .unwrap();

    assert_eq!(next_occurrence(&rule, midnight(2025, 1, 1)), None);
}

#[test]
fn occurrence_just_before_end_date_is_kept() {
    let end = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 1).unwrap();
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .end_date(end)
        .build()
        .unwrap();

    assert_eq!(
        next_occurrence(&rule, midnight(2025, 1, 1)),
        Some(midnight(2025, 1, 2))
    );
}

// ---------------------------------------------------------------------------
// Frequencies without modifiers
// ---------------------------------------------------------------------------

#[test]
fn weekly_without_weekdays_repeats_same_weekday() {
    let rule = RecurrenceRule::builder(Frequency::Weekly)
        .interval(2)
        .build()
        .unwrap();

    // Wed 2025-01-01 -> Wed 2025-01-15
    let next = next_occurrence(&rule, utc(2025, 1, 1, 18, 30)).unwrap();
    assert_eq!(next, utc(2025, 1, 15, 18, 30));
    assert_eq!(next.weekday(), Weekday::Wed);
}

#[test]
fn biweekly_tue_thu_skips_alternate_weeks() {
    let rule = RecurrenceRule::builder(Frequency::Weekly)
        .interval(2)
        .weekdays([Weekday::Tue, Weekday::Thu])
        .build()
        .unwrap();

    let mut at = utc(2026, 1, 6, 10, 0);
    let mut seen = Vec::new();
    for _ in 0..5 {
        at = next_occurrence(&rule, at).unwrap();
        seen.push((at.month(), at.day()));
    }
    assert_eq!(seen, vec![(1, 8), (1, 20), (1, 22), (2, 3), (2, 5)]);
}

#[test]
fn monthly_without_day_drifts_after_clamping() {
    let rule = RecurrenceRule::builder(Frequency::Monthly).build().unwrap();

    let feb = next_occurrence(&rule, midnight(2025, 1, 31)).unwrap();
    let mar = next_occurrence(&rule, feb).unwrap();
    assert_eq!(feb, midnight(2025, 2, 28));
    assert_eq!(mar, midnight(2025, 3, 28));
}

#[test]
fn quarterly_rule_advances_three_months() {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .interval(3)
        .day_of_month(30)
        .build()
        .unwrap();

    assert_eq!(
        next_occurrence(&rule, midnight(2024, 11, 30)),
        Some(midnight(2025, 2, 28))
    );
}

#[test]
fn yearly_without_day_keeps_anchor_day() {
    let rule = RecurrenceRule::builder(Frequency::Yearly).build().unwrap();
    assert_eq!(
        next_occurrence(&rule, utc(2025, 7, 4, 12, 0)),
        Some(utc(2026, 7, 4, 12, 0))
    );
}

#[test]
fn fields_for_other_frequencies_are_ignored() {
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .weekdays([Weekday::Sat])
        .day_of_month(20)
        .month(6)
        .build()
        .unwrap();

    assert_eq!(
        next_occurrence(&rule, midnight(2025, 1, 1)),
        Some(midnight(2025, 1, 2))
    );
}

// ---------------------------------------------------------------------------
// Preferred time and time zones
// ---------------------------------------------------------------------------

#[test]
fn unset_preferred_time_keeps_time_of_day() {
    let rule = RecurrenceRule::builder(Frequency::Daily).build().unwrap();
    assert_eq!(
        next_occurrence(&rule, utc(2025, 5, 1, 17, 45)),
        Some(utc(2025, 5, 2, 17, 45))
    );
}

#[test]
fn preferred_time_overrides_time_of_day() {
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .preferred_time(7, 15)
        .build()
        .unwrap();
    assert_eq!(
        next_occurrence(&rule, utc(2025, 5, 1, 17, 45)),
        Some(utc(2025, 5, 2, 7, 15))
    );
}

#[test]
fn calendar_days_are_taken_in_the_rule_zone() {
    let tokyo: Tz = "Asia/Tokyo".parse().unwrap();
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .day_of_month(31)
        .time_zone(tokyo)
        .build()
        .unwrap();

    // 2025-01-30T15:00Z is midnight on Jan 31 in Tokyo.
    let next = next_occurrence(&rule, utc(2025, 1, 30, 15, 0)).unwrap();
    // Midnight Feb 28 in Tokyo.
    assert_eq!(next, utc(2025, 2, 27, 15, 0));
}

#[test]
fn preferred_time_holds_across_spring_forward() {
    let ny: Tz = "America/New_York".parse().unwrap();
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .preferred_time(9, 0)
        .time_zone(ny)
        .build()
        .unwrap();

    // 09:00 EST on Mar 7 -> 09:00 EDT on Mar 8 (UTC-4).
    let next = next_occurrence(&rule, utc(2026, 3, 7, 14, 0)).unwrap();
    assert_eq!(next, utc(2026, 3, 8, 13, 0));
}

#[test]
fn time_of_day_holds_across_fall_back() {
    let ny: Tz = "America/New_York".parse().unwrap();
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .time_zone(ny)
        .build()
        .unwrap();

    // 18:00 EDT on Oct 31 -> 18:00 EST on Nov 1 (UTC-5).
    let next = next_occurrence(&rule, utc(2026, 10, 31, 22, 0)).unwrap();
    assert_eq!(next, utc(2026, 11, 1, 23, 0));
}

#[test]
fn preferred_time_in_gap_shifts_forward() {
    let ny: Tz = "America/New_York".parse().unwrap();
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .preferred_time(2, 30)
        .time_zone(ny)
        .build()
        .unwrap();

    // 02:30 on Mar 8 does not exist; it becomes 03:30 EDT (07:30 UTC).
    let gap_day = next_occurrence(&rule, utc(2026, 3, 7, 7, 30)).unwrap();
    assert_eq!(gap_day, utc(2026, 3, 8, 7, 30));

    // The following day is back at 02:30 local.
    let after_gap = next_occurrence(&rule, gap_day).unwrap();
    assert_eq!(after_gap, utc(2026, 3, 9, 6, 30));
}

#[test]
fn ambiguous_time_follows_dst_policy() {
    let ny: Tz = "America/New_York".parse().unwrap();
    let builder = RecurrenceRule::builder(Frequency::Daily)
        .preferred_time(1, 30)
        .time_zone(ny);
    let earlier = builder.clone().build().unwrap();
    let later = builder.dst_policy(DstPolicy::Later).build().unwrap();

    let after = utc(2026, 10, 31, 5, 30);
    assert_eq!(next_occurrence(&earlier, after), Some(utc(2026, 11, 1, 5, 30)));
    assert_eq!(next_occurrence(&later, after), Some(utc(2026, 11, 1, 6, 30)));
}

// ---------------------------------------------------------------------------
// Custom calendars
// ---------------------------------------------------------------------------

/// Delegates to the Gregorian calendar while counting `add` calls.
#[derive(Default)]
struct CountingCalendar {
    adds: Cell<usize>,
}

impl Calendar for CountingCalendar {
    fn add(&self, date: NaiveDate, unit: CalendarUnit, amount: u32) -> Option<NaiveDate> {
        self.adds.set(self.adds.get() + 1);
        Gregorian.add(date, unit, amount)
    }

    fn days_in_month(&self, year: i32, month: u32) -> u32 {
        Gregorian.days_in_month(year, month)
    }

    fn weekday(&self, date: NaiveDate) -> Weekday {
        Gregorian.weekday(date)
    }
}

#[test]
fn engine_does_its_arithmetic_through_the_calendar() {
    let engine = RecurrenceEngine::with_calendar(CountingCalendar::default());
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .day_of_month(31)
        .build()
        .unwrap();

    let next = engine.next_occurrence(&rule, midnight(2025, 1, 31));
    assert_eq!(next, Some(midnight(2025, 2, 28)));
    assert_eq!(engine.calendar().adds.get(), 1, "one advance per computation");
}

#[test]
fn engine_and_free_function_agree() {
    let rule = RecurrenceRule::builder(Frequency::Weekly)
        .weekdays([Weekday::Tue, Weekday::Sat])
        .build()
        .unwrap();
    let after = utc(2025, 6, 4, 8, 0);
    assert_eq!(
        RecurrenceEngine::new().next_occurrence(&rule, after),
        next_occurrence(&rule, after)
    );
}
