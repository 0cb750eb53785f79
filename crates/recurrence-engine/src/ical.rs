//! RFC 5545 `RRULE` export.
//!
//! Lets a rule be handed to calendar tooling that speaks iCalendar. The export
//! is faithful for daily and weekly rules. For monthly and yearly rules RFC 5545
//! skips months that lack `BYMONTHDAY` (no Feb 31 occurrence at all) where this
//! engine clamps to the month's last day, so those rules only agree on months
//! long enough to hold the target day.

use chrono::{Duration, Weekday};

use crate::rule::{Frequency, RecurrenceRule};

/// The RFC 5545 `UNTIL` value format (UTC, basic form).
const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";

fn freq_name(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Daily => "DAILY",
        Frequency::Weekly => "WEEKLY",
        Frequency::Monthly => "MONTHLY",
        Frequency::Yearly => "YEARLY",
    }
}

fn byday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

impl RecurrenceRule {
    /// Render the rule as an RFC 5545 `RRULE` value (without the `RRULE:` prefix).
    ///
    /// `UNTIL` is inclusive in RFC 5545 while `end_date` is exclusive, so the
    /// exported bound is one second before `end_date`.
    pub fn to_rrule(&self) -> String {
        let mut parts = vec![
            format!("FREQ={}", freq_name(self.frequency())),
            format!("INTERVAL={}", self.interval()),
        ];

        match self.frequency() {
            Frequency::Weekly => {
                if let Some(days) = self.weekdays() {
                    let names: Vec<&str> = days.iter_from(self.week_start()).map(byday_name).collect();
                    parts.push(format!("BYDAY={}", names.join(",")));
                }
            }
            Frequency::Yearly => {
                if let Some(month) = self.month() {
                    parts.push(format!("BYMONTH={month}"));
                }
            }
            Frequency::Daily | Frequency::Monthly => {}
        }

        if matches!(self.frequency(), Frequency::Monthly | Frequency::Yearly) {
            if let Some(day) = self.day_of_month() {
                parts.push(format!("BYMONTHDAY={day}"));
            }
        }

        if let Some(count) = self.max_occurrences() {
            parts.push(format!("COUNT={count}"));
        } else if let Some(end) = self.end_date() {
            // RFC 5545 forbids COUNT and UNTIL together; COUNT wins.
            let last = end - Duration::seconds(1);
            parts.push(format!("UNTIL={}", last.format(UNTIL_FORMAT)));
        }

        if self.week_start() != Weekday::Mon {
            parts.push(format!("WKST={}", byday_name(self.week_start())));
        }

        parts.join(";")
    }
}
