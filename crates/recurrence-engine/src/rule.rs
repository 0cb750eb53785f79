//! Recurrence rules: the immutable value describing a repeating schedule.
//!
//! A rule is validated once, when it is built or deserialized. After that the
//! engine trusts it and never re-checks. Editing a rule means building a new
//! one, usually starting from [`RecurrenceRule::edit`].

use chrono::{DateTime, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{Result, RuleError};
use crate::weekday::{weekday_code, weekday_from_code, WeekdaySet};

/// How often a rule repeats. A non-repeating item simply has no rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A validated recurrence rule.
///
/// Fields that do not apply to the rule's frequency (for example `weekdays` on
/// a monthly rule) are kept but ignored by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleDocument", into = "RuleDocument")]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval: u32,
    weekdays: Option<WeekdaySet>,
    day_of_month: Option<u32>,
    month: Option<u32>,
    preferred_time: Option<NaiveTime>,
    time_zone: Tz,
    end_date: Option<DateTime<Utc>>,
    max_occurrences: Option<u32>,
    week_start: Weekday,
    dst_policy: DstPolicy,
}

impl RecurrenceRule {
    pub fn builder(frequency: Frequency) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::new(frequency)
    }

    /// Start a builder pre-filled with this rule's fields.
    pub fn edit(&self) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder {
            frequency: self.frequency,
            interval: self.interval,
            weekdays: self.weekdays,
            day_of_month: self.day_of_month,
            month: self.month,
            preferred_time: self
                .preferred_time
                .map(|t| (t.hour(), t.minute())),
            time_zone: self.time_zone,
            end_date: self.end_date,
            max_occurrences: self.max_occurrences,
            week_start: self.week_start,
            dst_policy: self.dst_policy,
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn weekdays(&self) -> Option<WeekdaySet> {
        self.weekdays
    }

    pub fn day_of_month(&self) -> Option<u32> {
        self.day_of_month
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn preferred_time(&self) -> Option<NaiveTime> {
        self.preferred_time
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn max_occurrences(&self) -> Option<u32> {
        self.max_occurrences
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn dst_policy(&self) -> DstPolicy {
        self.dst_policy
    }

    /// Whether another occurrence is allowed after `elapsed` have already happened.
    ///
    /// The engine does not count occurrences; callers that track how many have
    /// elapsed use this to enforce `max_occurrences`.
    pub fn allows_occurrence(&self, elapsed: u32) -> bool {
        self.max_occurrences.is_none_or(|max| elapsed < max)
    }

    /// How many occurrences remain after `elapsed`, or `None` when unbounded.
    pub fn remaining_occurrences(&self, elapsed: u32) -> Option<u32> {
        self.max_occurrences.map(|max| max.saturating_sub(elapsed))
    }
}

/// Builder for [`RecurrenceRule`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct RecurrenceRuleBuilder {
    frequency: Frequency,
    interval: u32,
    weekdays: Option<WeekdaySet>,
    day_of_month: Option<u32>,
    month: Option<u32>,
    preferred_time: Option<(u32, u32)>,
    time_zone: Tz,
    end_date: Option<DateTime<Utc>>,
    max_occurrences: Option<u32>,
    week_start: Weekday,
    dst_policy: DstPolicy,
}

impl RecurrenceRuleBuilder {
    fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            weekdays: None,
            day_of_month: None,
            month: None,
            preferred_time: None,
            time_zone: Tz::UTC,
            end_date: None,
            max_occurrences: None,
            week_start: Weekday::Sun,
            dst_policy: DstPolicy::default(),
        }
    }

    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn weekdays<I: IntoIterator<Item = Weekday>>(mut self, days: I) -> Self {
        self.weekdays = Some(days.into_iter().collect());
        self
    }

    pub fn weekday_set(mut self, days: Option<WeekdaySet>) -> Self {
        self.weekdays = days;
        self
    }

    pub fn day_of_month(mut self, day: u32) -> Self {
        self.day_of_month = Some(day);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn preferred_time(mut self, hour: u32, minute: u32) -> Self {
        self.preferred_time = Some((hour, minute));
        self
    }

    pub fn clear_preferred_time(mut self) -> Self {
        self.preferred_time = None;
        self
    }

    pub fn time_zone(mut self, tz: Tz) -> Self {
        self.time_zone = tz;
        self
    }

    pub fn end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn clear_end_date(mut self) -> Self {
        self.end_date = None;
        self
    }

    pub fn max_occurrences(mut self, max: u32) -> Self {
        self.max_occurrences = Some(max);
        self
    }

    pub fn week_start(mut self, day: Weekday) -> Self {
        self.week_start = day;
        self
    }

    pub fn dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    /// Validate and produce the rule.
    ///
    /// # Errors
    /// - `InvalidInterval` when the interval is zero.
    /// - `EmptyWeekdays` when a weekday set was given but is empty.
    /// - `InvalidDayOfMonth` / `InvalidMonth` for out-of-range values.
    /// - `InvalidTime` when the preferred time is not a clock time.
    pub fn build(self) -> Result<RecurrenceRule> {
        if self.interval < 1 {
            return Err(RuleError::InvalidInterval(self.interval));
        }
        if self.weekdays.is_some_and(|days| days.is_empty()) {
            return Err(RuleError::EmptyWeekdays);
        }
        if let Some(day) = self.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(RuleError::InvalidDayOfMonth(day));
            }
        }
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(RuleError::InvalidMonth(month));
            }
        }
        let preferred_time = self
            .preferred_time
            .map(|(hour, minute)| {
                NaiveTime::from_hms_opt(hour, minute, 0)
                    .ok_or_else(|| RuleError::InvalidTime(format!("{hour:02}:{minute:02}")))
            })
            .transpose()?;

        Ok(RecurrenceRule {
            frequency: self.frequency,
            interval: self.interval,
            weekdays: self.weekdays,
            day_of_month: self.day_of_month,
            month: self.month,
            preferred_time,
            time_zone: self.time_zone,
            end_date: self.end_date,
            max_occurrences: self.max_occurrences,
            week_start: self.week_start,
            dst_policy: self.dst_policy,
        })
    }
}

// ---------------------------------------------------------------------------
// Serialized form
// ---------------------------------------------------------------------------

const TIME_FORMAT: &str = "%H:%M";

fn default_interval() -> u32 {
    1
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

/// The on-disk shape of a rule: camelCase keys, weekday codes 1-7 (Sunday = 1),
/// `"HH:MM"` preferred time, IANA zone name, RFC 3339 end date.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RuleDocument {
    frequency: Frequency,
    #[serde(default = "default_interval")]
    interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weekdays: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    day_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preferred_time: Option<String>,
    #[serde(default = "default_time_zone")]
    time_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_occurrences: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    week_start: Option<u8>,
    #[serde(default)]
    dst_policy: DstPolicy,
}

impl TryFrom<RuleDocument> for RecurrenceRule {
    type Error = RuleError;

    fn try_from(doc: RuleDocument) -> Result<Self> {
        let time_zone: Tz = doc
            .time_zone
            .parse()
            .map_err(|_| RuleError::InvalidTimezone(doc.time_zone.clone()))?;

        let mut builder = RecurrenceRule::builder(doc.frequency)
            .interval(doc.interval)
            .time_zone(time_zone)
            .dst_policy(doc.dst_policy);

        if let Some(codes) = &doc.weekdays {
            builder = builder.weekday_set(Some(WeekdaySet::from_codes(codes)?));
        }
        if let Some(day) = doc.day_of_month {
            builder = builder.day_of_month(day);
        }
        if let Some(month) = doc.month {
            builder = builder.month(month);
        }
        if let Some(raw) = &doc.preferred_time {
            let time = NaiveTime::parse_from_str(raw, TIME_FORMAT)
                .map_err(|_| RuleError::InvalidTime(raw.clone()))?;
            builder = builder.preferred_time(time.hour(), time.minute());
        }
        if let Some(end) = doc.end_date {
            builder = builder.end_date(end);
        }
        if let Some(max) = doc.max_occurrences {
            builder = builder.max_occurrences(max);
        }
        if let Some(code) = doc.week_start {
            builder = builder.week_start(weekday_from_code(code)?);
        }

        builder.build()
    }
}

impl From<RecurrenceRule> for RuleDocument {
    fn from(rule: RecurrenceRule) -> Self {
        RuleDocument {
            frequency: rule.frequency,
            interval: rule.interval,
            weekdays: rule.weekdays.map(|days| days.codes()),
            day_of_month: rule.day_of_month,
            month: rule.month,
            preferred_time: rule
                .preferred_time
                .map(|t| t.format(TIME_FORMAT).to_string()),
            time_zone: rule.time_zone.name().to_string(),
            end_date: rule.end_date,
            max_occurrences: rule.max_occurrences,
            week_start: (rule.week_start != Weekday::Sun).then(|| weekday_code(rule.week_start)),
            dst_policy: rule.dst_policy,
        }
    }
}
