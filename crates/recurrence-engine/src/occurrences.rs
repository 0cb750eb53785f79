//! Lazy occurrence listing for calendar previews.

use std::iter::FusedIterator;

use chrono::{DateTime, Utc};

use crate::calendar::{Calendar, Gregorian};
use crate::engine::RecurrenceEngine;
use crate::rule::RecurrenceRule;

/// Iterator over successive occurrences of a rule.
///
/// Each item is fed back in as the next `after`. Iteration stops after `limit`
/// items, when the rule ends, or at the optional [`until`](Self::until) bound.
/// Nothing is computed ahead of time; cloning an unstarted iterator restarts it.
#[derive(Debug, Clone)]
pub struct Occurrences<C = Gregorian> {
    engine: RecurrenceEngine<C>,
    rule: RecurrenceRule,
    cursor: DateTime<Utc>,
    remaining: usize,
    until: Option<DateTime<Utc>>,
}

impl<C: Calendar> Occurrences<C> {
    pub(crate) fn new(
        engine: RecurrenceEngine<C>,
        rule: RecurrenceRule,
        after: DateTime<Utc>,
        limit: usize,
    ) -> Self {
        Self {
            engine,
            rule,
            cursor: after,
            remaining: limit,
            until: None,
        }
    }

    /// Stop before the first occurrence at or after `end`.
    #[must_use]
    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.until = Some(end);
        self
    }
}

impl<C: Calendar> Iterator for Occurrences<C> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let next = self
            .engine
            .next_occurrence(&self.rule, self.cursor)
            .filter(|at| self.until.is_none_or(|end| *at < end));

        match next {
            Some(at) => {
                self.cursor = at;
                self.remaining -= 1;
                Some(at)
            }
            None => {
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<C: Calendar> FusedIterator for Occurrences<C> {}
