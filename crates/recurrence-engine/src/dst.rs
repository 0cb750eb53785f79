//! DST transition handling for computed wall-clock times.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// How far back to look for the offset in force before a spring-forward gap.
const GAP_LOOKBACK_HOURS: i64 = 3;

/// Policy for occurrences whose local time is ambiguous (fall-back fold).
///
/// Local times that do not exist (spring-forward gap) are always shifted
/// forward by the length of the gap, so 02:30 on a night where clocks jump
/// from 02:00 to 03:00 resolves to 03:30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DstPolicy {
    /// Use the first of the two instants (the pre-transition offset).
    #[default]
    Earlier,
    /// Use the second of the two instants (the post-transition offset).
    Later,
}

/// Resolve a local date-time in `tz` to an instant.
///
/// Returns `None` only when the arithmetic leaves chrono's representable range.
pub fn resolve_local(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, later) => {
            tracing::trace!(%local, %tz, ?policy, "resolving ambiguous local time");
            let chosen = match policy {
                DstPolicy::Earlier => earlier,
                DstPolicy::Later => later,
            };
            Some(chosen.with_timezone(&Utc))
        }
        LocalResult::None => {
            // Interpret the wall-clock time with the offset in force before the
            // gap, which lands the same distance past the gap's end.
            let before_gap = local.checked_sub_signed(Duration::hours(GAP_LOOKBACK_HOURS))?;
            let offset = tz.offset_from_local_datetime(&before_gap).earliest()?.fix();
            let utc = local
                .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?;
            tracing::trace!(%local, %tz, "local time falls in a DST gap, shifting forward");
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}
