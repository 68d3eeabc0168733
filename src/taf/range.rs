//! Forecast time-range resolution
//!
//! Converts the `DDHH` token pair of a change group into an absolute,
//! timezone-localized interval anchored on the bulletin's issue instant.

use crate::tokens::DayHour;
use chrono::{DateTime, Datelike, Days, Months, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolve a `DDHH/DDHH` pair against the issue instant and localize both
/// ends to the target zone.
///
/// Each end is resolved independently: the instant is built in the issue
/// month and year (hour `24` maps to `00:00` of the following day), and an
/// instant that precedes the issue instant is advanced by exactly one
/// calendar month. Returns `None` when a day number does not exist in the
/// issue month.
#[must_use]
pub fn resolve_range(
    start: DayHour,
    end: DayHour,
    issue: DateTime<Utc>,
    tz: Tz,
) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let start = resolve_day_hour(start, issue)?.with_timezone(&tz);
    let end = resolve_day_hour(end, issue)?.with_timezone(&tz);
    Some((start, end))
}

fn resolve_day_hour(token: DayHour, issue: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let next_midnight = token.hour == 24;
    let hour = if next_midnight { 0 } else { token.hour };
    let mut instant = Utc
        .with_ymd_and_hms(issue.year(), issue.month(), token.day, hour, 0, 0)
        .single()?;
    if next_midnight {
        instant = instant.checked_add_days(Days::new(1))?;
    }
    if instant < issue {
        // crossed into the next month, variable month length respected
        instant = instant.checked_add_months(Months::new(1))?;
    }
    Some(instant)
}
