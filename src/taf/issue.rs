//! TAF issue-time extraction
//!
//! Recovers the bulletin's absolute issuance instant from its `DDHHMMZ`
//! token. The token carries no month or year; both are inferred from the
//! injected `now` with a single month-boundary rule (see `day_time_to_instant`).

use chrono::{DateTime, Datelike, Months, TimeDelta, TimeZone, Utc};
use tracing::debug;

/// Extract the issuance instant from a raw TAF bulletin.
///
/// The first `DDHHMMZ`-shaped token among the leading tokens supplies
/// day/hour/minute. If no such token exists, `now` is the last-resort
/// fallback.
#[must_use]
pub fn extract_issue_time(raw: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    for token in raw.split_whitespace() {
        if let Some(instant) = issue_token(token, now) {
            return instant;
        }
    }
    debug!("no DDHHMMZ token in bulletin, falling back to current instant");
    now
}

fn issue_token(token: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let digits = token.strip_suffix('Z')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = digits[..2].parse().ok()?;
    let hour: u32 = digits[2..4].parse().ok()?;
    let minute: u32 = digits[4..].parse().ok()?;
    day_time_to_instant(day, hour, minute, now)
}

/// Build an absolute UTC instant from a day-of-month and time, inferring
/// month and year from `now`.
///
/// Month-boundary rule: a candidate in the current month that lies more
/// than 48 hours in the future belongs to the previous month (a report is
/// never issued days ahead of its own publication; the margin absorbs clock
/// skew and the 30-hour TAF validity overlap). A day number that does not
/// exist in the current month resolves in the previous month as well.
pub(crate) fn day_time_to_instant(
    day: u32,
    hour: u32,
    minute: u32,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if !(1..=31).contains(&day) || hour > 23 || minute > 59 {
        return None;
    }
    let candidate = Utc
        .with_ymd_and_hms(now.year(), now.month(), day, hour, minute, 0)
        .single();
    match candidate {
        Some(instant) if instant <= now + TimeDelta::hours(48) => Some(instant),
        _ => {
            let anchor = now.checked_sub_months(Months::new(1))?;
            Utc.with_ymd_and_hms(anchor.year(), anchor.month(), day, hour, minute, 0)
                .single()
        }
    }
}
