//! TAF group parsing and summary composition
//!
//! Walks a bulletin group by group, classifies each into a forecast-change
//! kind, carries a pending probability prefix across lines, and filters
//! groups whose interval has already elapsed. Parsed groups are rendered
//! into localized sentences by the summary composer.

use crate::taf::range::resolve_range;
use crate::tokens::{self, Token};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Localized interval of a change group
pub type Interval = (DateTime<Tz>, DateTime<Tz>);

/// Forecast-change kind of one bulletin group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Leading forecast line of the bulletin
    Base,
    /// `BECMG`, a permanent change within the interval
    ScheduledChange,
    /// `TEMPO`, a temporary fluctuation within the interval
    Temporary,
    /// `PROB30`/`PROB40` with the stated probability percent
    Probabilistic(u8),
}

/// One qualifying bulletin group: its kind, optional localized interval,
/// and the ordered condition phrases (wind, phenomena, cloud layers,
/// CAVOK marker) decoded from its tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastGroup {
    pub kind: GroupKind,
    pub interval: Option<Interval>,
    pub conditions: Vec<String>,
}

/// Parser state carried across bulletin lines.
///
/// A `PROB` line without condition tokens defers its prefix to the next
/// line; at most one prefix is pending, a later `PROB` replaces it.
#[derive(Debug, Clone)]
enum ScanState {
    Scanning,
    PendingProbability {
        percent: u8,
        range: Option<Interval>,
    },
}

/// Summarize a raw TAF bulletin into localized sentences, one per
/// forecast group, joined by newline.
///
/// `issue` anchors time-range resolution, `now` drives past-interval
/// filtering. When no group yields a sentence the raw bulletin is returned
/// verbatim, so non-empty input never produces an empty summary.
#[must_use]
pub fn summarize(raw: &str, issue: DateTime<Utc>, tz: Tz, now: DateTime<Utc>) -> String {
    let groups = parse_groups(raw, issue, tz, now);
    if groups.is_empty() {
        raw.trim().to_string()
    } else {
        groups
            .iter()
            .map(render_group)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse the bulletin into forecast groups, dropping groups whose interval
/// end is at or before `now`.
#[must_use]
pub fn parse_groups(
    raw: &str,
    issue: DateTime<Utc>,
    tz: Tz,
    now: DateTime<Utc>,
) -> Vec<ForecastGroup> {
    let mut groups: Vec<ForecastGroup> = Vec::new();
    let mut state = ScanState::Scanning;
    for line in segment_lines(raw) {
        state = step(&line, state, &mut groups, issue, tz, now);
    }
    groups
}

/// Split the bulletin into group token runs. A new run starts at every
/// physical line and before each group keyword, so single-line bulletins
/// parse identically to multi-line ones.
fn segment_lines(raw: &str) -> Vec<Vec<&str>> {
    let mut lines = Vec::new();
    for line in raw.lines() {
        let mut current: Vec<&str> = Vec::new();
        for token in line.split_whitespace() {
            if is_group_keyword(token) && !current.is_empty() {
                lines.push(current);
                current = Vec::new();
            }
            current.push(token);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

fn is_group_keyword(token: &str) -> bool {
    token == "BECMG" || token == "TEMPO" || probability(token).is_some() || is_from(token)
}

/// `FM` instantaneous-change groups are recognized but not decoded.
fn is_from(token: &str) -> bool {
    match token.strip_prefix("FM") {
        Some("") => true,
        Some(rest) => rest.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Probability percent of a `PROB30`/`PROB40` token.
fn probability(token: &str) -> Option<u8> {
    let digits = token.strip_prefix("PROB")?;
    if digits.len() == 2 && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

fn step(
    line: &[&str],
    state: ScanState,
    groups: &mut Vec<ForecastGroup>,
    issue: DateTime<Utc>,
    tz: Tz,
    now: DateTime<Utc>,
) -> ScanState {
    let Some(&first) = line.first() else {
        return state;
    };

    if is_from(first) {
        debug!(token = first, "ignoring FM group");
        return state;
    }

    if first == "BECMG" || first == "TEMPO" {
        let Some(range) = line
            .get(1)
            .and_then(|t| tokens::time_range(t))
            .and_then(|(s, e)| resolve_range(s, e, issue, tz))
        else {
            debug!(token = first, "change group without time range, dropped");
            return state;
        };
        // this group consumes a pending prefix even when filtered out
        if elapsed(&range, now) {
            debug!(token = first, "change group interval already past");
            return ScanState::Scanning;
        }
        let conditions = decode_conditions(&line[2..]);
        let kind = if first == "BECMG" {
            GroupKind::ScheduledChange
        } else if let ScanState::PendingProbability { percent, .. } = state {
            GroupKind::Probabilistic(percent)
        } else {
            GroupKind::Temporary
        };
        groups.push(ForecastGroup {
            kind,
            interval: Some(range),
            conditions,
        });
        return ScanState::Scanning;
    }

    if let Some(percent) = probability(first) {
        let range = line
            .get(1)
            .and_then(|t| tokens::time_range(t))
            .and_then(|(s, e)| resolve_range(s, e, issue, tz));
        let condition_tokens = if range.is_some() { &line[2..] } else { &line[1..] };
        if condition_tokens.is_empty() {
            // conditions follow on the next line; a later PROB replaces this
            return ScanState::PendingProbability { percent, range };
        }
        if let Some(range) = &range
            && elapsed(range, now)
        {
            debug!(percent, "probability group interval already past");
            return ScanState::Scanning;
        }
        groups.push(ForecastGroup {
            kind: GroupKind::Probabilistic(percent),
            interval: range,
            conditions: decode_conditions(condition_tokens),
        });
        return ScanState::Scanning;
    }

    // base-forecast line, possibly under a pending probability prefix
    let conditions = decode_conditions(line);
    match state {
        ScanState::PendingProbability { percent, range } => {
            if let Some(range) = &range
                && elapsed(range, now)
            {
                debug!(percent, "deferred probability interval already past");
                return ScanState::Scanning;
            }
            groups.push(ForecastGroup {
                kind: GroupKind::Probabilistic(percent),
                interval: range,
                conditions,
            });
            ScanState::Scanning
        }
        ScanState::Scanning => {
            if !conditions.is_empty() {
                groups.push(ForecastGroup {
                    kind: GroupKind::Base,
                    interval: None,
                    conditions,
                });
            }
            ScanState::Scanning
        }
    }
}

/// Decode the condition tokens of one group into ordered phrases: wind,
/// weather phenomena, cloud layers, CAVOK marker. Unmatched tokens are
/// silently dropped.
fn decode_conditions(condition_tokens: &[&str]) -> Vec<String> {
    let mut wind: Option<String> = None;
    let mut weather: Vec<String> = Vec::new();
    let mut clouds: Vec<String> = Vec::new();
    let mut cavok = false;

    for token in condition_tokens {
        match tokens::classify(token) {
            Some(Token::Wind(group)) => {
                if wind.is_none() {
                    wind = Some(group.phrase());
                }
            }
            Some(Token::Weather(phrase)) => weather.push(phrase.to_string()),
            Some(Token::Cloud(layer)) => clouds.push(layer.phrase()),
            Some(Token::Cavok) => cavok = true,
            Some(Token::TimeRange(..)) | None => {}
        }
    }

    let mut conditions: Vec<String> = Vec::new();
    conditions.extend(wind);
    conditions.append(&mut weather);
    conditions.append(&mut clouds);
    if cavok {
        conditions.push(crate::codes::CAVOK_PHRASE.to_string());
    }
    conditions
}

fn elapsed(range: &Interval, now: DateTime<Utc>) -> bool {
    range.1.with_timezone(&Utc) <= now
}

/// Render one forecast group into its localized sentence.
fn render_group(group: &ForecastGroup) -> String {
    let joined = group.conditions.join(", ");
    match group.kind {
        GroupKind::Base => format!("Основной прогноз: {joined}."),
        GroupKind::ScheduledChange => {
            let (start, end) = interval_hhmm(group.interval.as_ref());
            let cond = fallback(&joined, "изменение погоды");
            format!("С {start} до {end} ожидается {cond}.")
        }
        GroupKind::Temporary => {
            let (start, end) = interval_hhmm(group.interval.as_ref());
            let cond = fallback(&joined, "временное изменение погоды");
            format!("Временами ({start}-{end}) {cond}.")
        }
        GroupKind::Probabilistic(percent) => {
            let cond = fallback(&joined, "изменение погоды");
            let time_part = match group.interval.as_ref() {
                Some((start, end)) => {
                    format!(" ({}-{})", start.format("%H:%M"), end.format("%H:%M"))
                }
                None => String::new(),
            };
            format!("Вероятность {percent}%{time_part} {cond}.")
        }
    }
}

fn fallback<'a>(joined: &'a str, default: &'a str) -> &'a str {
    if joined.is_empty() { default } else { joined }
}

fn interval_hhmm(interval: Option<&Interval>) -> (String, String) {
    match interval {
        Some((start, end)) => (
            start.format("%H:%M").to_string(),
            end.format("%H:%M").to_string(),
        ),
        None => (String::new(), String::new()),
    }
}
