//! METAR observation decoding
//!
//! Decodes one raw observation line into a structured [`Observation`]
//! record. Decoding is best-effort: a sub-token that cannot be classified
//! is skipped and never fails the decode. The only error path is input
//! with no usable report time.

use crate::error::MetbriefError;
use crate::taf::issue::day_time_to_instant;
use crate::tokens::{self, CloudLayer, WindDirection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inches-of-mercury to hectopascal conversion factor
const INHG_TO_HPA: f64 = 33.8639;

/// One decoded METAR observation. Constructed once per decode call and
/// immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Four-letter station code
    pub icao: String,
    /// Observation instant (reports carry no timezone marker, UTC is the
    /// ICAO convention)
    pub time: DateTime<Utc>,
    /// Pressure in whole hectopascals, resolved through the four-tier
    /// cascade of [`resolve_pressure`]
    pub pressure_hpa: Option<i32>,
    /// Temperature in degrees Celsius
    pub temperature_c: Option<f32>,
    /// Dewpoint in degrees Celsius
    pub dewpoint_c: Option<f32>,
    /// Wind direction, or the variable-direction sentinel
    pub wind_direction: Option<WindDirection>,
    /// Wind speed in km/h
    pub wind_speed_kmh: Option<u32>,
    /// Wind gust in km/h
    pub wind_gust_kmh: Option<u32>,
    /// Visibility in meters
    pub visibility_m: Option<u32>,
    /// Composed sky-cover description, one entry per reported layer
    pub sky: Option<String>,
    /// Significant-weather group codes, order as reported
    pub phenomena: Vec<String>,
    /// Raw source text
    pub raw: String,
}

/// Pressure groups picked up during the token walk
#[derive(Debug, Default)]
struct PressureSources {
    /// `Q####` group value, hectopascals
    station_hpa: Option<i32>,
    /// `A####` group value, inches of mercury
    altimeter_inhg: Option<f64>,
}

/// Decode a raw METAR line into an [`Observation`].
///
/// `icao` names the target station (validation context only), `now`
/// anchors the month/year inference for the `DDHHMMZ` report time.
pub fn decode(raw: &str, icao: &str, now: DateTime<Utc>) -> crate::Result<Observation> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MetbriefError::decode("empty METAR text"));
    }
    let parts: Vec<&str> = raw.split_whitespace().collect();
    let mut i = 0;

    if matches!(parts.first(), Some(&"METAR" | &"SPECI")) {
        i += 1;
    }
    if parts.get(i).is_some_and(|t| is_station_code(t)) {
        if !parts[i].eq_ignore_ascii_case(icao) {
            debug!(reported = parts[i], expected = icao, "station code mismatch");
        }
        i += 1;
    }

    let time = parts
        .get(i)
        .and_then(|t| report_time(t, now))
        .ok_or_else(|| MetbriefError::decode("no DDHHMMZ report time"))?;
    i += 1;

    while matches!(parts.get(i), Some(&"AUTO" | &"COR" | &"NIL")) {
        i += 1;
    }

    let mut wind: Option<tokens::WindGroup> = None;
    let mut visibility_m: Option<u32> = None;
    let mut temperature_c: Option<f32> = None;
    let mut dewpoint_c: Option<f32> = None;
    let mut layers: Vec<CloudLayer> = Vec::new();
    let mut phenomena: Vec<String> = Vec::new();
    let mut sources = PressureSources::default();
    let mut cavok = false;

    for token in &parts[i..] {
        let token = *token;
        if token == "RMK" {
            break;
        }
        if token == "CAVOK" {
            cavok = true;
            continue;
        }
        if wind.is_none()
            && let Some(group) = tokens::wind(token)
        {
            wind = Some(group);
            continue;
        }
        if is_variable_wind_range(token) {
            continue;
        }
        if visibility_m.is_none()
            && token.len() == 4
            && token.bytes().all(|b| b.is_ascii_digit())
        {
            visibility_m = token.parse().ok();
            continue;
        }
        if temperature_c.is_none()
            && let Some((temp, dew)) = temperature_group(token)
        {
            temperature_c = Some(temp);
            dewpoint_c = dew;
            continue;
        }
        if sources.station_hpa.is_none()
            && let Some(hpa) = four_digit_suffix(token, 'Q')
        {
            sources.station_hpa = Some(hpa as i32);
            continue;
        }
        if sources.altimeter_inhg.is_none()
            && let Some(hundredths) = four_digit_suffix(token, 'A')
        {
            sources.altimeter_inhg = Some(f64::from(hundredths) / 100.0);
            continue;
        }
        if crate::codes::weather_phrase(token).is_some() {
            phenomena.push(token.to_string());
            continue;
        }
        if let Some(layer) = tokens::cloud(token) {
            layers.push(layer);
            continue;
        }
        // unparseable sub-token, skipped
    }

    if cavok && visibility_m.is_none() {
        visibility_m = Some(10_000);
    }

    let sky = if layers.is_empty() {
        None
    } else {
        Some(
            layers
                .iter()
                .map(CloudLayer::sky_entry)
                .collect::<Vec<_>>()
                .join(", "),
        )
    };

    let observation = Observation {
        icao: icao.to_uppercase(),
        time,
        pressure_hpa: resolve_pressure(&sources, raw),
        temperature_c,
        dewpoint_c,
        wind_direction: wind.map(|w| w.direction),
        wind_speed_kmh: wind.map(|w| w.speed_kmh),
        wind_gust_kmh: wind.and_then(|w| w.gust_kmh),
        visibility_m,
        sky,
        phenomena,
        raw: raw.to_string(),
    };
    debug!(?observation, "decoded METAR");
    Ok(observation)
}

/// Resolve pressure through the ordered extractor cascade, first success
/// wins: station pressure group, altimeter group, bare `Q####` token
/// anywhere in the raw text, bare `A####` token anywhere.
fn resolve_pressure(sources: &PressureSources, raw: &str) -> Option<i32> {
    let tiers: [fn(&PressureSources, &str) -> Option<i32>; 4] = [
        |sources, _| sources.station_hpa,
        |sources, _| sources.altimeter_inhg.map(inhg_to_hpa),
        |_, raw| scan_four_digit_token(raw, 'Q').map(|v| v as i32),
        |_, raw| scan_four_digit_token(raw, 'A').map(|v| inhg_to_hpa(f64::from(v) / 100.0)),
    ];
    tiers.iter().find_map(|tier| tier(sources, raw))
}

fn inhg_to_hpa(inhg: f64) -> i32 {
    (inhg * INHG_TO_HPA).round() as i32
}

fn scan_four_digit_token(raw: &str, prefix: char) -> Option<u32> {
    raw.split_whitespace()
        .find_map(|token| four_digit_suffix(token, prefix))
}

fn four_digit_suffix(token: &str, prefix: char) -> Option<u32> {
    let digits = token.strip_prefix(prefix)?;
    if digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

fn is_station_code(token: &str) -> bool {
    token.len() == 4
        && token.bytes().all(|b| b.is_ascii_alphanumeric())
        && token.as_bytes()[0].is_ascii_alphabetic()
}

/// `DDHHMMZ` report time, month and year inferred from `now`
fn report_time(token: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let digits = token.strip_suffix('Z')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = digits[..2].parse().ok()?;
    let hour: u32 = digits[2..4].parse().ok()?;
    let minute: u32 = digits[4..].parse().ok()?;
    day_time_to_instant(day, hour, minute, now)
}

/// `200V250` variable wind direction range, recognized but not stored
fn is_variable_wind_range(token: &str) -> bool {
    token.len() == 7
        && token.as_bytes()[3] == b'V'
        && token[..3].bytes().all(|b| b.is_ascii_digit())
        && token[4..].bytes().all(|b| b.is_ascii_digit())
}

/// `TT/DD` temperature/dewpoint group, `M` prefix for minus
fn temperature_group(token: &str) -> Option<(f32, Option<f32>)> {
    let (temp_part, dew_part) = token.split_once('/')?;
    let temp = signed_temperature(temp_part)?;
    let dew = if dew_part.is_empty() {
        None
    } else {
        Some(signed_temperature(dew_part)?)
    };
    Some((temp, dew))
}

fn signed_temperature(part: &str) -> Option<f32> {
    let (negative, digits) = match part.strip_prefix('M') {
        Some(rest) => (true, rest),
        None => (false, part),
    };
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: f32 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 30, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_full_observation() {
        let raw = "METAR EPLB 301730Z 28015G25KT 9999 -SHRA FEW020CB 15/12 Q1013";
        let obs = decode(raw, "EPLB", now()).unwrap();
        assert_eq!(obs.icao, "EPLB");
        assert_eq!(
            obs.time,
            Utc.with_ymd_and_hms(2024, 1, 30, 17, 30, 0).unwrap()
        );
        assert_eq!(obs.wind_direction, Some(WindDirection::Degrees(280)));
        assert_eq!(obs.wind_speed_kmh, Some(28));
        assert_eq!(obs.wind_gust_kmh, Some(46));
        assert_eq!(obs.visibility_m, Some(9999));
        assert_eq!(obs.temperature_c, Some(15.0));
        assert_eq!(obs.dewpoint_c, Some(12.0));
        assert_eq!(obs.pressure_hpa, Some(1013));
        assert_eq!(obs.phenomena, vec!["-SHRA".to_string()]);
        assert_eq!(
            obs.sky.as_deref(),
            Some("небольшая облачность 610 м (кучево-дождевые облака)")
        );
    }

    #[test]
    fn test_pressure_tier_station_value() {
        let obs = decode("EPLB 301730Z 28010KT Q1013", "EPLB", now()).unwrap();
        assert_eq!(obs.pressure_hpa, Some(1013));
    }

    #[test]
    fn test_pressure_tier_altimeter_conversion() {
        // round(29.92 * 33.8639) = 1013
        let obs = decode("KLAX 301730Z 28010KT A2992", "KLAX", now()).unwrap();
        assert_eq!(obs.pressure_hpa, Some(1013));
    }

    #[test]
    fn test_pressure_station_value_beats_altimeter() {
        let obs = decode("EPLB 301730Z Q1020 A2992", "EPLB", now()).unwrap();
        assert_eq!(obs.pressure_hpa, Some(1020));
    }

    #[test]
    fn test_pressure_tier_raw_scan_behind_remarks() {
        // Q group inside RMK is outside the token walk, the raw-text tier
        // still recovers it.
        let obs = decode("EPLB 301730Z 28010KT RMK Q1008", "EPLB", now()).unwrap();
        assert_eq!(obs.pressure_hpa, Some(1008));
        let obs = decode("KLAX 301730Z 28010KT RMK A3001", "KLAX", now()).unwrap();
        assert_eq!(obs.pressure_hpa, Some(1016));
    }

    #[test]
    fn test_pressure_absent() {
        let obs = decode("EPLB 301730Z 28010KT CAVOK", "EPLB", now()).unwrap();
        assert_eq!(obs.pressure_hpa, None);
    }

    #[test]
    fn test_negative_temperatures() {
        let obs = decode("EPLB 301730Z 00000KT M01/M03 Q1030", "EPLB", now()).unwrap();
        assert_eq!(obs.temperature_c, Some(-1.0));
        assert_eq!(obs.dewpoint_c, Some(-3.0));
    }

    #[test]
    fn test_multiple_layers_joined() {
        let obs = decode("EPLB 301730Z 28010KT SCT015 BKN030TCU 10/08 Q1010", "EPLB", now()).unwrap();
        assert_eq!(
            obs.sky.as_deref(),
            Some("рассеянная облачность 457 м, облачно 914 м (башенные кучевые облака)")
        );
    }

    #[test]
    fn test_cavok_implies_visibility() {
        let obs = decode("EPLB 301730Z VRB02KT CAVOK 18/12 Q1018", "EPLB", now()).unwrap();
        assert_eq!(obs.visibility_m, Some(10_000));
        assert_eq!(obs.sky, None);
        assert_eq!(obs.wind_direction, Some(WindDirection::Variable));
    }

    #[test]
    fn test_malformed_tokens_are_skipped() {
        let obs = decode("EPLB 301730Z ?!? 28010KT FOO99 15/12 Q1013", "EPLB", now()).unwrap();
        assert_eq!(obs.wind_speed_kmh, Some(19));
        assert_eq!(obs.pressure_hpa, Some(1013));
        assert!(obs.phenomena.is_empty());
    }

    #[test]
    fn test_empty_and_timeless_input_fail() {
        assert!(decode("", "EPLB", now()).is_err());
        assert!(decode("   ", "EPLB", now()).is_err());
        assert!(decode("EPLB 28010KT Q1013", "EPLB", now()).is_err());
    }
}
