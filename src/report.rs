//! Briefing text composition
//!
//! Builds the localized weather briefing from a decoded [`Observation`]
//! and a composed TAF summary, and derives alert badges from an ordered
//! rule table.

use crate::metar::Observation;
use crate::tokens::WindDirection;
use chrono_tz::Tz;

/// One alert rule: predicate over the observation plus the badge it raises
pub struct AlertRule {
    pub check: fn(&Observation) -> bool,
    pub badge: &'static str,
}

/// 30 kt converted to km/h, threshold for the strong-wind badge
const STRONG_WIND_KMH: u32 = 56;

/// Alert rules, evaluated in order; every matching badge is reported.
pub const ALERT_RULES: &[AlertRule] = &[
    AlertRule {
        check: |obs| obs.temperature_c.unwrap_or(0.0) > 30.0,
        badge: "🔥 Сильная жара",
    },
    AlertRule {
        check: |obs| obs.phenomena.iter().any(|code| code.contains("RA")),
        badge: "☔ Дождь",
    },
    AlertRule {
        check: |obs| obs.phenomena.iter().any(|code| code.contains("TS")),
        badge: "⛈️ Гроза",
    },
    AlertRule {
        check: |obs| obs.phenomena.iter().any(|code| code == "GR" || code == "GS"),
        badge: "🌨️ Град",
    },
    AlertRule {
        check: |obs| {
            obs.wind_gust_kmh.unwrap_or(0) >= STRONG_WIND_KMH
                || obs.wind_speed_kmh.unwrap_or(0) >= STRONG_WIND_KMH
        },
        badge: "💨 Сильный ветер",
    },
    AlertRule {
        check: |obs| {
            obs.phenomena.iter().any(|code| code == "FG")
                || obs.visibility_m.unwrap_or(9999) < 1000
        },
        badge: "🌫️ Туман",
    },
];

/// Collect the badges of all matching alert rules.
#[must_use]
pub fn build_alerts(observation: &Observation) -> String {
    ALERT_RULES
        .iter()
        .filter(|rule| (rule.check)(observation))
        .map(|rule| rule.badge)
        .collect::<Vec<_>>()
        .join(" • ")
}

/// Compose the full briefing text for one station.
#[must_use]
pub fn generate_report(observation: &Observation, tz: Tz, taf_summary: &str) -> String {
    let time_local = observation.time.with_timezone(&tz).format("%H:%M");

    let temperature = format_degrees(observation.temperature_c);
    let dewpoint = format_degrees(observation.dewpoint_c);

    let wind = match (observation.wind_direction, observation.wind_speed_kmh) {
        (Some(WindDirection::Degrees(deg)), Some(speed)) => {
            format!("ветер {deg:03}° {speed} км/ч{}", gust_suffix(observation))
        }
        (Some(WindDirection::Variable), Some(speed)) => {
            format!("переменный ветер {speed} км/ч{}", gust_suffix(observation))
        }
        _ => "ветер штиль".to_string(),
    };

    let sky = observation.sky.as_deref().unwrap_or("CAVOK");
    let pressure = observation
        .pressure_hpa
        .map_or_else(|| "N/A".to_string(), |hpa| hpa.to_string());

    let mut report = format!(
        "✈️ {icao} — сводка погоды\n\
         🕒 {time_local} ({tz})\n\
         🌡 Температура: {temperature} °C (точка росы {dewpoint} °C)\n\
         💨 {wind}\n\
         ☁️ {sky}\n\
         🔽 Давление: {pressure} гПа",
        icao = observation.icao,
    );

    let alerts = build_alerts(observation);
    if !alerts.is_empty() {
        report.push_str(&format!("\n⚠️ {alerts}"));
    }
    report.push_str(&format!("\n\n📅 TAF:\n{taf_summary}"));
    report
}

fn format_degrees(value: Option<f32>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:+.0}"))
}

fn gust_suffix(observation: &Observation) -> String {
    observation
        .wind_gust_kmh
        .map_or_else(String::new, |gust| format!(", порывы {gust} км/ч"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn observation() -> Observation {
        Observation {
            icao: "EPLB".to_string(),
            time: Utc.with_ymd_and_hms(2024, 1, 30, 17, 30, 0).unwrap(),
            pressure_hpa: Some(1013),
            temperature_c: Some(15.0),
            dewpoint_c: Some(12.0),
            wind_direction: Some(WindDirection::Degrees(280)),
            wind_speed_kmh: Some(28),
            wind_gust_kmh: Some(46),
            visibility_m: Some(9999),
            sky: Some("небольшая облачность 610 м".to_string()),
            phenomena: vec!["-SHRA".to_string()],
            raw: "EPLB 301730Z ...".to_string(),
        }
    }

    #[test]
    fn test_alert_rules() {
        let mut obs = observation();
        assert_eq!(build_alerts(&obs), "☔ Дождь");

        obs.phenomena = vec!["TSRA".to_string()];
        obs.wind_gust_kmh = Some(60);
        assert_eq!(build_alerts(&obs), "☔ Дождь • ⛈️ Гроза • 💨 Сильный ветер");

        obs.phenomena.clear();
        obs.wind_gust_kmh = None;
        obs.visibility_m = Some(800);
        assert_eq!(build_alerts(&obs), "🌫️ Туман");
    }

    #[test]
    fn test_rain_alert_matches_compound_codes() {
        // phenomena carry full compound codes, so rain-bearing compounds
        // raise the rain badge alongside their own badges
        let mut obs = observation();
        obs.wind_gust_kmh = None;

        obs.phenomena = vec!["TSRA".to_string()];
        assert_eq!(build_alerts(&obs), "☔ Дождь • ⛈️ Гроза");

        obs.phenomena = vec!["FZRA".to_string()];
        assert_eq!(build_alerts(&obs), "☔ Дождь");

        obs.phenomena = vec!["-SHRA".to_string()];
        assert_eq!(build_alerts(&obs), "☔ Дождь");
    }

    #[test]
    fn test_report_layout() {
        let report = generate_report(&observation(), chrono_tz::Tz::UTC, "Основной прогноз: CAVOK.");
        assert!(report.contains("✈️ EPLB"));
        assert!(report.contains("🕒 17:30 (UTC)"));
        assert!(report.contains("+15 °C"));
        assert!(report.contains("ветер 280° 28 км/ч, порывы 46 км/ч"));
        assert!(report.contains("Давление: 1013 гПа"));
        assert!(report.contains("⚠️ ☔ Дождь"));
        assert!(report.ends_with("📅 TAF:\nОсновной прогноз: CAVOK."));
    }

    #[test]
    fn test_report_fallbacks() {
        let obs = Observation {
            pressure_hpa: None,
            temperature_c: None,
            dewpoint_c: None,
            wind_direction: None,
            wind_speed_kmh: None,
            wind_gust_kmh: None,
            sky: None,
            phenomena: Vec::new(),
            ..observation()
        };
        let report = generate_report(&obs, chrono_tz::Tz::UTC, "raw");
        assert!(report.contains("N/A °C"));
        assert!(report.contains("ветер штиль"));
        assert!(report.contains("☁️ CAVOK"));
        assert!(report.contains("Давление: N/A гПа"));
        assert!(!report.contains("⚠️"));
    }
}
