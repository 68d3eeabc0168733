//! Two-tier retrieval of raw METAR/TAF text
//!
//! Tries the AviationWeather data API first and falls back to the classic
//! NOAA per-station text files. A thin I/O wrapper, no decoding logic.

use crate::error::MetbriefError;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const API_URL: &str = "https://aviationweather.gov/api/data/metar";
const NOAA_METAR_URL: &str = "https://tgftp.nws.noaa.gov/data/observations/metar/stations";
const NOAA_TAF_URL: &str = "https://tgftp.nws.noaa.gov/data/forecasts/taf/stations";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One station entry of the AviationWeather JSON response
#[derive(Debug, Deserialize)]
struct ApiReport {
    #[serde(rename = "rawOb")]
    raw_ob: String,
    #[serde(rename = "rawTaf")]
    raw_taf: Option<String>,
}

/// HTTP client for report retrieval
pub struct ReportFetcher {
    client: Client,
}

impl ReportFetcher {
    pub fn new() -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| MetbriefError::fetch(err.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch the latest raw METAR line and TAF bulletin for a station.
    pub fn fetch(&self, icao: &str) -> crate::Result<(String, String)> {
        match self.fetch_from_api(icao) {
            Ok(reports) => Ok(reports),
            Err(err) => {
                debug!(%err, "AviationWeather API unavailable, falling back to NOAA");
                self.fetch_from_noaa(icao)
            }
        }
    }

    fn fetch_from_api(&self, icao: &str) -> crate::Result<(String, String)> {
        let icao = icao.to_uppercase();
        info!(station = %icao, "requesting METAR/TAF from AviationWeather");
        let text = self
            .client
            .get(API_URL)
            .query(&[("ids", icao.as_str()), ("taf", "true"), ("format", "json")])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|response| response.text())
            .map_err(|err| MetbriefError::fetch(err.to_string()))?;
        let reports: Vec<ApiReport> = serde_json::from_str(&text)
            .map_err(|err| MetbriefError::fetch(format!("unexpected API response: {err}")))?;
        pick_station_report(reports, &icao)
            .ok_or_else(|| MetbriefError::fetch("API returned no usable METAR/TAF pair"))
    }

    fn fetch_from_noaa(&self, icao: &str) -> crate::Result<(String, String)> {
        let icao = icao.to_uppercase();
        info!(station = %icao, "requesting METAR/TAF from NOAA text files");
        let metar_url = format!("{NOAA_METAR_URL}/{icao}.TXT");
        let taf_url = format!("{NOAA_TAF_URL}/{icao}.TXT");
        let metar_raw = last_nonempty_line(&self.get_text(&metar_url)?);
        let taf_raw = skip_header_lines(&self.get_text(&taf_url)?);
        if metar_raw.split_whitespace().count() < 2 {
            return Err(MetbriefError::fetch("NOAA source did not return a valid METAR"));
        }
        if taf_raw.split_whitespace().count() < 2 {
            return Err(MetbriefError::fetch("NOAA source did not return a valid TAF"));
        }
        Ok((metar_raw, taf_raw))
    }

    fn get_text(&self, url: &str) -> crate::Result<String> {
        self.client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(|response| response.text())
            .map_err(|err| MetbriefError::fetch(err.to_string()))
    }
}

/// Pick the entry for the requested station and split it into a
/// (METAR, TAF) pair, the TAF with its `TAF <icao>` prefix stripped.
fn pick_station_report(reports: Vec<ApiReport>, icao: &str) -> Option<(String, String)> {
    let report = reports.into_iter().find(|report| {
        report
            .raw_ob
            .split_whitespace()
            .next()
            .is_some_and(|token| token.eq_ignore_ascii_case(icao))
    })?;
    let taf_raw = strip_taf_prefix(report.raw_taf.as_deref()?, icao);
    if taf_raw.split_whitespace().count() < 2 {
        return None;
    }
    Some((report.raw_ob.trim().to_string(), taf_raw))
}

/// Drop the leading `TAF` keyword, amendment markers, and station token
/// from a bulletin's first line; the issue token onward is kept.
fn strip_taf_prefix(raw: &str, icao: &str) -> String {
    let mut lines = raw.trim().lines();
    let Some(first) = lines.next() else {
        return String::new();
    };
    let body: Vec<&str> = first
        .split_whitespace()
        .skip_while(|token| {
            *token == "TAF" || *token == "AMD" || *token == "COR" || token.eq_ignore_ascii_case(icao)
        })
        .collect();
    let mut out = vec![body.join(" ")];
    out.extend(lines.map(|line| line.trim().to_string()));
    out.join("\n").trim().to_string()
}

/// NOAA text files carry a date header line before the report body.
fn skip_header_lines(text: &str) -> String {
    text.trim()
        .lines()
        .skip(1)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn last_nonempty_line(text: &str) -> String {
    text.trim()
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_json_response_is_decoded() {
        let text = r#"[{
            "rawOb": "EPLB 032100Z 33011KT 9999 SCT030 12/08 Q1015",
            "rawTaf": "TAF EPLB 031730Z 0318/0418 30010KT CAVOK\nBECMG 0320/0322 27015KT"
        }]"#;
        let reports: Vec<ApiReport> = serde_json::from_str(text).unwrap();
        let (metar, taf) = pick_station_report(reports, "EPLB").unwrap();
        assert!(metar.starts_with("EPLB 032100Z"));
        assert!(taf.starts_with("031730Z"));
        assert!(taf.ends_with("27015KT"));
    }

    #[test]
    fn test_station_without_taf_is_rejected() {
        let text = r#"[{"rawOb": "EPLB 032100Z 33011KT CAVOK", "rawTaf": null}]"#;
        let reports: Vec<ApiReport> = serde_json::from_str(text).unwrap();
        assert!(pick_station_report(reports, "EPLB").is_none());
    }

    #[test]
    fn test_foreign_station_is_rejected() {
        let text = r#"[{
            "rawOb": "EPWA 032100Z 33011KT CAVOK",
            "rawTaf": "TAF EPWA 031730Z 0318/0418 CAVOK"
        }]"#;
        let reports: Vec<ApiReport> = serde_json::from_str(text).unwrap();
        assert!(pick_station_report(reports, "EPLB").is_none());
    }

    #[test]
    fn test_strip_taf_prefix() {
        assert_eq!(
            strip_taf_prefix("TAF EPLB 031730Z 0318/0418 CAVOK", "EPLB"),
            "031730Z 0318/0418 CAVOK"
        );
        assert_eq!(
            strip_taf_prefix("TAF AMD EPLB 031730Z CAVOK", "EPLB"),
            "031730Z CAVOK"
        );
        // already-bare bulletins pass through unchanged
        assert_eq!(strip_taf_prefix("031730Z CAVOK", "EPLB"), "031730Z CAVOK");
    }

    #[test]
    fn test_noaa_text_helpers() {
        let metar_file = "2024/01/30 21:00\nEPLB 302100Z 28010KT 9999 SCT030 05/02 Q1020\n";
        assert!(last_nonempty_line(metar_file).starts_with("EPLB 302100Z"));

        let taf_file = "2024/01/30 17:30\n301730Z 3018/3118 28015KT\nTEMPO 3020/3024 -RA";
        let body = skip_header_lines(taf_file);
        assert!(body.starts_with("301730Z"));
        assert!(body.contains("TEMPO"));
    }
}
