//! Shared token classification for METAR and TAF decoding
//!
//! A small ordered set of tagged pattern matchers, composed first-match-wins:
//! wind group, `DDHH/DDHH` time range, significant weather, cloud layer,
//! `CAVOK`. Tokens that match no pattern classify to `None` and are dropped
//! from phrase output by the callers.

use crate::codes::{self, Cover};
use serde::{Deserialize, Serialize};

/// Knots to km/h conversion factor
pub const KNOTS_TO_KMH: f64 = 1.852;

/// Hundreds of feet to meters conversion factor
pub const HUNDREDS_FEET_TO_M: f64 = 30.48;

/// Reported wind direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindDirection {
    /// Bearing in degrees from north
    Degrees(u16),
    /// `VRB` variable-direction sentinel
    Variable,
}

/// Decoded wind group, speeds already converted to km/h
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindGroup {
    pub direction: WindDirection,
    pub speed_kmh: u32,
    pub gust_kmh: Option<u32>,
}

impl WindGroup {
    /// Localized wind phrase. The bearing is kept verbatim as three digits,
    /// not converted to compass points.
    #[must_use]
    pub fn phrase(&self) -> String {
        let gust_part = match self.gust_kmh {
            Some(gust) => format!(", порывы {gust} км/ч"),
            None => String::new(),
        };
        match self.direction {
            WindDirection::Variable => {
                format!("переменный ветер {} км/ч{gust_part}", self.speed_kmh)
            }
            WindDirection::Degrees(deg) => {
                format!("ветер {deg:03}° {} км/ч{gust_part}", self.speed_kmh)
            }
        }
    }
}

/// One side of a `DDHH/DDHH` time-range token, unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHour {
    /// Day of month, 1-31
    pub day: u32,
    /// Hour of day, 0-24; `24` denotes midnight of the following day
    pub hour: u32,
}

/// Cloud layer type marker appended to a cover token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerType {
    Cumulonimbus,
    ToweringCumulus,
}

impl LayerType {
    #[must_use]
    pub fn annotation(&self) -> &'static str {
        match self {
            LayerType::Cumulonimbus => codes::CUMULONIMBUS,
            LayerType::ToweringCumulus => codes::TOWERING_CUMULUS,
        }
    }
}

/// Decoded cloud layer, height already converted to meters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudLayer {
    pub cover: &'static Cover,
    pub height_m: Option<u32>,
    pub layer_type: Option<LayerType>,
}

impl CloudLayer {
    /// Cover phrase with the display symbol, for forecast summaries
    #[must_use]
    pub fn phrase(&self) -> String {
        self.render(true)
    }

    /// Cover phrase without the display symbol, for observation sky strings
    #[must_use]
    pub fn sky_entry(&self) -> String {
        self.render(false)
    }

    fn render(&self, with_symbol: bool) -> String {
        let mut out = String::from(self.cover.phrase);
        if with_symbol {
            out.push(' ');
            out.push_str(self.cover.symbol);
        }
        if let Some(height) = self.height_m {
            out.push_str(&format!(" {height} м"));
        }
        if let Some(layer_type) = self.layer_type {
            out.push_str(&format!(" ({})", layer_type.annotation()));
        }
        out
    }
}

/// A classified report token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Wind(WindGroup),
    TimeRange(DayHour, DayHour),
    /// Weather-phenomenon code with its localized phrase
    Weather(&'static str),
    Cloud(CloudLayer),
    Cavok,
}

/// Classify one whitespace-delimited token, first matching pattern wins.
#[must_use]
pub fn classify(token: &str) -> Option<Token> {
    if let Some(wind) = wind(token) {
        return Some(Token::Wind(wind));
    }
    if let Some((start, end)) = time_range(token) {
        return Some(Token::TimeRange(start, end));
    }
    if let Some(phrase) = codes::weather_phrase(token) {
        return Some(Token::Weather(phrase));
    }
    if let Some(layer) = cloud(token) {
        return Some(Token::Cloud(layer));
    }
    if token == "CAVOK" {
        return Some(Token::Cavok);
    }
    None
}

/// Match a wind group `dddff(Gff)KT` or `VRBff(Gff)KT`, converting knots
/// to km/h.
#[must_use]
pub fn wind(token: &str) -> Option<WindGroup> {
    if !token.is_ascii() {
        return None;
    }
    let body = token.strip_suffix("KT")?;
    if body.len() < 5 {
        return None;
    }
    let (dir_part, rest) = body.split_at(3);
    let direction = if dir_part == "VRB" {
        WindDirection::Variable
    } else {
        WindDirection::Degrees(dir_part.parse::<u16>().ok()?)
    };
    let (speed_part, gust_part) = rest.split_at(2);
    let speed_kt: u32 = speed_part.parse().ok()?;
    let gust_kt: Option<u32> = match gust_part.strip_prefix('G') {
        Some(digits) if digits.len() == 2 => Some(digits.parse().ok()?),
        Some(_) => return None,
        None if gust_part.is_empty() => None,
        None => return None,
    };
    Some(WindGroup {
        direction,
        speed_kmh: knots_to_kmh(speed_kt),
        gust_kmh: gust_kt.map(knots_to_kmh),
    })
}

/// Match a `DDHH/DDHH` forecast time-range token.
#[must_use]
pub fn time_range(token: &str) -> Option<(DayHour, DayHour)> {
    let (start, end) = token.split_once('/')?;
    Some((day_hour(start)?, day_hour(end)?))
}

fn day_hour(part: &str) -> Option<DayHour> {
    if part.len() != 4 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = part[..2].parse().ok()?;
    let hour: u32 = part[2..].parse().ok()?;
    if (1..=31).contains(&day) && hour <= 24 {
        Some(DayHour { day, hour })
    } else {
        None
    }
}

/// Match a cloud-layer token: optional trailing `CB`/`TCU` marker stripped,
/// cover code prefix-matched, numeric suffix read as hundreds of feet.
#[must_use]
pub fn cloud(token: &str) -> Option<CloudLayer> {
    let (body, layer_type) = if let Some(stripped) = token.strip_suffix("TCU") {
        (stripped, Some(LayerType::ToweringCumulus))
    } else if let Some(stripped) = token.strip_suffix("CB") {
        (stripped, Some(LayerType::Cumulonimbus))
    } else {
        (token, None)
    };
    let cover = codes::cover_prefix(body)?;
    let suffix = &body[cover.code.len()..];
    let height_m = if suffix.is_empty() {
        None
    } else if suffix.bytes().all(|b| b.is_ascii_digit()) {
        let hundreds_ft: u32 = suffix.parse().ok()?;
        Some((f64::from(hundreds_ft) * HUNDREDS_FEET_TO_M).round() as u32)
    } else {
        return None;
    };
    Some(CloudLayer {
        cover,
        height_m,
        layer_type,
    })
}

fn knots_to_kmh(knots: u32) -> u32 {
    (f64::from(knots) * KNOTS_TO_KMH).round() as u32
}
