//! Code dictionaries for ICAO report tokens
//!
//! Immutable mappings from METAR/TAF token codes to localized phrases and
//! display symbols. Lookup only, no behavior.

/// Sky-cover code with its localized phrase and display symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cover {
    pub code: &'static str,
    pub phrase: &'static str,
    pub symbol: &'static str,
}

/// Significant-weather codes. Intensity-prefixed and compound codes are
/// distinct entries, not composed from parts.
const WEATHER_CODES: &[(&str, &str)] = &[
    ("RA", "дождь"),
    ("-RA", "слабый дождь"),
    ("+RA", "сильный дождь"),
    ("DZ", "морось"),
    ("-DZ", "слабая морось"),
    ("SHRA", "кратковременный дождь"),
    ("-SHRA", "кратковременный слабый дождь"),
    ("+SHRA", "кратковременный сильный дождь"),
    ("TSRA", "гроза с дождём"),
    ("-TSRA", "гроза со слабым дождём"),
    ("+TSRA", "гроза с сильным дождём"),
    ("FZRA", "переохлаждённый дождь"),
    ("FZDZ", "переохлаждённая морось"),
    ("TS", "гроза"),
    ("VCTS", "гроза в окрестностях"),
    ("FG", "туман"),
    ("FZFG", "переохлаждённый туман"),
    ("BR", "дымка"),
    ("HZ", "мгла"),
    ("SN", "снег"),
    ("-SN", "слабый снег"),
    ("+SN", "сильный снег"),
    ("SHSN", "кратковременный снегопад"),
    ("RASN", "дождь со снегом"),
    ("GR", "град"),
    ("GS", "снежная крупа"),
    ("SQ", "шквал"),
    ("VCSH", "осадки в окрестностях"),
];

/// Sky-cover codes in match order. `FEW`..`OVC` carry cloud amounts,
/// `CLR`/`SKC` report a clear sky.
const COVER_CODES: &[Cover] = &[
    Cover { code: "FEW", phrase: "небольшая облачность", symbol: "◔" },
    Cover { code: "SCT", phrase: "рассеянная облачность", symbol: "◑" },
    Cover { code: "BKN", phrase: "облачно", symbol: "◕" },
    Cover { code: "OVC", phrase: "сплошная облачность", symbol: "●" },
    Cover { code: "CLR", phrase: "ясно", symbol: "○" },
    Cover { code: "SKC", phrase: "ясно", symbol: "○" },
];

/// Annotation for a cumulonimbus layer type marker
pub const CUMULONIMBUS: &str = "кучево-дождевые облака";

/// Annotation for a towering-cumulus layer type marker
pub const TOWERING_CUMULUS: &str = "башенные кучевые облака";

/// Fixed phrase for a literal `CAVOK` token
pub const CAVOK_PHRASE: &str = "CAVOK (видимость >10 км, нет значимой облачности)";

/// Look up the localized phrase for a significant-weather code.
///
/// Exact match only; unknown codes yield `None` and are excluded from
/// phrase output by the callers.
#[must_use]
pub fn weather_phrase(code: &str) -> Option<&'static str> {
    WEATHER_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, phrase)| *phrase)
}

/// Look up a sky-cover entry by exact code.
#[must_use]
pub fn cover(code: &str) -> Option<&'static Cover> {
    COVER_CODES.iter().find(|c| c.code == code)
}

/// Find the sky-cover entry whose code prefixes `token`, e.g. `FEW020`.
#[must_use]
pub fn cover_prefix(token: &str) -> Option<&'static Cover> {
    COVER_CODES.iter().find(|c| token.starts_with(c.code))
}
