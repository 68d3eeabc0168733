//! `metbrief` - METAR/TAF decoding and localized aviation weather briefings
//!
//! This library decodes raw ICAO weather reports (METAR observations and
//! TAF forecast bulletins) into structured data and human-readable,
//! localized summaries.

pub mod codes;
pub mod error;
pub mod fetch;
pub mod metar;
pub mod report;
pub mod taf;
pub mod tokens;

// Re-export core types for public API
pub use error::MetbriefError;
pub use fetch::ReportFetcher;
pub use metar::Observation;
pub use taf::{ForecastGroup, GroupKind, extract_issue_time, parse_groups, resolve_range, summarize};
pub use tokens::{CloudLayer, DayHour, Token, WindDirection, WindGroup};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, MetbriefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
