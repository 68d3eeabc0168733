//! TAF bulletin decoding: issue-time extraction, time-range resolution,
//! group parsing, and localized summary composition.

pub mod issue;
pub mod parser;
pub mod range;

pub use issue::extract_issue_time;
pub use parser::{ForecastGroup, GroupKind, parse_groups, summarize};
pub use range::resolve_range;
