pub mod graph;

pub use graph::{nullable, GraphClient};

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamps are stored as fixed-width RFC 3339 strings so that string
/// ordering in Cypher matches chronological ordering.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now() -> String {
    timestamp(Utc::now())
}
