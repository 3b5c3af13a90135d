use chrono::{DateTime, Utc};
use koinonia_types::api::PersonRef;
use tracing::warn;
use uuid::Uuid;

/// Row-to-response parsing helpers. All ids and timestamps in the store were
/// written by this application, so a parse failure means a corrupt row: it is
/// logged and replaced with a default rather than failing the whole page.

pub fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", what, raw, e);
        Uuid::default()
    })
}

pub fn parse_timestamp(raw: &str, what: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores datetime('now') as "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {}: {}", raw, what, e);
            DateTime::default()
        })
}

pub fn person(id: &str, first_name: &str, last_name: &str, avatar_url: Option<String>) -> PersonRef {
    PersonRef {
        id: parse_id(id, "user"),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        avatar_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_default_timestamps() {
        let ts = parse_timestamp("2026-08-24 10:30:00", "test row");
        assert_eq!(ts.to_rfc3339(), "2026-08-24T10:30:00+00:00");
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        let ts = parse_timestamp("2026-08-24T10:30:00+00:00", "test row");
        assert_eq!(ts.to_rfc3339(), "2026-08-24T10:30:00+00:00");
    }

    #[test]
    fn corrupt_values_fall_back_to_defaults() {
        assert_eq!(parse_id("not-a-uuid", "user"), Uuid::default());
        assert_eq!(parse_timestamp("garbage", "row"), DateTime::<Utc>::default());
    }
}
