use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One event listing as extracted from a page, before aggregation assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCandidate {
    pub artist: String,
    pub date: NaiveDate,
    pub venue: String,
    pub time: String,
    pub genre: String,
    pub description: String,
    #[serde(default)]
    pub ticket_url: Option<String>,
}

impl EventCandidate {
    /// Convenience constructor for the two fields the dedup key is built from.
    pub fn new(artist: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            artist: artist.into(),
            date,
            venue: String::new(),
            time: String::new(),
            genre: String::new(),
            description: String::new(),
            ticket_url: None,
        }
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = venue.into();
        self
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            artist: self.artist.clone(),
            date: self.date,
        }
    }
}

/// Identity used to collapse duplicate listings across sources.
///
/// Artist text is compared exactly; two different shows by the same artist on
/// the same date collapse into one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub artist: String,
    pub date: NaiveDate,
}

/// A final, numbered event in the result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: u32,
    #[serde(flatten)]
    pub event: EventCandidate,
}

/// Parse the date formats listing pages and the extraction service tend to produce.
///
/// Accepts `YYYY-MM-DD`, an ISO date-time (with or without offset, the local
/// calendar date is kept), and `DD.MM.YYYY`.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%d.%m.%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_formats() {
        assert_eq!(parse_event_date("2024-06-15"), Some(ymd(2024, 6, 15)));
        assert_eq!(parse_event_date(" 2024-06-15 "), Some(ymd(2024, 6, 15)));
        assert_eq!(
            parse_event_date("2024-06-15T23:59:00+02:00"),
            Some(ymd(2024, 6, 15))
        );
        assert_eq!(parse_event_date("2024-06-15T23:59"), Some(ymd(2024, 6, 15)));
        assert_eq!(parse_event_date("2024-06-15 23:59"), Some(ymd(2024, 6, 15)));
        assert_eq!(parse_event_date("15.06.2024"), Some(ymd(2024, 6, 15)));
    }

    #[test]
    fn rejects_unknown_or_invalid_dates() {
        assert_eq!(parse_event_date(""), None);
        assert_eq!(parse_event_date("next friday"), None);
        assert_eq!(parse_event_date("2024-02-30"), None);
    }

    #[test]
    fn record_serializes_flat_camel_case() {
        let record = EventRecord {
            id: 3,
            event: EventCandidate {
                ticket_url: Some("https://tickets.example/a".into()),
                ..EventCandidate::new("A", ymd(2024, 6, 15))
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["artist"], "A");
        assert_eq!(json["date"], "2024-06-15");
        assert_eq!(json["ticketUrl"], "https://tickets.example/a");
    }

    #[test]
    fn missing_ticket_url_serializes_as_null() {
        let record = EventRecord {
            id: 1,
            event: EventCandidate::new("B", ymd(2024, 6, 10)),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["ticketUrl"].is_null());
    }
}
