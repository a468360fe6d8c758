use chrono::NaiveDate;
use gigcrawl_core::{Accumulator, EventCandidate, ResultSet};
use pretty_assertions::assert_eq;

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

fn event(artist: &str, day: &str, venue: &str) -> EventCandidate {
    EventCandidate::new(artist, date(day)).with_venue(venue)
}

#[test]
fn duplicate_across_sources_keeps_first_and_sorts_by_date() {
    let mut acc = Accumulator::new();
    acc.commit(vec![event("A", "2024-06-15", "X")]);
    acc.commit(vec![
        event("A", "2024-06-15", "Y"),
        event("B", "2024-06-10", "Z"),
    ]);

    let result = acc.into_result_set();
    let summary: Vec<_> = result
        .records()
        .iter()
        .map(|r| (r.id, r.event.artist.as_str(), r.event.date, r.event.venue.as_str()))
        .collect();

    assert_eq!(
        summary,
        vec![
            (1, "B", date("2024-06-10"), "Z"),
            (2, "A", date("2024-06-15"), "X"),
        ]
    );
}

#[test]
fn same_artist_on_different_dates_is_kept() {
    let result = ResultSet::from_candidates(vec![
        event("A", "2024-06-16", "X"),
        event("A", "2024-06-15", "X"),
    ]);
    assert_eq!(result.len(), 2);
    assert_eq!(result.records()[0].event.date, date("2024-06-15"));
}

#[test]
fn artist_comparison_is_exact() {
    let result = ResultSet::from_candidates(vec![
        event("Dj A", "2024-06-15", "X"),
        event("DJ A", "2024-06-15", "X"),
    ]);
    assert_eq!(result.len(), 2);
}

#[test]
fn ties_on_date_keep_arrival_order() {
    let result = ResultSet::from_candidates(vec![
        event("C", "2024-07-01", "1"),
        event("A", "2024-06-01", "2"),
        event("B", "2024-07-01", "3"),
        event("D", "2024-07-01", "4"),
    ]);
    let artists: Vec<_> = result.records().iter().map(|r| r.event.artist.as_str()).collect();
    assert_eq!(artists, vec!["A", "C", "B", "D"]);
}

#[test]
fn ids_are_dense_and_follow_date_order() {
    let days = [
        "2024-09-01",
        "2024-06-01",
        "2024-08-15",
        "2024-06-01",
        "2024-01-31",
        "2025-01-01",
    ];
    let candidates = days
        .iter()
        .enumerate()
        .map(|(i, d)| event(&format!("artist {i}"), d, "V"))
        .collect();
    let result = ResultSet::from_candidates(candidates);

    let ids: Vec<u32> = result.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=days.len() as u32).collect::<Vec<_>>());
    for pair in result.records().windows(2) {
        assert!(pair[0].event.date <= pair[1].event.date);
    }
}

#[test]
fn every_dedup_key_appears_once() {
    let mut acc = Accumulator::new();
    for round in 0..3 {
        acc.commit(vec![
            event("A", "2024-06-15", &format!("round {round}")),
            event("B", "2024-06-15", &format!("round {round}")),
        ]);
    }
    assert_eq!(acc.len(), 6);

    let result = acc.into_result_set();
    assert_eq!(result.len(), 2);
    assert!(result.records().iter().all(|r| r.event.venue == "round 0"));
}

#[test]
fn empty_input_yields_empty_result() {
    let result = Accumulator::new().into_result_set();
    assert!(result.is_empty());
    assert_eq!(serde_json::to_string(&result).unwrap(), "[]");
}

#[test]
fn result_set_serializes_as_plain_list() {
    let result = ResultSet::from_candidates(vec![event("A", "2024-06-15", "X")]);
    let json = serde_json::to_value(&result).unwrap();
    assert!(json.is_array());
    assert_eq!(json[0]["id"], 1);
    assert_eq!(json[0]["venue"], "X");
}
