use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{EventCandidate, EventRecord};

/// Append-only collection of candidates in arrival order (source order, then
/// extraction order within a source).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    candidates: Vec<EventCandidate>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a complete per-source batch.
    pub fn commit(&mut self, batch: Vec<EventCandidate>) {
        self.candidates.extend(batch);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[EventCandidate] {
        &self.candidates
    }

    pub fn into_result_set(self) -> ResultSet {
        ResultSet::from_candidates(self.candidates)
    }
}

/// Final output of a run: unique events ordered by date with dense ids from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<EventRecord>,
}

impl ResultSet {
    /// Dedup by (artist, date) keeping the first occurrence, stable-sort by
    /// date, then number from 1 in sorted order.
    pub fn from_candidates(candidates: Vec<EventCandidate>) -> Self {
        let mut unique = dedup_first_wins(candidates);
        unique.sort_by_key(|event| event.date);

        let records = unique
            .into_iter()
            .zip(1u32..)
            .map(|(event, id)| EventRecord { id, event })
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn dedup_first_wins(candidates: Vec<EventCandidate>) -> Vec<EventCandidate> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.dedup_key()))
        .collect()
}
