// src/feed/dedup.rs
//! New-record detection.
//!
//! Precondition: feed lines arrive newest first within a cycle. The tracker
//! keeps only the identity of the newest record it has confirmed, and a
//! cycle stops scanning at the first record matching it. If the feed were
//! ever reordered, records older than the reference would be re-accepted.

use chrono::NaiveDateTime;

use crate::feed::types::SeismicRecord;

/// Identity of the newest record confirmed so far; empty at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeenState {
    last: Option<NaiveDateTime>,
}

impl SeenState {
    pub fn last_seen(&self) -> Option<NaiveDateTime> {
        self.last
    }
}

/// Pure form of the check: `(is_new, state to use afterwards)`.
///
/// Accepting a record moves the reference to it, so this is only suitable
/// for scanning one record at a time. Use [`DedupTracker`] for whole cycles.
pub fn is_new(record: &SeismicRecord, state: SeenState) -> (bool, SeenState) {
    if state.last == Some(record.identity()) {
        (false, state)
    } else {
        (
            true,
            SeenState {
                last: Some(record.identity()),
            },
        )
    }
}

#[derive(Debug, Default)]
pub struct DedupTracker {
    state: SeenState,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SeenState {
        self.state
    }

    pub fn begin_cycle(&mut self) -> CycleScan<'_> {
        CycleScan {
            reference: self.state,
            newest: None,
            tracker: self,
        }
    }
}

/// Scan over one cycle's records. Every record is compared against the
/// reference taken at cycle start; the state only moves on [`CycleScan::commit`].
#[derive(Debug)]
pub struct CycleScan<'a> {
    tracker: &'a mut DedupTracker,
    reference: SeenState,
    newest: Option<NaiveDateTime>,
}

impl CycleScan<'_> {
    /// `false` means this record and everything after it were already seen.
    pub fn is_new(&mut self, record: &SeismicRecord) -> bool {
        let (fresh, _) = is_new(record, self.reference);
        if fresh && self.newest.is_none() {
            self.newest = Some(record.identity());
        }
        fresh
    }

    pub fn accepted_any(&self) -> bool {
        self.newest.is_some()
    }

    /// Makes the newest accepted record of this cycle the new reference.
    /// Dropping the scan without committing leaves the state untouched.
    pub fn commit(self) {
        if let Some(newest) = self.newest {
            self.tracker.state.last = Some(newest);
        }
    }
}
