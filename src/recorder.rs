//! Ordered history of classified onsets

use crate::timing::{Accuracy, GridPosition, SessionTiming};

/// A qualifying note-on as delivered by the input source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteOnset {
    pub timestamp_ms: f64,
    pub note: u8,
    pub velocity: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OnsetRecord {
    pub timestamp_ms: f64,
    pub note: u8,
    pub velocity: u8,
    pub pulse_count_at_onset: u64,
    /// `timestamp_ms - now_ms` at recording time; negative for events
    /// already in the past when processed.
    pub offset_from_now_ms: f64,
    pub position: GridPosition,
}

impl OnsetRecord {
    /// Judges the hit against its nearest division line.
    pub fn accuracy(&self, tolerance_ms: f64) -> Accuracy {
        Accuracy::classify(self.position.nearest_division_deviation_seconds, tolerance_ms)
    }
}

/// Append-only onset history, cleared wholesale on reset.
///
/// Every onset is kept regardless of tolerance or age; readers that only
/// want the visible window use [`OnsetHistory::recent`].
#[derive(Debug, Clone, Default)]
pub struct OnsetHistory {
    records: Vec<OnsetRecord>,
}

impl OnsetHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        timing: &SessionTiming,
        onset: NoteOnset,
        pulse_count_at_onset: u64,
        now_ms: f64,
    ) -> &OnsetRecord {
        self.records.push(OnsetRecord {
            timestamp_ms: onset.timestamp_ms,
            note: onset.note,
            velocity: onset.velocity,
            pulse_count_at_onset,
            offset_from_now_ms: onset.timestamp_ms - now_ms,
            position: timing.map_timestamp(onset.timestamp_ms),
        });
        &self.records[self.records.len() - 1]
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[OnsetRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&OnsetRecord> {
        self.records.last()
    }

    /// Records no older than `cutoff_seconds` at `now_ms`.
    pub fn recent(&self, now_ms: f64, cutoff_seconds: f64) -> impl Iterator<Item = &OnsetRecord> {
        let oldest_ms = now_ms - cutoff_seconds * 1000.0;
        self.records
            .iter()
            .filter(move |record| record.timestamp_ms >= oldest_ms)
    }
}
