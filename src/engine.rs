//! Per-session state and the operations that mutate it

use crate::config::{Settings, SettingsError};
use crate::midi::TimedMessage;
use crate::recorder::{NoteOnset, OnsetHistory, OnsetRecord};
use crate::timing::{
    GridPosition, MetronomeTrack, PulseCounter, ReferenceClock, SessionTiming, TimingOrigin,
    TransportMessage, WallClock,
};
use log::{debug, info};
use std::sync::{Arc, Mutex};

/// Engine shared between the event loop (writer) and displays (readers)
pub type SharedEngine = Arc<Mutex<Engine>>;

/// One performance session: settings snapshot, timing origin, pulse
/// counter, metronome track and onset history.
///
/// All mutation goes through `&mut self`; in the binary that means the
/// event loop is the only writer.
pub struct Engine {
    timing: Arc<SessionTiming>,
    pulses: PulseCounter,
    metronome: MetronomeTrack,
    history: OnsetHistory,
    wall: Arc<dyn WallClock>,
    reference: Arc<dyn ReferenceClock>,
}

impl Engine {
    /// Validates `settings` and starts the first session.
    pub fn new(
        settings: Settings,
        wall: Arc<dyn WallClock>,
        reference: Arc<dyn ReferenceClock>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let origin = TimingOrigin::capture(wall.as_ref(), reference.as_ref());
        let timing = SessionTiming::new(settings, origin);
        let metronome = MetronomeTrack::new(
            timing.origin().reference_clock_start,
            timing.beat_duration_seconds(),
        );
        info!(
            "Session started at {} ({} BPM)",
            timing.origin().started_at.format("%H:%M:%S%.3f"),
            timing.settings().tempo_bpm
        );

        Ok(Self {
            timing: Arc::new(timing),
            pulses: PulseCounter::new(),
            metronome,
            history: OnsetHistory::new(),
            wall,
            reference,
        })
    }

    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    /// Re-anchors musical time zero at the current instant.
    ///
    /// The new origin and derived durations are published as one `Arc`
    /// swap. Clears the pulse tally (not the transport state) and the
    /// onset history.
    pub fn reset(&mut self) {
        let origin = TimingOrigin::capture(self.wall.as_ref(), self.reference.as_ref());
        let timing = SessionTiming::new(self.timing.settings().clone(), origin);

        self.metronome = MetronomeTrack::new(
            timing.origin().reference_clock_start,
            timing.beat_duration_seconds(),
        );
        self.pulses.clear();
        self.history.clear();
        self.timing = Arc::new(timing);

        let origin = self.timing.origin();
        info!(
            "Session reset: origin {:.3} ms, reference {:.6} s, offset {:.6} s",
            origin.wall_clock_start_ms, origin.reference_clock_start, origin.reference_clock_offset
        );
    }

    /// Adopts new settings and resets. Invalid settings are returned as an
    /// error and leave the session untouched.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.timing = Arc::new(SessionTiming::new(settings, self.timing.origin().clone()));
        self.reset();
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        self.timing.settings()
    }

    /// Snapshot for readers; stays consistent across later resets.
    pub fn timing(&self) -> Arc<SessionTiming> {
        Arc::clone(&self.timing)
    }

    pub fn map_timestamp(&self, timestamp_ms: f64) -> GridPosition {
        self.timing.map_timestamp(timestamp_ms)
    }

    /// Routes one input message. Returns the record when the message was
    /// a qualifying onset.
    pub fn handle_message(&mut self, message: &TimedMessage) -> Option<OnsetRecord> {
        if let Some(transport) = message.message.transport() {
            self.handle_transport(transport);
            return None;
        }
        message.onset().and_then(|onset| self.record_onset(onset))
    }

    pub fn handle_transport(&mut self, msg: TransportMessage) {
        self.pulses.process(msg);
    }

    /// Classifies and stores an onset, tagged with the current pulse count.
    /// A zero velocity is a silent note and is not recorded.
    pub fn record_onset(&mut self, onset: NoteOnset) -> Option<OnsetRecord> {
        if onset.velocity == 0 {
            return None;
        }
        let now_ms = self.wall.now_ms();
        let record = self
            .history
            .record(&self.timing, onset, self.pulses.count(), now_ms)
            .clone();
        debug!("Onset recorded: {:?}", record);
        Some(record)
    }

    /// Moves the metronome track up to the reference clock's present.
    pub fn advance_metronome(&mut self) -> u64 {
        self.metronome.advance(self.reference.now_seconds())
    }

    pub fn pulses(&self) -> &PulseCounter {
        &self.pulses
    }

    pub fn metronome(&self) -> &MetronomeTrack {
        &self.metronome
    }

    pub fn history(&self) -> &OnsetHistory {
        &self.history
    }

    pub fn now_ms(&self) -> f64 {
        self.wall.now_ms()
    }
}
