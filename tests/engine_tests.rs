use gridsyncrs::config::{Settings, SettingsError};
use gridsyncrs::engine::Engine;
use gridsyncrs::midi::{MidiMessage, TimedMessage};
use gridsyncrs::recorder::NoteOnset;
use gridsyncrs::timing::{ManualClock, TransportMessage};
use std::sync::Arc;

struct Fixture {
    wall: Arc<ManualClock>,
    reference: Arc<ManualClock>,
    engine: Engine,
}

fn fixture(settings: Settings) -> Fixture {
    let wall = Arc::new(ManualClock::new(10_000.0));
    let reference = Arc::new(ManualClock::new(2_000.0));
    let engine = Engine::new(settings, wall.clone(), reference.clone()).unwrap();
    Fixture {
        wall,
        reference,
        engine,
    }
}

fn note_on(timestamp_ms: f64, note: u8, velocity: u8) -> TimedMessage {
    TimedMessage::new(
        timestamp_ms,
        MidiMessage::NoteOn {
            channel: 9,
            note,
            velocity,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_captured_from_clocks() {
        let f = fixture(Settings::default());
        let timing = f.engine.timing();
        let origin = timing.origin();
        assert_eq!(origin.wall_clock_start_ms, 10_000.0);
        assert_eq!(origin.reference_clock_start, 2.0);
        assert!((origin.reference_clock_offset - 8.0).abs() < 1e-12);
        assert_eq!(f.engine.metronome().next_beat_time(), 2.0);
    }

    #[test]
    fn test_rejects_invalid_settings_at_construction() {
        let wall = Arc::new(ManualClock::new(0.0));
        let reference = Arc::new(ManualClock::new(0.0));
        let settings = Settings {
            tempo_bpm: 0.0,
            ..Settings::default()
        };
        let result = Engine::new(settings, wall, reference);
        assert!(matches!(result, Err(SettingsError::InvalidTempo(_))));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut f = fixture(Settings::default());
        for i in 0..5 {
            let record = f
                .engine
                .record_onset(NoteOnset {
                    timestamp_ms: 10_000.0 + f64::from(i) * 250.0,
                    note: 36,
                    velocity: 100,
                })
                .expect("positive velocity is recorded");
            assert_eq!(record.note, 36);
        }
        assert_eq!(f.engine.history().len(), 5);

        f.engine.reset();
        assert!(f.engine.history().is_empty());
    }

    #[test]
    fn test_reset_moves_origin_and_clears_pulses() {
        let mut f = fixture(Settings::default());
        f.engine.handle_transport(TransportMessage::Start);
        f.engine.handle_transport(TransportMessage::Pulse);
        f.engine.handle_transport(TransportMessage::Pulse);

        let before = f.engine.timing();
        f.wall.advance_ms(1_234.0);
        f.reference.advance_ms(1_234.0);
        f.engine.reset();

        assert_eq!(f.engine.pulses().count(), 0);
        assert!(f.engine.pulses().is_running());
        assert_eq!(f.engine.timing().origin().wall_clock_start_ms, 11_234.0);
        // earlier snapshots are untouched
        assert_eq!(before.origin().wall_clock_start_ms, 10_000.0);
    }

    #[test]
    fn test_onset_message_classified_and_tagged() {
        let mut f = fixture(Settings::default());
        for msg in [MidiMessage::Start, MidiMessage::Clock, MidiMessage::Clock] {
            assert!(f
                .engine
                .handle_message(&TimedMessage::new(10_000.0, msg))
                .is_none());
        }

        f.wall.set_ms(11_605.0);
        let record = f
            .engine
            .handle_message(&note_on(11_600.0, 38, 110))
            .expect("note-on with velocity is an onset");

        assert_eq!(record.note, 38);
        assert_eq!(record.velocity, 110);
        assert_eq!(record.pulse_count_at_onset, 2);
        assert_eq!(record.offset_from_now_ms, -5.0);
        assert_eq!(record.position.nearest_beat, 3);
        assert_eq!(record.position.nearest_division, 1);
        assert!((record.position.nearest_division_deviation_seconds + 0.025).abs() < 1e-9);
        assert_eq!(f.engine.history().len(), 1);
    }

    #[test]
    fn test_non_onsets_are_not_recorded() {
        let mut f = fixture(Settings::default());
        let ignored = [
            note_on(10_100.0, 38, 0),
            TimedMessage::new(
                10_200.0,
                MidiMessage::NoteOff {
                    channel: 9,
                    note: 38,
                    velocity: 64,
                },
            ),
            TimedMessage::new(10_300.0, MidiMessage::Other(vec![0xB0, 7, 100])),
        ];
        for msg in &ignored {
            assert!(f.engine.handle_message(msg).is_none());
        }
        assert!(f.engine.history().is_empty());
    }

    #[test]
    fn test_silent_onset_is_not_recorded() {
        let mut f = fixture(Settings::default());
        let silent = NoteOnset {
            timestamp_ms: 10_100.0,
            note: 38,
            velocity: 0,
        };
        assert!(f.engine.record_onset(silent).is_none());
        assert!(f.engine.history().is_empty());
    }

    #[test]
    fn test_apply_settings_resets_session() {
        let mut f = fixture(Settings::default());
        f.engine.record_onset(NoteOnset {
            timestamp_ms: 10_100.0,
            note: 42,
            velocity: 80,
        });
        f.wall.advance_ms(500.0);

        let faster = Settings {
            tempo_bpm: 150.0,
            ..Settings::default()
        };
        f.engine.apply_settings(faster).unwrap();

        assert_eq!(f.engine.settings().tempo_bpm, 150.0);
        assert!((f.engine.timing().beat_duration_seconds() - 0.4).abs() < 1e-12);
        assert_eq!(f.engine.timing().origin().wall_clock_start_ms, 10_500.0);
        assert!(f.engine.history().is_empty());
    }

    #[test]
    fn test_apply_invalid_settings_keeps_session() {
        let mut f = fixture(Settings::default());
        f.engine.record_onset(NoteOnset {
            timestamp_ms: 10_100.0,
            note: 42,
            velocity: 80,
        });

        let broken = Settings {
            divisions_per_beat: 0,
            ..Settings::default()
        };
        assert!(f.engine.apply_settings(broken).is_err());
        assert_eq!(f.engine.settings(), &Settings::default());
        assert_eq!(f.engine.history().len(), 1);
    }

    #[test]
    fn test_metronome_follows_reference_clock() {
        let mut f = fixture(Settings::default());
        assert_eq!(f.engine.advance_metronome(), 1);
        f.reference.advance_ms(1_100.0);
        assert_eq!(f.engine.advance_metronome(), 2);
        assert_eq!(f.engine.metronome().count(), 3);
    }
}
