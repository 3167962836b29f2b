use gridsyncrs::config::Settings;
use gridsyncrs::timing::{map_timestamp, SessionTiming, TimingOrigin};

const EPS: f64 = 1e-9;
const START_MS: f64 = 12_345.0;

fn session(settings: Settings) -> SessionTiming {
    SessionTiming::new(settings, TimingOrigin::new(START_MS, 3.0))
}

fn at_seconds(seconds: f64) -> f64 {
    START_MS + seconds * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_exactly_on_beat_three() {
        let timing = session(Settings::default());
        let position = timing.map_timestamp(at_seconds(1.5));

        assert!((position.elapsed_seconds - 1.5).abs() < EPS);
        assert!((position.beat_count - 3.0).abs() < EPS);
        assert_eq!(position.nearest_beat, 3);
        assert!(position.nearest_beat_deviation_seconds.abs() < EPS);
        assert!(position.division_phase.abs() < EPS);
        assert_eq!(position.nearest_division, 0);
        assert!(position.nearest_division_deviation_seconds.abs() < EPS);
    }

    #[test]
    fn test_note_between_divisions() {
        let timing = session(Settings::default());
        let position = timing.map_timestamp(at_seconds(1.6));

        assert!((position.beat_count - 3.2).abs() < EPS);
        assert_eq!(position.nearest_beat, 3);
        assert!((position.nearest_beat_deviation_seconds - 0.1).abs() < EPS);
        assert!((position.division_phase - 0.8).abs() < EPS);
        assert_eq!(position.nearest_division, 1);
        assert!((position.nearest_division_deviation_seconds + 0.025).abs() < EPS);
    }

    #[test]
    fn test_measure_periodicity() {
        let settings = Settings {
            tempo_bpm: 97.0,
            beats_per_measure: 7,
            divisions_per_beat: 3,
            ..Settings::default()
        };
        let timing = session(settings);
        let measure_ms = timing.measure_duration_seconds() * 1000.0;

        for step in 0..200 {
            let t = START_MS + f64::from(step) * 37.3;
            let here = timing.map_timestamp(t);
            let next_measure = timing.map_timestamp(t + measure_ms);
            let wrapped_difference = (here.beat_count - next_measure.beat_count).abs();
            // a value just under the wrap point may land just above zero
            let distance = wrapped_difference.min(7.0 - wrapped_difference);
            assert!(distance < 1e-6, "step {}: {:?} vs {:?}", step, here, next_measure);
        }
    }

    #[test]
    fn test_every_beat_is_a_grid_line() {
        let settings = Settings {
            tempo_bpm: 133.0,
            beats_per_measure: 5,
            ..Settings::default()
        };
        let timing = session(settings);
        let beat = timing.beat_duration_seconds();

        for n in 0..40u32 {
            let position = timing.map_timestamp(at_seconds(f64::from(n) * beat));
            assert_eq!(position.nearest_beat, n % 5, "beat {}", n);
            assert_eq!(position.nearest_division, 0, "beat {}", n);
            assert!(
                position.nearest_beat_deviation_seconds.abs() < EPS,
                "beat {} deviation {}",
                n,
                position.nearest_beat_deviation_seconds
            );
            assert!(position.nearest_division_deviation_seconds.abs() < EPS);
        }
    }

    #[test]
    fn test_nearest_lines_stay_inside_measure() {
        let settings = Settings {
            tempo_bpm: 133.0,
            beats_per_measure: 5,
            divisions_per_beat: 3,
            ..Settings::default()
        };
        let timing = session(settings);
        let beat = timing.beat_duration_seconds();

        for n in 0..1000u32 {
            let position = timing.map_timestamp(at_seconds(f64::from(n) * beat));
            assert!(position.nearest_beat < 5, "beat {}: {:?}", n, position);
            assert!(position.nearest_division < 3, "beat {}: {:?}", n, position);
        }
    }

    #[test]
    fn test_division_deviation_bounds() {
        for (tempo, divisions) in [(60.0, 1), (120.0, 4), (174.0, 3), (90.0, 6)] {
            let settings = Settings {
                tempo_bpm: tempo,
                divisions_per_beat: divisions,
                ..Settings::default()
            };
            let timing = session(settings);
            let bound = timing.beat_duration_seconds() / (2.0 * f64::from(divisions));

            for step in 0..500 {
                let t = START_MS - 5_000.0 + f64::from(step) * 23.7;
                let deviation = timing.map_timestamp(t).nearest_division_deviation_seconds;
                assert!(deviation.abs() <= bound + EPS, "{} > {}", deviation, bound);
            }
        }
    }

    #[test]
    fn test_timestamps_before_origin_wrap_forward() {
        let timing = session(Settings::default());
        let position = timing.map_timestamp(at_seconds(-0.25));

        assert!(position.elapsed_seconds < 0.0);
        assert!((position.beat_count - 3.5).abs() < EPS);
        assert_eq!(position.nearest_beat, 0);
        assert!((position.nearest_beat_deviation_seconds + 0.25).abs() < EPS);
    }

    #[test]
    fn test_beat_count_stays_in_range() {
        let timing = session(Settings::default());
        for step in -400..400 {
            let position = timing.map_timestamp(at_seconds(f64::from(step) * 0.0731));
            assert!(position.beat_count >= 0.0 && position.beat_count < 4.0);
            assert!(position.division_phase >= 0.0 && position.division_phase < 4.0);
        }
    }

    #[test]
    fn test_free_function_matches_snapshot() {
        let settings = Settings::default();
        let origin = TimingOrigin::new(START_MS, 3.0);
        let timing = SessionTiming::new(settings.clone(), origin.clone());
        let t = at_seconds(2.718);
        assert_eq!(map_timestamp(t, &origin, &settings), timing.map_timestamp(t));
    }
}
