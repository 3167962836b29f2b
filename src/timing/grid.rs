use super::origin::TimingOrigin;
use crate::config::Settings;

/// Where a timestamp falls on the beat/division grid of the current session.
///
/// Deviations are signed seconds: negative means the event came before the
/// grid line, positive after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPosition {
    pub elapsed_seconds: f64,
    /// Fractional beat within the measure, in `[0, beats_per_measure)`.
    pub beat_count: f64,
    /// May equal `beats_per_measure`, meaning the next downbeat.
    pub nearest_beat: u32,
    pub nearest_beat_deviation_seconds: f64,
    /// Fractional division within the beat, in `[0, divisions_per_beat)`.
    pub division_phase: f64,
    /// May equal `divisions_per_beat`, meaning the next beat.
    pub nearest_division: u32,
    pub nearest_division_deviation_seconds: f64,
    /// Horizontal position with the viewport width taken as 1.0.
    pub normalized_position: f64,
}

impl GridPosition {
    pub fn x_position(&self, viewport_width: f64) -> f64 {
        self.normalized_position * viewport_width
    }
}

/// Downstream judgement of a deviation against the tolerance window.
///
/// Recording never consults this; it exists for renderers deciding how to
/// colour a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    OnTime,
    Early,
    Late,
}

impl Accuracy {
    pub fn classify(deviation_seconds: f64, tolerance_ms: f64) -> Self {
        let deviation_ms = deviation_seconds * 1000.0;
        if deviation_ms.abs() <= tolerance_ms {
            Accuracy::OnTime
        } else if deviation_ms < 0.0 {
            Accuracy::Early
        } else {
            Accuracy::Late
        }
    }
}

/// Immutable snapshot of everything the grid mapper reads.
///
/// The engine swaps a whole `Arc<SessionTiming>` on reset, so a reader
/// holding one never sees an origin from one session paired with the
/// settings of another.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTiming {
    settings: Settings,
    origin: TimingOrigin,
    beat_duration_seconds: f64,
    measure_duration_seconds: f64,
    history_cutoff_seconds: f64,
}

impl SessionTiming {
    /// `settings` must already be validated.
    pub fn new(settings: Settings, origin: TimingOrigin) -> Self {
        let beat_duration_seconds = settings.beat_duration_seconds();
        let measure_duration_seconds = beat_duration_seconds * f64::from(settings.beats_per_measure);
        let history_cutoff_seconds = measure_duration_seconds * settings.history_measures;
        Self {
            settings,
            origin,
            beat_duration_seconds,
            measure_duration_seconds,
            history_cutoff_seconds,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn origin(&self) -> &TimingOrigin {
        &self.origin
    }

    pub fn beat_duration_seconds(&self) -> f64 {
        self.beat_duration_seconds
    }

    pub fn measure_duration_seconds(&self) -> f64 {
        self.measure_duration_seconds
    }

    pub fn history_cutoff_seconds(&self) -> f64 {
        self.history_cutoff_seconds
    }

    pub fn map_timestamp(&self, timestamp_ms: f64) -> GridPosition {
        map_timestamp(timestamp_ms, &self.origin, &self.settings)
    }
}

/// Maps a wall-clock timestamp (ms) onto the grid.
///
/// Timestamps before the origin are fine: the beat count is wrapped with a
/// Euclidean modulo so it stays in `[0, beats_per_measure)`. Nearest grid
/// lines are found with `f64::round`, i.e. halves round away from zero, and
/// reported modulo the measure (beats) or the beat (divisions). Deviations
/// are signed distances to the unwrapped line.
pub fn map_timestamp(timestamp_ms: f64, origin: &TimingOrigin, settings: &Settings) -> GridPosition {
    let beat_duration = settings.beat_duration_seconds();
    let beats_per_measure = f64::from(settings.beats_per_measure);
    let divisions = f64::from(settings.divisions_per_beat);

    let elapsed_seconds = (timestamp_ms - origin.wall_clock_start_ms) / 1000.0;

    let beat_count = wrap(elapsed_seconds / beat_duration, beats_per_measure);
    let nearest_beat = beat_count.round();
    let nearest_beat_deviation_seconds = (beat_count - nearest_beat) * beat_duration;

    let division_phase = wrap(beat_count * divisions, divisions);
    let nearest_division = division_phase.round();
    let nearest_division_deviation_seconds =
        (division_phase - nearest_division) * beat_duration / divisions;

    let normalized_position =
        settings.visualization_offset_beats / beats_per_measure + beat_count / beats_per_measure;

    GridPosition {
        elapsed_seconds,
        beat_count,
        nearest_beat: nearest_beat as u32 % settings.beats_per_measure,
        nearest_beat_deviation_seconds,
        division_phase,
        nearest_division: nearest_division as u32 % settings.divisions_per_beat,
        nearest_division_deviation_seconds,
        normalized_position,
    }
}

// rem_euclid can return `modulus` itself for tiny negative inputs.
fn wrap(value: f64, modulus: f64) -> f64 {
    let wrapped = value.rem_euclid(modulus);
    if wrapped >= modulus {
        0.0
    } else {
        wrapped
    }
}
