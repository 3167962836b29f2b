/// Beat timestamps of the conceptual click, on the reference clock.
///
/// Nothing is played; the track only answers "how many beats have gone
/// by, and when is the next one" so a renderer can line the click up with
/// recorded onsets.
#[derive(Debug, Clone, PartialEq)]
pub struct MetronomeTrack {
    count: u64,
    next_beat_time: f64,
    beat_duration_seconds: f64,
}

impl MetronomeTrack {
    pub fn new(start_seconds: f64, beat_duration_seconds: f64) -> Self {
        Self {
            count: 0,
            next_beat_time: start_seconds,
            beat_duration_seconds,
        }
    }

    /// Moves past every beat at or before `now_seconds` and returns how
    /// many were crossed.
    pub fn advance(&mut self, now_seconds: f64) -> u64 {
        if now_seconds < self.next_beat_time {
            return 0;
        }
        let crossed =
            ((now_seconds - self.next_beat_time) / self.beat_duration_seconds).floor() as u64 + 1;
        self.count += crossed;
        self.next_beat_time += crossed as f64 * self.beat_duration_seconds;
        crossed
    }

    /// Beats that have sounded since the origin.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn next_beat_time(&self) -> f64 {
        self.next_beat_time
    }

    /// Zero-based index within the measure of the most recent beat.
    pub fn last_beat_in_measure(&self, beats_per_measure: u32) -> Option<u32> {
        self.count
            .checked_sub(1)
            .map(|n| (n % u64::from(beats_per_measure)) as u32)
    }
}
