// ui.rs

use crate::engine::SharedEngine;
use crate::recorder::OnsetRecord;
use crate::timing::{Accuracy, TransportState};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Columns of the measure bar; the grid mapper's normalized position is
/// scaled to this width.
pub const MEASURE_WIDTH: u64 = 48;

const REFRESH: Duration = Duration::from_millis(50);

fn create_measure_progress(multi_progress: &MultiProgress) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new(MEASURE_WIDTH));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:48.cyan}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.set_prefix("Measure");
    pb
}

fn create_spinner(multi_progress: &MultiProgress, prefix: &'static str) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new_spinner());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix(prefix);
    pb
}

/// One status line for the latest hit.
pub fn describe_onset(record: &OnsetRecord, tolerance_ms: f64) -> String {
    let verdict = match record.accuracy(tolerance_ms) {
        Accuracy::OnTime => "on time",
        Accuracy::Early => "early",
        Accuracy::Late => "late",
    };
    format!(
        "note {} | beat {} {:+.1} ms | division {} {:+.1} ms | {}",
        record.note,
        record.position.nearest_beat,
        record.position.nearest_beat_deviation_seconds * 1000.0,
        record.position.nearest_division,
        record.position.nearest_division_deviation_seconds * 1000.0,
        verdict
    )
}

/// Terminal status display. Only ever reads the engine.
pub struct StatusDisplay {
    engine: SharedEngine,

    #[allow(dead_code)]
    multi_progress: MultiProgress,
    measure_pb: ProgressBar,
    onset_pb: ProgressBar,
    transport_pb: ProgressBar,
}

impl StatusDisplay {
    pub fn new(engine: SharedEngine) -> Self {
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::stderr());
        let measure_pb = create_measure_progress(&multi_progress);
        let onset_pb = create_spinner(&multi_progress, "Onset");
        let transport_pb = create_spinner(&multi_progress, "Transport");

        StatusDisplay {
            engine,
            multi_progress,
            measure_pb,
            onset_pb,
            transport_pb,
        }
    }

    /// Redraws until `running` is cleared.
    pub fn run(&self, running: Arc<AtomicBool>) {
        while running.load(Ordering::SeqCst) {
            thread::sleep(REFRESH);
            self.refresh();
        }
        self.measure_pb.finish_and_clear();
        self.onset_pb.finish_and_clear();
        self.transport_pb.finish_and_clear();
    }

    fn refresh(&self) {
        let Ok(engine) = self.engine.lock() else {
            return;
        };
        let timing = engine.timing();
        let settings = timing.settings();
        let now = timing.map_timestamp(engine.now_ms());

        let x = now.normalized_position.rem_euclid(1.0) * MEASURE_WIDTH as f64;
        self.measure_pb.set_position(x as u64);
        self.measure_pb.set_message(format!(
            "{:.2}/{}",
            now.beat_count, settings.beats_per_measure
        ));

        let recent = engine
            .history()
            .recent(engine.now_ms(), timing.history_cutoff_seconds())
            .count();
        if let Some(record) = engine.history().last() {
            self.onset_pb.set_message(format!(
                "{} | {} in window",
                describe_onset(record, settings.tolerance_ms),
                recent
            ));
        }

        let pulses = engine.pulses();
        let transport = match pulses.state() {
            TransportState::Running => "running",
            TransportState::Stopped => "stopped",
        };
        self.transport_pb.set_message(format!(
            "BPM: {} | {} beats x{} | Pulses: {} ({} beats) | Clock: {} | Click: {}",
            settings.tempo_bpm,
            settings.beats_per_measure,
            settings.divisions_per_beat,
            pulses.count(),
            pulses.beats(),
            transport,
            engine.metronome().count()
        ));
        self.transport_pb.tick();
    }
}

pub fn run_status_display(engine: SharedEngine, running: Arc<AtomicBool>) {
    StatusDisplay::new(engine).run(running);
}
