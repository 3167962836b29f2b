// config.rs

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// MIDI timing clock resolution
pub const PULSES_PER_QUARTER_NOTE: u64 = 24;

/// Prefix for environment overrides, e.g. `GRIDSYNC_TEMPO_BPM=96`
pub const ENV_PREFIX: &str = "GRIDSYNC";

pub const SETTING_KEYS: [&str; 7] = [
    "tempo_bpm",
    "divisions_per_beat",
    "beats_per_measure",
    "tolerance_ms",
    "visualization_offset_beats",
    "history_measures",
    "midi_index",
];

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("tempo must be a positive number of BPM, got {0}")]
    InvalidTempo(f64),
    #[error("divisions per beat must be a whole number of at least 1, got {0}")]
    InvalidDivisions(f64),
    #[error("beats per measure must be a whole number of at least 1, got {0}")]
    InvalidBeatsPerMeasure(f64),
    #[error("tolerance must be zero or more milliseconds, got {0}")]
    InvalidTolerance(f64),
    #[error("visualization offset must be a finite number of beats, got {0}")]
    InvalidOffset(f64),
    #[error("history length must be zero or more measures, got {0}")]
    InvalidHistory(f64),
    #[error("MIDI input index must be a whole number, got {0}")]
    InvalidMidiIndex(f64),
    #[error("setting \"{0}\" does not exist")]
    UnknownSetting(String),
    #[error("failed to load settings: {0}")]
    Load(String),
    #[error("failed to save settings: {0}")]
    Persist(String),
}

/// Session settings
///
/// Every field falls back to its default when absent from the settings
/// file, so partial files are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub midi_index: usize,
    pub tempo_bpm: f64,
    pub divisions_per_beat: u32,
    pub beats_per_measure: u32,
    pub tolerance_ms: f64,
    pub visualization_offset_beats: f64,
    pub history_measures: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            midi_index: 0,
            tempo_bpm: 120.0,
            divisions_per_beat: 4,
            beats_per_measure: 4,
            tolerance_ms: 33.0,
            visualization_offset_beats: 0.5,
            history_measures: 2.0,
        }
    }
}

impl Settings {
    /// Defaults, then the optional settings file, then `GRIDSYNC_*`
    /// environment variables.
    ///
    /// The merged values are not validated here; command-line overrides
    /// still apply on top, so callers validate the final result.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            debug!("Reading settings file: {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        let settings: Settings = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| SettingsError::Load(e.to_string()))?;

        info!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text =
            toml::to_string_pretty(self).map_err(|e| SettingsError::Persist(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SettingsError::Persist(e.to_string()))?;
        }
        fs::write(path, text).map_err(|e| SettingsError::Persist(e.to_string()))?;
        debug!("Settings written to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.tempo_bpm.is_finite() && self.tempo_bpm > 0.0) {
            return Err(SettingsError::InvalidTempo(self.tempo_bpm));
        }
        if self.divisions_per_beat == 0 {
            return Err(SettingsError::InvalidDivisions(0.0));
        }
        if self.beats_per_measure == 0 {
            return Err(SettingsError::InvalidBeatsPerMeasure(0.0));
        }
        if !(self.tolerance_ms.is_finite() && self.tolerance_ms >= 0.0) {
            return Err(SettingsError::InvalidTolerance(self.tolerance_ms));
        }
        if !self.visualization_offset_beats.is_finite() {
            return Err(SettingsError::InvalidOffset(self.visualization_offset_beats));
        }
        if !(self.history_measures.is_finite() && self.history_measures >= 0.0) {
            return Err(SettingsError::InvalidHistory(self.history_measures));
        }
        Ok(())
    }

    /// Sets one field by name. The result is not validated here.
    pub fn set(&mut self, key: &str, value: f64) -> Result<(), SettingsError> {
        match key {
            "tempo_bpm" => self.tempo_bpm = value,
            "divisions_per_beat" => {
                self.divisions_per_beat =
                    as_count(value).ok_or(SettingsError::InvalidDivisions(value))?;
            }
            "beats_per_measure" => {
                self.beats_per_measure =
                    as_count(value).ok_or(SettingsError::InvalidBeatsPerMeasure(value))?;
            }
            "tolerance_ms" => self.tolerance_ms = value,
            "visualization_offset_beats" => self.visualization_offset_beats = value,
            "history_measures" => self.history_measures = value,
            "midi_index" => {
                self.midi_index =
                    as_count(value).ok_or(SettingsError::InvalidMidiIndex(value))? as usize;
            }
            _ => return Err(SettingsError::UnknownSetting(key.to_string())),
        }
        Ok(())
    }

    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.tempo_bpm
    }
}

fn as_count(value: f64) -> Option<u32> {
    let whole = value.is_finite() && value.fract() == 0.0;
    (whole && value >= 0.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
}

/// Owner of the live settings.
///
/// Accepted changes are persisted (when a file is configured) and
/// published on a single subscription channel; the event loop holds the
/// receiving end and resets the session on every snapshot it gets.
#[derive(Debug)]
pub struct SettingsStore {
    settings: Settings,
    path: Option<PathBuf>,
    subscriber: Option<Sender<Settings>>,
}

impl SettingsStore {
    pub fn new(settings: Settings, path: Option<PathBuf>) -> Self {
        Self {
            settings,
            path,
            subscriber: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Opens the change channel. A second call replaces the first
    /// subscriber.
    pub fn subscribe(&mut self) -> Receiver<Settings> {
        let (tx, rx) = unbounded();
        self.subscriber = Some(tx);
        rx
    }

    /// Validates, stores, persists and publishes one change. On error the
    /// stored settings are left untouched.
    pub fn update_setting(&mut self, key: &str, value: f64) -> Result<(), SettingsError> {
        let mut updated = self.settings.clone();
        updated.set(key, value)?;
        updated.validate()?;

        if let Some(path) = &self.path {
            updated.save(path)?;
        }
        self.settings = updated;
        info!("Setting {} changed to {}", key, value);

        if let Some(subscriber) = &self.subscriber {
            if subscriber.send(self.settings.clone()).is_err() {
                warn!("Settings subscriber dropped, change not delivered");
                self.subscriber = None;
            }
        }
        Ok(())
    }
}
