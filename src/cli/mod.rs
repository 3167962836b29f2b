use crate::config::Settings;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI input devices
    #[arg(long)]
    pub device_list: bool,

    /// Bind to a specific MIDI input device (name substring)
    #[arg(long)]
    pub bind_to_device: Option<String>,

    /// Pick the MIDI input device interactively
    #[arg(long, conflicts_with = "bind_to_device")]
    pub select: bool,

    /// Settings file (TOML); console changes are saved back to it
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tempo in beats per minute
    #[arg(short = 'b', long)]
    pub tempo: Option<f64>,

    /// Grid divisions per beat
    #[arg(long)]
    pub divisions: Option<u32>,

    /// Beats per measure
    #[arg(long)]
    pub beats_per_measure: Option<u32>,

    /// On-time window in milliseconds
    #[arg(long)]
    pub tolerance_ms: Option<f64>,

    /// Horizontal offset of the measure display, in beats
    #[arg(long, allow_hyphen_values = true)]
    pub visualization_offset: Option<f64>,

    /// Measures of onset history shown by the display
    #[arg(long)]
    pub history_measures: Option<f64>,

    /// MIDI input index used when no device name is given
    #[arg(long)]
    pub midi_index: Option<usize>,

    /// Log to stderr instead of the log file
    #[arg(long)]
    pub log_stderr: bool,

    /// Do not draw the terminal status display
    #[arg(long)]
    pub no_status: bool,
}

impl Args {
    /// Command-line values win over file and environment settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(tempo) = self.tempo {
            settings.tempo_bpm = tempo;
        }
        if let Some(divisions) = self.divisions {
            settings.divisions_per_beat = divisions;
        }
        if let Some(beats) = self.beats_per_measure {
            settings.beats_per_measure = beats;
        }
        if let Some(tolerance) = self.tolerance_ms {
            settings.tolerance_ms = tolerance;
        }
        if let Some(offset) = self.visualization_offset {
            settings.visualization_offset_beats = offset;
        }
        if let Some(history) = self.history_measures {
            settings.history_measures = history;
        }
        if let Some(index) = self.midi_index {
            settings.midi_index = index;
        }
    }
}

pub fn handle_device_list() -> Vec<String> {
    crate::midi::list_input_devices()
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}
