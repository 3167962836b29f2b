//! MIDI input for GridSync
//!
//! This module provides:
//! - Parsing of raw bytes into [`MidiMessage`] and onset qualification
//! - The [`MidiEngine`] trait for timed input sources
//! - [`MidirEngine`] for real devices via midir
//! - [`MockMidiEngine`] for scripted input in tests
//! - [`run_midi_input`] to pump a source into the event loop
mod engine;
mod input;
pub mod midir_engine;
pub mod mock_engine;

pub use engine::{MidiEngine, MidiError, MidiMessage, Result, TimedMessage};
pub use input::run_midi_input;
pub use midir_engine::{list_input_devices, MidirEngine, PortSelector};
pub use mock_engine::MockMidiEngine;

// Set default engine type
pub type DefaultMidiEngine = MidirEngine;
