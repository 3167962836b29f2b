use crate::midi::{MidiEngine, MidiError, MidiMessage, Result, TimedMessage};
use crate::timing::WallClock;
use crossbeam::channel::{unbounded, Receiver};
use log::{debug, info};
use midir::{Ignore, MidiInput, MidiInputConnection};
use std::sync::Arc;

/// How to pick the input port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelector {
    /// First port whose name contains this text
    Name(String),
    /// Position in the port list
    Index(usize),
}

pub struct MidirEngine {
    _connection: MidiInputConnection<()>,
    rx: Receiver<TimedMessage>,
    port_name: String,
}

impl MidirEngine {
    /// Connects to an input port. Every message is stamped with `clock` as
    /// it arrives, so timestamps share a base with the session origin.
    pub fn connect(selector: &PortSelector, clock: Arc<dyn WallClock>) -> Result<Self> {
        let mut midi_in =
            MidiInput::new("gridsyncrs-in").map_err(|e| MidiError::Connection(e.to_string()))?;
        midi_in.ignore(Ignore::None);

        let ports = midi_in.ports();
        for port in &ports {
            if let Ok(name) = midi_in.port_name(port) {
                debug!("Available MIDI input: {}", name);
            }
        }

        let port = match selector {
            PortSelector::Name(name) => ports
                .iter()
                .find(|p| midi_in.port_name(p).unwrap_or_default().contains(name.as_str())),
            PortSelector::Index(index) => ports.get(*index),
        }
        .ok_or_else(|| MidiError::DeviceNotFound(format!("{:?}", selector)))?
        .clone();

        let port_name = midi_in
            .port_name(&port)
            .map_err(|e| MidiError::Connection(e.to_string()))?;
        info!("Connecting to MIDI input: {}", port_name);

        let (tx, rx) = unbounded();
        let connection = midi_in
            .connect(
                &port,
                "gridsyncrs-input",
                move |_stamp, bytes, _| {
                    let timestamp_ms = clock.now_ms();
                    if let Some(message) = MidiMessage::parse(bytes) {
                        let _ = tx.send(TimedMessage::new(timestamp_ms, message));
                    }
                },
                (),
            )
            .map_err(|e| MidiError::Connection(e.to_string()))?;

        Ok(MidirEngine {
            _connection: connection,
            rx,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiEngine for MidirEngine {
    fn recv(&mut self) -> Result<TimedMessage> {
        self.rx.recv().map_err(|e| MidiError::Recv(e.to_string()))
    }
}

/// Names of every MIDI input port, empty if the subsystem is unavailable.
pub fn list_input_devices() -> Vec<String> {
    let mut devices = Vec::new();

    if let Ok(midi_in) = MidiInput::new("gridsyncrs-list") {
        for port in midi_in.ports() {
            if let Ok(name) = midi_in.port_name(&port) {
                devices.push(name);
            }
        }
    }

    devices
}
