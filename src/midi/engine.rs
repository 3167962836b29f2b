use crate::recorder::NoteOnset;
use crate::timing::TransportMessage;
use thiserror::Error;

/// Error type for MIDI input operations
#[derive(Debug, Error)]
pub enum MidiError {
    /// Failed to open the MIDI subsystem or connect to a port
    #[error("MIDI connection error: {0}")]
    Connection(String),
    /// No input port matched the requested name or index
    #[error("MIDI input device not found: {0}")]
    DeviceNotFound(String),
    /// The input stream ended or failed
    #[error("MIDI receive error: {0}")]
    Recv(String),
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const TIMING_CLOCK: u8 = 0xF8;
const START: u8 = 0xFA;
const CONTINUE: u8 = 0xFB;
const STOP: u8 = 0xFC;

/// A MIDI message as seen by the monitor
#[derive(Debug, Clone, PartialEq)]
pub enum MidiMessage {
    /// Note On; velocity 0 is kept as-is and simply never qualifies as an onset
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Timing clock pulse, 24 per quarter note
    Clock,
    Start,
    Stop,
    Continue,
    /// Anything else, kept raw
    Other(Vec<u8>),
}

impl MidiMessage {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let status = *data.first()?;

        match status {
            TIMING_CLOCK => return Some(MidiMessage::Clock),
            START => return Some(MidiMessage::Start),
            CONTINUE => return Some(MidiMessage::Continue),
            STOP => return Some(MidiMessage::Stop),
            _ => {}
        }

        let channel = status & 0x0F;
        match status & 0xF0 {
            NOTE_ON if data.len() >= 3 => Some(MidiMessage::NoteOn {
                channel,
                note: data[1] & 0x7F,
                velocity: data[2] & 0x7F,
            }),
            NOTE_OFF if data.len() >= 3 => Some(MidiMessage::NoteOff {
                channel,
                note: data[1] & 0x7F,
                velocity: data[2] & 0x7F,
            }),
            _ => Some(MidiMessage::Other(data.to_vec())),
        }
    }

    pub fn transport(&self) -> Option<TransportMessage> {
        match self {
            MidiMessage::Clock => Some(TransportMessage::Pulse),
            MidiMessage::Start => Some(TransportMessage::Start),
            MidiMessage::Stop => Some(TransportMessage::Stop),
            MidiMessage::Continue => Some(TransportMessage::Continue),
            _ => None,
        }
    }
}

/// A received message stamped with the wall clock on arrival
#[derive(Debug, Clone, PartialEq)]
pub struct TimedMessage {
    pub timestamp_ms: f64,
    pub message: MidiMessage,
}

impl TimedMessage {
    pub fn new(timestamp_ms: f64, message: MidiMessage) -> Self {
        Self {
            timestamp_ms,
            message,
        }
    }

    /// Only Note On with a positive velocity counts as an onset.
    pub fn onset(&self) -> Option<NoteOnset> {
        match self.message {
            MidiMessage::NoteOn { note, velocity, .. } if velocity > 0 => Some(NoteOnset {
                timestamp_ms: self.timestamp_ms,
                note,
                velocity,
            }),
            _ => None,
        }
    }
}

/// Source of timed MIDI input
pub trait MidiEngine: Send {
    /// Blocks until the next message arrives
    fn recv(&mut self) -> Result<TimedMessage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_realtime_bytes() {
        assert_eq!(MidiMessage::parse(&[0xF8]), Some(MidiMessage::Clock));
        assert_eq!(MidiMessage::parse(&[0xFA]), Some(MidiMessage::Start));
        assert_eq!(MidiMessage::parse(&[0xFB]), Some(MidiMessage::Continue));
        assert_eq!(MidiMessage::parse(&[0xFC]), Some(MidiMessage::Stop));
    }

    #[test]
    fn test_parse_note_messages() {
        assert_eq!(
            MidiMessage::parse(&[0x99, 38, 100]),
            Some(MidiMessage::NoteOn {
                channel: 9,
                note: 38,
                velocity: 100
            })
        );
        assert_eq!(
            MidiMessage::parse(&[0x89, 38, 0]),
            Some(MidiMessage::NoteOff {
                channel: 9,
                note: 38,
                velocity: 0
            })
        );
    }

    #[test]
    fn test_parse_short_and_empty() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(
            MidiMessage::parse(&[0x90, 38]),
            Some(MidiMessage::Other(vec![0x90, 38]))
        );
    }

    #[test]
    fn test_onset_requires_positive_velocity() {
        let hit = TimedMessage::new(10.0, MidiMessage::parse(&[0x90, 36, 90]).unwrap());
        let silent = TimedMessage::new(11.0, MidiMessage::parse(&[0x90, 36, 0]).unwrap());
        let off = TimedMessage::new(12.0, MidiMessage::parse(&[0x80, 36, 64]).unwrap());

        assert_eq!(
            hit.onset(),
            Some(NoteOnset {
                timestamp_ms: 10.0,
                note: 36,
                velocity: 90
            })
        );
        assert_eq!(silent.onset(), None);
        assert_eq!(off.onset(), None);
    }

    #[test]
    fn test_transport_mapping() {
        assert_eq!(MidiMessage::Clock.transport(), Some(TransportMessage::Pulse));
        assert_eq!(
            MidiMessage::NoteOn {
                channel: 0,
                note: 1,
                velocity: 1
            }
            .transport(),
            None
        );
    }
}
