use crate::midi::{MidiEngine, MidiError, MidiMessage, Result, TimedMessage};
use std::collections::VecDeque;

/// Replays a fixed script of timed messages, then reports end of input.
#[derive(Debug, Default)]
pub struct MockMidiEngine {
    script: VecDeque<TimedMessage>,
}

impl MockMidiEngine {
    pub fn new(script: impl IntoIterator<Item = TimedMessage>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Builds the script from `(timestamp_ms, raw bytes)` pairs; byte
    /// strings that do not parse are skipped.
    pub fn from_bytes(script: &[(f64, &[u8])]) -> Self {
        Self::new(script.iter().filter_map(|(timestamp_ms, bytes)| {
            MidiMessage::parse(bytes).map(|message| TimedMessage::new(*timestamp_ms, message))
        }))
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl MidiEngine for MockMidiEngine {
    fn recv(&mut self) -> Result<TimedMessage> {
        self.script
            .pop_front()
            .ok_or_else(|| MidiError::Recv("mock input exhausted".to_string()))
    }
}
