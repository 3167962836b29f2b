use crate::config::PULSES_PER_QUARTER_NOTE;
use log::{debug, info};

/// Transport-control messages from the hardware clock stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMessage {
    /// One of 24 timing pulses per quarter note
    Pulse,
    Start,
    Stop,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Running,
}

/// Tally of timing-clock pulses since the last transport start.
///
/// Independent of wall-clock time. Pulses that arrive while stopped are
/// ignored, so a stop freezes the count until the next continue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PulseCounter {
    count: u64,
    state: TransportState,
}

impl PulseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, msg: TransportMessage) {
        match msg {
            TransportMessage::Start => {
                self.state = TransportState::Running;
                self.count = 0;
                info!("Transport started, pulse count cleared");
            }
            TransportMessage::Continue => {
                self.state = TransportState::Running;
                info!("Transport continued at pulse {}", self.count);
            }
            TransportMessage::Stop => {
                self.state = TransportState::Stopped;
                info!("Transport stopped at pulse {}", self.count);
            }
            TransportMessage::Pulse => {
                if self.state == TransportState::Running {
                    self.count += 1;
                    if self.count % PULSES_PER_QUARTER_NOTE == 0 {
                        debug!("Pulse count {} ({} beats)", self.count, self.beats());
                    }
                }
            }
        }
    }

    /// Zeroes the tally without touching the transport state.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TransportState::Running
    }

    /// Whole quarter notes counted so far.
    pub fn beats(&self) -> u64 {
        self.count / PULSES_PER_QUARTER_NOTE
    }
}
