// event_loop.rs

use crate::config::Settings;
use crate::engine::SharedEngine;
use crate::midi::TimedMessage;
use crossbeam::channel::{never, select, tick, Receiver};
use log::{debug, error, info, warn};
use std::time::Duration;

/// How often the metronome track is brought up to date
const METRONOME_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    Midi(TimedMessage),
    SettingsChanged(Settings),
    Reset,
}

/// Single writer for the shared engine.
///
/// Input messages and settings changes are applied strictly in the order
/// they are received. The loop ends once every `EngineMessage` sender has
/// been dropped.
pub struct EventLoop {
    engine: SharedEngine,
    message_rx: Receiver<EngineMessage>,
    settings_rx: Option<Receiver<Settings>>,
}

impl EventLoop {
    pub fn new(
        engine: SharedEngine,
        message_rx: Receiver<EngineMessage>,
        settings_rx: Option<Receiver<Settings>>,
    ) -> Self {
        EventLoop {
            engine,
            message_rx,
            settings_rx,
        }
    }

    pub fn run(&mut self) {
        info!("Event loop started");
        let mut settings_rx = self.settings_rx.take().unwrap_or_else(never);
        let metronome = tick(METRONOME_POLL);

        loop {
            let mut settings_closed = false;
            select! {
                recv(self.message_rx) -> msg => match msg {
                    Ok(message) => self.dispatch(message),
                    Err(_) => {
                        info!("Engine message channel closed, stopping event loop");
                        break;
                    }
                },
                recv(settings_rx) -> settings => match settings {
                    Ok(settings) => self.dispatch(EngineMessage::SettingsChanged(settings)),
                    Err(_) => {
                        debug!("Settings channel closed");
                        settings_closed = true;
                    }
                },
                recv(metronome) -> _ => self.advance_metronome(),
            }
            if settings_closed {
                settings_rx = never();
            }
        }
    }

    fn dispatch(&self, message: EngineMessage) {
        let Ok(mut engine) = self.engine.lock() else {
            error!("Engine lock poisoned, dropping {:?}", message);
            return;
        };

        match message {
            EngineMessage::Midi(msg) => {
                if let Some(record) = engine.handle_message(&msg) {
                    let position = &record.position;
                    info!(
                        "Onset note={} beat={:.3} nearest_beat={} ({:+.1} ms) division={} ({:+.1} ms) pulses={}",
                        record.note,
                        position.beat_count,
                        position.nearest_beat,
                        position.nearest_beat_deviation_seconds * 1000.0,
                        position.nearest_division,
                        position.nearest_division_deviation_seconds * 1000.0,
                        record.pulse_count_at_onset
                    );
                }
            }
            EngineMessage::SettingsChanged(settings) => match engine.apply_settings(settings) {
                Ok(()) => info!("Settings applied: {:?}", engine.settings()),
                Err(e) => warn!("Rejected settings change: {}", e),
            },
            EngineMessage::Reset => engine.reset(),
        }
    }

    fn advance_metronome(&self) {
        if let Ok(mut engine) = self.engine.lock() {
            let crossed = engine.advance_metronome();
            if crossed > 0 {
                let beats_per_measure = engine.settings().beats_per_measure;
                debug!(
                    "Metronome beat {} ({:?} in measure)",
                    engine.metronome().count(),
                    engine.metronome().last_beat_in_measure(beats_per_measure)
                );
            }
        }
    }
}
