use crate::event_loop::EngineMessage;
use crate::midi::MidiEngine;
use crossbeam::channel::Sender;
use log::{error, info, trace};
use std::thread;

/// Pumps messages from `engine` into the event loop until either side
/// goes away. Dropping the sender on exit lets the event loop wind down.
pub fn run_midi_input<T>(mut engine: T, tx: Sender<EngineMessage>) -> thread::JoinHandle<()>
where
    T: MidiEngine + 'static,
{
    thread::spawn(move || {
        info!("MIDI input thread started");
        loop {
            match engine.recv() {
                Ok(msg) => {
                    trace!("Received MIDI message: {:?}", msg);
                    if tx.send(EngineMessage::Midi(msg)).is_err() {
                        error!("Failed to forward MIDI message - event loop dropped");
                        break;
                    }
                }
                Err(e) => {
                    info!("MIDI input ended: {}", e);
                    break;
                }
            }
        }
    })
}
