//! Line-oriented settings console on stdin
//!
//! `set <key> <value>` goes through the [`SettingsStore`], which persists
//! and publishes the change; `reset` restarts the session in place.

use crate::config::{SettingsStore, SETTING_KEYS};
use crate::event_loop::EngineMessage;
use crossbeam::channel::Sender;
use log::{info, warn};
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Set { key: String, value: f64 },
    Reset,
    Show,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command \"{0}\" (try set, reset, show, quit)")]
    Unknown(String),
    #[error("usage: set <key> <value>, keys: {}", SETTING_KEYS.join(", "))]
    MissingArgument,
    #[error("\"{0}\" is not a number")]
    NotANumber(String),
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, CommandError> {
    let mut words = line.split_whitespace();
    let command = words.next().ok_or(CommandError::Empty)?;

    match command.to_ascii_lowercase().as_str() {
        "set" => {
            let key = words.next().ok_or(CommandError::MissingArgument)?;
            let raw = words.next().ok_or(CommandError::MissingArgument)?;
            let value = raw
                .parse::<f64>()
                .map_err(|_| CommandError::NotANumber(raw.to_string()))?;
            Ok(ConsoleCommand::Set {
                key: key.to_string(),
                value,
            })
        }
        "reset" | "r" => Ok(ConsoleCommand::Reset),
        "show" => Ok(ConsoleCommand::Show),
        "quit" | "q" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Reads commands until stdin closes or `quit`; clears `running` on exit.
pub fn run_console(
    mut store: SettingsStore,
    message_tx: Sender<EngineMessage>,
    running: Arc<AtomicBool>,
) {
    info!("Console started");
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match parse_command(&line) {
            Ok(ConsoleCommand::Set { key, value }) => match store.update_setting(&key, value) {
                Ok(()) => println!("{} = {}", key, value),
                Err(e) => {
                    warn!("Setting update rejected: {}", e);
                    eprintln!("{}", e);
                }
            },
            Ok(ConsoleCommand::Reset) => {
                if message_tx.send(EngineMessage::Reset).is_err() {
                    break;
                }
            }
            Ok(ConsoleCommand::Show) => println!("{:#?}", store.settings()),
            Ok(ConsoleCommand::Quit) => break,
            Err(CommandError::Empty) => {}
            Err(e) => eprintln!("{}", e),
        }
    }

    info!("Console closed");
    running.store(false, Ordering::SeqCst);
}
