pub mod cli;
pub mod config;
pub mod console;
pub mod engine;
pub mod event_loop;
pub mod logging;
pub mod midi;
pub mod recorder;
pub mod timing;
pub mod ui;

pub use cli::{handle_device_list, validate_device, Args};
pub use config::{Settings, SettingsError, SettingsStore};
pub use engine::{Engine, SharedEngine};
pub use event_loop::{EngineMessage, EventLoop};
pub use recorder::{NoteOnset, OnsetHistory, OnsetRecord};
pub use timing::{map_timestamp, GridPosition, SessionTiming, TimingOrigin};
