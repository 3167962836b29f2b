//! Musical-time mapping for a performance session
//!
//! This module holds the arithmetic half of the monitor:
//! - [`TimingOrigin`] anchors wall-clock milliseconds to musical time zero
//! - [`map_timestamp`] turns a timestamp into a [`GridPosition`]
//! - [`PulseCounter`] tallies 24 PPQ clock pulses since the last start
//! - [`MetronomeTrack`] follows the conceptual click on the reference clock
//!
//! Nothing in here performs I/O; clocks are injected through the
//! [`WallClock`] and [`ReferenceClock`] traits.
mod grid;
mod metronome;
mod origin;
mod pulse;

pub use grid::{map_timestamp, Accuracy, GridPosition, SessionTiming};
pub use metronome::MetronomeTrack;
pub use origin::{ManualClock, MonotonicClock, ReferenceClock, TimingOrigin, WallClock};
pub use pulse::{PulseCounter, TransportMessage, TransportState};
