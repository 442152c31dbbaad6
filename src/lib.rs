#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`EventTable`**: Offset-sorted, bounded list of timed color events decoded from a payload
//! - **`decode`**: Turns a JSON timeline payload into an `EventTable`
//! - **`PlaybackScheduler`**: Maps elapsed playback time to the active event, looping the table
//! - **`Pattern`**: The fifteen color patterns selected by a `ColorCode`
//! - **`PatternEngine`**: Renders color codes to an LED, keeping shared pattern state
//! - **`Player`**: Control-loop driver that loads, plays and switches timelines
//! - **`ControlSignals`**: Debounced input flags raised from interrupt handlers
//! - **`RgbLed`**, **`TimeSource`**, **`TimelineStore`**, **`TimelineSource`**: Traits to
//!   implement for your hardware, clock, storage and server
//!
//! The library uses `Srgb<f32>` (0.0-1.0 range) for LED output. All built-in
//! patterns use fully-on or fully-off channels.

extern crate alloc;

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

pub mod colors;
pub mod config;
pub mod event;
pub mod loader;
pub mod pattern;
pub mod player;
pub mod scheduler;
pub mod sequence;
pub mod signal;
pub mod time;

pub use colors::{BLUE, COLOR_OFF, CYAN, GREEN, MAGENTA, RED, WHITE, YELLOW};
pub use config::{ConfigError, PatternConfig, PlayerConfig};
pub use event::{ColorCode, Event, EventTable, TIMELINE_CAPACITY};
pub use loader::{DecodeError, LoadError, Slot, TimelineSource, TimelineStore, decode, load_slot};
pub use pattern::{FadeDirection, Pattern, PatternEngine, PatternState, RgbLed};
pub use player::{MAX_SYNCED_SLOTS, Player, PlayerStatus};
pub use scheduler::{PlaybackCursor, PlaybackScheduler, SchedulerState};
pub use sequence::{LOADING_STEP_MS, Sequence, SequenceBuilder, SequenceError, SequenceStep, loading_sequence};
pub use signal::{ControlInput, ControlSignals, PendingSignals};
pub use time::{MillisDuration, MillisInstant, TimeDuration, TimeInstant, TimeSource};
