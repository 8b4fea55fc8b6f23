//! Roast session management
//!
//! This module provides the `RoastRecorder` abstraction that manages:
//! - The linear roast stage state machine
//! - Elapsed-time bookkeeping on an injectable clock
//! - Periodic and manual temperature logging into a bounded series
//! - Session persistence and restore
//! - Summary derivation when the roast ends

mod config;
mod recorder;
mod stage;
mod summary;

pub use config::{SessionConfig, TemperatureUnit};
pub use recorder::{RoastRecorder, RoastSnapshot, SavedSession, DEFAULT_POLL_INTERVAL};
pub use stage::RoastStage;
pub use summary::RoastSummary;
