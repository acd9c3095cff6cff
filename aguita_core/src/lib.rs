#![forbid(unsafe_code)]

//! Core domain model and business logic for Aguita, a daily water intake tracker.
//!
//! This crate provides:
//! - Domain types (unit modes, color schemes, intake records, haptics)
//! - Unit conversion and stepping rules
//! - Shared container storage (preferences, daily records)
//! - The intake controller and the circular dial input
//! - Read-only widget snapshots and CSV export

pub mod types;
pub mod error;
pub mod units;
pub mod signals;
pub mod container;
pub mod config;
pub mod logging;
pub mod preferences;
pub mod store;
pub mod controller;
pub mod dial;
pub mod widget;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use container::SharedContainer;
pub use preferences::{Preferences, PreferencesState};
pub use store::{JsonRecordStore, MemoryRecordStore, RecordStore};
pub use controller::IntakeController;
pub use dial::{DialEvent, DialInputController, Point};
pub use signals::{Clock, HapticSink, SystemClock, WidgetRefresh};
pub use widget::{read_snapshot, WidgetEntry};
pub use export::write_history_csv;
