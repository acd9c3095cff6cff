//! Collaborators the core talks to but does not implement.
//!
//! - [`Clock`]: source of "now", so day boundaries can be driven in tests
//! - [`WidgetRefresh`]: wake-up broadcast to snapshot consumers
//! - [`HapticSink`]: receiver of discrete feedback events

use crate::Haptic;
use chrono::{DateTime, Local};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

/// Source of the current local time
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Local>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

/// Fire-and-forget "reload all timelines" broadcast.
///
/// No payload is pushed; consumers re-read the shared container.
pub trait WidgetRefresh {
    fn reload_all_timelines(&self);
}

/// Refresh signal that goes nowhere
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRefresh;

impl WidgetRefresh for NoopRefresh {
    fn reload_all_timelines(&self) {}
}

/// Refresh signal that stamps a marker file consumers can watch
#[derive(Clone, Debug)]
pub struct MarkerFileRefresh {
    path: PathBuf,
}

impl MarkerFileRefresh {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl WidgetRefresh for MarkerFileRefresh {
    fn reload_all_timelines(&self) {
        let stamp = Local::now().to_rfc3339();
        match std::fs::write(&self.path, stamp) {
            Ok(()) => tracing::debug!("Stamped widget reload marker {:?}", self.path),
            Err(e) => tracing::warn!(
                "Failed to stamp widget reload marker {:?}: {}",
                self.path,
                e
            ),
        }
    }
}

/// Receiver of haptic feedback events
pub trait HapticSink {
    /// Warm up ahead of a burst of events (start of a dial drag)
    fn prepare(&mut self) {}

    fn emit(&mut self, haptic: Haptic);
}

/// Sink that drops every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHaptics;

impl HapticSink for NoopHaptics {
    fn emit(&mut self, _haptic: Haptic) {}
}

/// Sink that records events, for hosts that replay them later and for tests
#[derive(Clone, Debug, Default)]
pub struct RecordingHaptics {
    events: Rc<RefCell<Vec<Haptic>>>,
    prepared: Rc<Cell<u32>>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything received so far
    pub fn take(&self) -> Vec<Haptic> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// How many times `prepare` was called on any clone
    pub fn prepared_count(&self) -> u32 {
        self.prepared.get()
    }
}

impl HapticSink for RecordingHaptics {
    fn prepare(&mut self) {
        self.prepared.set(self.prepared.get() + 1);
    }

    fn emit(&mut self, haptic: Haptic) {
        self.events.borrow_mut().push(haptic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_advances() {
        let start = Local.with_ymd_and_hms(2025, 11, 15, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(chrono::Duration::days(1));
        assert_eq!(clock.now().date_naive(), start.date_naive().succ_opt().unwrap());
    }

    #[test]
    fn test_marker_file_refresh_writes_stamp() {
        let temp_dir = tempfile::tempdir().unwrap();
        let marker = temp_dir.path().join("widget.reload");

        MarkerFileRefresh::new(&marker).reload_all_timelines();

        let contents = std::fs::read_to_string(&marker).unwrap();
        assert!(!contents.is_empty());
    }

    #[test]
    fn test_recording_haptics_shares_buffer() {
        let haptics = RecordingHaptics::new();
        let mut handle = haptics.clone();
        handle.prepare();
        handle.emit(Haptic::SnapTick);

        assert_eq!(haptics.prepared_count(), 1);
        assert_eq!(haptics.take(), vec![Haptic::SnapTick]);
        assert!(haptics.take().is_empty());
    }
}
