//! Read-only snapshot for the home-screen widget.
//!
//! The widget never mutates anything. On each refresh it re-reads the
//! preferences and today's record from the shared container.

use crate::container::SharedContainer;
use crate::preferences::Preferences;
use crate::store::read_records;
use crate::units::from_canonical;
use crate::UnitMode;
use chrono::{DateTime, Local};
use serde::Serialize;

/// Everything the widget needs to render one entry
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WidgetEntry {
    pub date: DateTime<Local>,
    pub cups_consumed: f64,
    /// Goal in `unit`
    pub daily_goal: f64,
    pub unit: UnitMode,
}

impl WidgetEntry {
    /// Progress computed in the display unit, capped at 1.0
    pub fn progress(&self) -> f64 {
        if self.daily_goal <= 0.0 {
            return 0.0;
        }
        (from_canonical(self.cups_consumed, self.unit) / self.daily_goal).min(1.0)
    }

    /// Entry shown before any data is available
    pub fn placeholder(prefs: &Preferences, now: DateTime<Local>) -> Self {
        Self {
            date: now,
            cups_consumed: 0.0,
            daily_goal: prefs.daily_goal,
            unit: prefs.unit,
        }
    }
}

/// Read the current entry from the container.
///
/// Any failure to read today's record counts as nothing consumed.
pub fn read_snapshot(container: &SharedContainer, now: DateTime<Local>) -> WidgetEntry {
    let prefs = Preferences::read(&container.preferences_path());
    let today = now.date_naive();

    let cups_consumed = match read_records(&container.records_path()) {
        Ok(records) => records
            .iter()
            .filter(|r| r.normalized_date() == today)
            .max_by_key(|r| r.date())
            .map(|r| r.amount_cups())
            .unwrap_or(0.0),
        Err(e) => {
            tracing::warn!("Widget: failed to read today's intake: {}", e);
            0.0
        }
    };

    WidgetEntry {
        cups_consumed,
        ..WidgetEntry::placeholder(&prefs, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferencesState;
    use crate::signals::NoopRefresh;
    use crate::store::{JsonRecordStore, RecordStore};
    use crate::IntakeRecord;
    use chrono::{Duration, TimeZone};
    use std::rc::Rc;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 11, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_container_reads_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let container = SharedContainer::attach(temp_dir.path());

        let entry = read_snapshot(&container, noon());

        assert_eq!(entry.cups_consumed, 0.0);
        assert_eq!(entry.daily_goal, 8.0);
        assert_eq!(entry.unit, UnitMode::Cups);
        assert_eq!(entry.progress(), 0.0);
    }

    #[test]
    fn test_reads_todays_record_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let container = SharedContainer::open(temp_dir.path()).unwrap();

        let mut store = JsonRecordStore::open(container.records_path()).unwrap();
        store
            .insert(IntakeRecord::with_amount(noon() - Duration::days(1), 7.0))
            .unwrap();
        store
            .insert(IntakeRecord::with_amount(noon() - Duration::hours(2), 2.0))
            .unwrap();
        store.save().unwrap();

        let mut prefs = PreferencesState::load(&container, Rc::new(NoopRefresh));
        prefs.set_unit(UnitMode::Oz);

        let entry = read_snapshot(&container, noon());
        assert_eq!(entry.cups_consumed, 2.0);
        assert_eq!(entry.daily_goal, 64.0);
        assert_eq!(entry.unit, UnitMode::Oz);
        assert_eq!(entry.progress(), 0.25);
    }

    #[test]
    fn test_corrupt_records_count_as_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let container = SharedContainer::open(temp_dir.path()).unwrap();
        std::fs::write(container.records_path(), "garbage").unwrap();

        let entry = read_snapshot(&container, noon());
        assert_eq!(entry.cups_consumed, 0.0);
        // The widget must not move the file aside
        assert!(container.records_path().exists());
    }

    #[test]
    fn test_progress_capped() {
        let entry = WidgetEntry {
            date: noon(),
            cups_consumed: 10.0,
            daily_goal: 1900.0,
            unit: UnitMode::Ml,
        };
        assert_eq!(entry.progress(), 1.0);
    }
}
