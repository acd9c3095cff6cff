//! Per-day intake record storage.
//!
//! [`RecordStore`] is the query contract the controller relies on.
//! [`JsonRecordStore`] keeps every record in a single JSON document inside
//! the shared container; [`MemoryRecordStore`] keeps them in process only.

use crate::container::{quarantine, read_json_locked, write_json_atomic};
use crate::{Error, IntakeRecord, Result};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Durable keyed storage of one intake record per calendar day
pub trait RecordStore {
    /// Newest record whose normalized date is `day`
    fn find_record(&self, day: NaiveDate) -> Result<Option<IntakeRecord>>;

    /// Add a new record. A day that already has a record is rejected.
    fn insert(&mut self, record: IntakeRecord) -> Result<()>;

    /// Replace the stored copy of `record` (matched by id), inserting it if
    /// it is not present yet
    fn update(&mut self, record: &IntakeRecord) -> Result<()>;

    /// Flush pending changes to durable storage
    fn save(&mut self) -> Result<()>;

    /// Records created at or after `since`, newest first
    fn query(&self, since: DateTime<Local>) -> Result<Vec<IntakeRecord>>;
}

/// Shared bookkeeping for both stores
#[derive(Debug, Default, Serialize, Deserialize)]
struct RecordSet {
    records: Vec<IntakeRecord>,
}

impl RecordSet {
    fn find(&self, day: NaiveDate) -> Option<&IntakeRecord> {
        self.records
            .iter()
            .filter(|r| r.normalized_date() == day)
            .max_by_key(|r| r.date())
    }

    fn insert(&mut self, record: IntakeRecord) -> Result<()> {
        let day = record.normalized_date();
        if self.find(day).is_some() {
            return Err(Error::DuplicateDay(day));
        }
        self.records.push(record);
        Ok(())
    }

    fn update(&mut self, record: &IntakeRecord) -> Result<()> {
        match self.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => self.insert(record.clone()),
        }
    }

    fn since(&self, since: DateTime<Local>) -> Vec<IntakeRecord> {
        let mut found: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.date() >= since)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date().cmp(&a.date()));
        found
    }
}

/// Record store backed by a JSON file
pub struct JsonRecordStore {
    path: PathBuf,
    set: RecordSet,
    dirty: bool,
}

impl JsonRecordStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts an empty store. A file that cannot be parsed
    /// is moved aside to `<name>.corrupt` and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let set = match read_json_locked::<RecordSet>(&path) {
            Ok(Some(set)) => {
                tracing::debug!("Loaded {} records from {:?}", set.records.len(), path);
                set
            }
            Ok(None) => {
                tracing::info!("No record store at {:?}, starting empty", path);
                RecordSet::default()
            }
            Err(Error::Json(e)) => {
                let moved = quarantine(&path)?;
                tracing::warn!(
                    "Failed to parse record store {:?}: {}. Moved it to {:?}.",
                    path,
                    e,
                    moved
                );
                RecordSet::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            set,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.set.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.records.is_empty()
    }
}

impl RecordStore for JsonRecordStore {
    fn find_record(&self, day: NaiveDate) -> Result<Option<IntakeRecord>> {
        Ok(self.set.find(day).cloned())
    }

    fn insert(&mut self, record: IntakeRecord) -> Result<()> {
        self.set.insert(record)?;
        self.dirty = true;
        Ok(())
    }

    fn update(&mut self, record: &IntakeRecord) -> Result<()> {
        self.set.update(record)?;
        self.dirty = true;
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        write_json_atomic(&self.path, &self.set)?;
        self.dirty = false;
        tracing::debug!("Saved {} records to {:?}", self.set.records.len(), self.path);
        Ok(())
    }

    fn query(&self, since: DateTime<Local>) -> Result<Vec<IntakeRecord>> {
        Ok(self.set.since(since))
    }
}

/// Read every record from a store file without taking ownership of it.
///
/// For read-only consumers: a missing file is empty, and a corrupt file is
/// reported as an error rather than moved aside.
pub fn read_records(path: &Path) -> Result<Vec<IntakeRecord>> {
    Ok(read_json_locked::<RecordSet>(path)?
        .map(|set| set.records)
        .unwrap_or_default())
}

/// Record store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    set: RecordSet,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = IntakeRecord>) -> Self {
        Self {
            set: RecordSet {
                records: records.into_iter().collect(),
            },
        }
    }
}

impl RecordStore for MemoryRecordStore {
    fn find_record(&self, day: NaiveDate) -> Result<Option<IntakeRecord>> {
        Ok(self.set.find(day).cloned())
    }

    fn insert(&mut self, record: IntakeRecord) -> Result<()> {
        self.set.insert(record)
    }

    fn update(&mut self, record: &IntakeRecord) -> Result<()> {
        self.set.update(record)
    }

    fn save(&mut self) -> Result<()> {
        Ok(())
    }

    fn query(&self, since: DateTime<Local>) -> Result<Vec<IntakeRecord>> {
        Ok(self.set.since(since))
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn find_record(&self, day: NaiveDate) -> Result<Option<IntakeRecord>> {
        (**self).find_record(day)
    }

    fn insert(&mut self, record: IntakeRecord) -> Result<()> {
        (**self).insert(record)
    }

    fn update(&mut self, record: &IntakeRecord) -> Result<()> {
        (**self).update(record)
    }

    fn save(&mut self) -> Result<()> {
        (**self).save()
    }

    fn query(&self, since: DateTime<Local>) -> Result<Vec<IntakeRecord>> {
        (**self).query(since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_and_find_by_day() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonRecordStore::open(temp_dir.path().join("records.json")).unwrap();

        let record = IntakeRecord::with_amount(noon(2025, 11, 15), 3.0);
        store.insert(record.clone()).unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
        assert_eq!(store.find_record(day).unwrap(), Some(record));
        assert!(store
            .find_record(day.succ_opt().unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_second_record_same_day_rejected() {
        let mut store = MemoryRecordStore::new();
        store.insert(IntakeRecord::new(noon(2025, 11, 15))).unwrap();

        let later = noon(2025, 11, 15) + Duration::hours(3);
        let result = store.insert(IntakeRecord::new(later));
        assert!(matches!(result, Err(Error::DuplicateDay(_))));
    }

    #[test]
    fn test_save_and_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.json");

        let mut record = IntakeRecord::new(noon(2025, 11, 14));
        {
            let mut store = JsonRecordStore::open(&path).unwrap();
            store.insert(record.clone()).unwrap();
            record.set_amount_cups(2.75);
            store.update(&record).unwrap();
            store.save().unwrap();
        }

        let store = JsonRecordStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        let loaded = store.find_record(record.normalized_date()).unwrap().unwrap();
        assert_eq!(loaded.id(), record.id());
        assert_eq!(loaded.amount_cups(), 2.75);
    }

    #[test]
    fn test_query_newest_first_with_lower_bound() {
        let mut store = MemoryRecordStore::new();
        for day in [10, 12, 14, 13] {
            store.insert(IntakeRecord::new(noon(2025, 11, day))).unwrap();
        }

        let found = store.query(noon(2025, 11, 12)).unwrap();
        let days: Vec<u32> = found
            .iter()
            .map(|r| chrono::Datelike::day(&r.normalized_date()))
            .collect();
        assert_eq!(days, vec![14, 13, 12]);
    }

    #[test]
    fn test_corrupt_file_moved_aside() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.json");
        std::fs::write(&path, "{ invalid json }}}").unwrap();

        let store = JsonRecordStore::open(&path).unwrap();

        assert!(store.is_empty());
        assert!(!path.exists());
        assert!(temp_dir.path().join("records.json.corrupt").exists());
    }

    #[test]
    fn test_undecodable_bytes_moved_aside() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

        let store = JsonRecordStore::open(&path).unwrap();

        assert!(store.is_empty());
        let moved = std::fs::read(temp_dir.path().join("records.json.corrupt")).unwrap();
        assert_eq!(moved, vec![0xff, 0xfe, 0x00, 0x7b]);
    }

    #[test]
    fn test_read_records_does_not_touch_corrupt_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(read_records(&path).is_err());
        assert!(path.exists());
        assert!(read_records(&temp_dir.path().join("missing.json"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_save_without_changes_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.json");

        let mut store = JsonRecordStore::open(&path).unwrap();
        store.save().unwrap();

        assert!(!path.exists());
    }
}
