//! Shared container: the directory the host and widget readers share.
//!
//! Holds the preferences file, the record store file and the widget reload
//! marker. Writes go through a temp file and an atomic rename under an
//! exclusive lock; reads take a shared lock.

use crate::signals::MarkerFileRefresh;
use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Namespace identifier used when no explicit directory is configured
pub const DEFAULT_NAMESPACE: &str = "group.aguita.shared";

const PREFERENCES_FILE: &str = "preferences.json";
const RECORDS_FILE: &str = "records.json";
const RELOAD_MARKER_FILE: &str = "widget.reload";

/// Handle to a shared container directory
#[derive(Clone, Debug)]
pub struct SharedContainer {
    root: PathBuf,
}

impl SharedContainer {
    /// Open (creating if needed) a container and verify it is writable.
    ///
    /// Failure here is fatal for the host: preferences and records cannot
    /// be kept without it.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let unavailable = |reason: String| Error::ContainerUnavailable {
            path: root.clone(),
            reason,
        };

        std::fs::create_dir_all(&root).map_err(|e| unavailable(e.to_string()))?;

        // Probe with a throwaway file; it is removed on drop
        NamedTempFile::new_in(&root).map_err(|e| unavailable(format!("not writable: {}", e)))?;

        tracing::debug!("Opened shared container at {:?}", root);
        Ok(Self { root })
    }

    /// Open the container for `namespace` under the platform data directory
    pub fn for_namespace(namespace: &str) -> Result<Self> {
        let base = dirs::data_local_dir().ok_or_else(|| Error::ContainerUnavailable {
            path: PathBuf::from(namespace),
            reason: "no platform data directory".into(),
        })?;
        Self::open(base.join(namespace))
    }

    /// Attach to an existing container without checking writability.
    ///
    /// For read-only consumers such as the widget snapshot.
    pub fn attach(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.root.join(PREFERENCES_FILE)
    }

    pub fn records_path(&self) -> PathBuf {
        self.root.join(RECORDS_FILE)
    }

    pub fn reload_marker_path(&self) -> PathBuf {
        self.root.join(RELOAD_MARKER_FILE)
    }

    /// Widget refresh signal that stamps this container's reload marker
    pub fn refresh_signal(&self) -> MarkerFileRefresh {
        MarkerFileRefresh::new(self.reload_marker_path())
    }
}

/// Read a JSON document under a shared lock.
///
/// Returns `Ok(None)` when the file does not exist.
pub(crate) fn read_json_locked<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    // Raw bytes: undecodable text must surface as a parse error
    let mut contents = Vec::new();
    let read = std::io::BufReader::new(&file).read_to_end(&mut contents);
    let _ = file.unlock();
    read?;

    if contents.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value = serde_json::from_slice(&contents)?;
    Ok(Some(value))
}

/// Atomically replace `path` with the JSON encoding of `value`.
///
/// 1. Write to a temp file in the same directory
/// 2. Sync to disk
/// 3. Rename over the original
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "path missing parent")
    })?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Move a file that failed to parse out of the way, keeping it for recovery
pub(crate) fn quarantine(path: &Path) -> Result<PathBuf> {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    let target = PathBuf::from(name);
    std::fs::rename(path, &target)?;
    Ok(target)
}
