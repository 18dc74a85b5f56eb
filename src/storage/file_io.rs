//! JSON store files: atomic writes and an advisory lock
//!
//! A store file `x.json` has two siblings: `x.json.tmp`, written then
//! renamed over the store, and `x.json.lock`, held exclusively by whoever is
//! doing a read-modify-write so separate processes take turns.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::TeamsheetError;

/// `path` with `suffix` appended to its file name
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Temp file a store is written to before the rename
pub fn temp_path(path: &Path) -> PathBuf {
    sibling(path, ".tmp")
}

/// Lock file guarding a store
pub fn lock_path(path: &Path) -> PathBuf {
    sibling(path, ".lock")
}

fn ensure_parent(path: &Path) -> Result<(), TeamsheetError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).map_err(|e| {
            TeamsheetError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        }),
        _ => Ok(()),
    }
}

/// Exclusive advisory lock on a store, released on drop
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Block until the lock for the store at `store_path` is held
    pub fn acquire(store_path: &Path) -> Result<Self, TeamsheetError> {
        let path = lock_path(store_path);
        ensure_parent(&path)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                TeamsheetError::Storage(format!("Failed to open {}: {}", path.display(), e))
            })?;

        file.lock_exclusive().map_err(|e| {
            TeamsheetError::Storage(format!("Failed to lock {}: {}", path.display(), e))
        })?;

        debug!(lock = %path.display(), "Store lock acquired");
        Ok(Self { file, path })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs2::FileExt::unlock(&self.file) {
            debug!(lock = %self.path.display(), error = %e, "Failed to release store lock");
        }
    }
}

/// Read a store, returning the default value when it doesn't exist yet
pub fn read_json<T, P>(path: P) -> Result<T, TeamsheetError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| TeamsheetError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| TeamsheetError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Replace a store with `data` via its temp file and a rename
///
/// On error the store is left as it was.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), TeamsheetError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    ensure_parent(path)?;

    let temp = temp_path(path);
    let result = write_and_sync(&temp, data).and_then(|()| {
        fs::rename(&temp, path).map_err(|e| {
            TeamsheetError::Storage(format!("Failed to replace {}: {}", path.display(), e))
        })
    });

    if result.is_err() && temp.is_file() {
        let _ = fs::remove_file(&temp);
    }
    result
}

fn write_and_sync<T: Serialize>(temp: &Path, data: &T) -> Result<(), TeamsheetError> {
    let file = File::create(temp).map_err(|e| {
        TeamsheetError::Storage(format!("Failed to create {}: {}", temp.display(), e))
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| TeamsheetError::Storage(format!("Failed to serialize data: {}", e)))?;
    writer
        .flush()
        .map_err(|e| TeamsheetError::Storage(format!("Failed to flush data: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| TeamsheetError::Storage(format!("Failed to sync data: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Roster {
        team: String,
        players: Vec<String>,
    }

    fn sample() -> Roster {
        Roster {
            team: "U12 Girls".to_string(),
            players: vec!["a1".to_string(), "a2".to_string()],
        }
    }

    #[test]
    fn test_sibling_paths() {
        let path = Path::new("/data/confirmations.json");
        assert_eq!(temp_path(path), Path::new("/data/confirmations.json.tmp"));
        assert_eq!(lock_path(path), Path::new("/data/confirmations.json.lock"));
    }

    #[test]
    fn test_read_missing_store_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let data: Roster = read_json(temp_dir.path().join("roster.json")).unwrap();
        assert_eq!(data, Roster::default());
    }

    #[test]
    fn test_write_then_read_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("roster.json");

        write_json_atomic(&path, &sample()).unwrap();

        assert_eq!(read_json::<Roster, _>(&path).unwrap(), sample());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_failed_write_keeps_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roster.json");
        write_json_atomic(&path, &sample()).unwrap();

        // A directory in the temp file's place makes the write fail
        fs::create_dir(temp_path(&path)).unwrap();
        let err = write_json_atomic(&path, &Roster::default()).unwrap_err();

        assert!(matches!(err, TeamsheetError::Storage(_)));
        assert_eq!(read_json::<Roster, _>(&path).unwrap(), sample());
    }

    #[test]
    fn test_read_invalid_json_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roster.json");
        fs::write(&path, "not json at all").unwrap();

        let err = read_json::<Roster, _>(&path).unwrap_err();
        assert!(matches!(err, TeamsheetError::Storage(_)));
    }

    #[test]
    fn test_lock_is_exclusive_until_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roster.json");

        let held = StoreLock::acquire(&path).unwrap();

        let (tx, rx) = mpsc::channel();
        let waiter_path = path.clone();
        let waiter = std::thread::spawn(move || {
            let _lock = StoreLock::acquire(&waiter_path).unwrap();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(held);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        waiter.join().unwrap();
    }
}
