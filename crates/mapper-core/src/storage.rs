// ── Durable key/value storage ──
//
// String keys to string values, the same contract a browser's local storage
// offers. The session owns the auth keys and the UI store owns the
// presentation keys; nothing else writes here.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::CoreError;

pub const AUTH_TOKEN: &str = "authToken";
pub const REFRESH_TOKEN: &str = "refreshToken";
pub const USER: &str = "user";
pub const THEME: &str = "theme";
pub const SIDEBAR_COLLAPSED: &str = "sidebarCollapsed";

/// Durable storage shared by the session and UI stores.
///
/// Keys are independent. Writes are whole-value snapshots per key;
/// concurrent writers of the same key race and the last one wins.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// ── In-memory ───────────────────────────────────────────────────────

/// Process-local storage. Used by tests and one-shot tooling.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with initial entries.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}

// ── File-backed ─────────────────────────────────────────────────────

/// JSON object on disk, shared by every process using the same profile.
///
/// Each mutation re-reads the file, applies its single key change and
/// atomically replaces the file, so concurrent processes only race on the
/// key they both touch. On unix the file is readable by its owner only,
/// since it holds bearer and refresh tokens.
///
/// A write failure is logged and the in-memory value is kept, so the
/// current process still sees its own writes.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// A missing file starts empty. A file that exists but cannot be read
    /// or parsed is an error so it is never silently overwritten.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let entries = read_entries(&path).map_err(|message| CoreError::Storage {
            path: path.clone(),
            message,
        })?;
        debug!(path = %path.display(), keys = entries.len(), "storage opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge one key change into the current file contents and write back.
    ///
    /// The cached map is replaced by the merged result, picking up keys
    /// other processes wrote since the last mutation.
    fn update(&self, apply: impl Fn(&mut BTreeMap<String, String>)) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut merged = match read_entries(&self.path) {
            Ok(on_disk) => on_disk,
            Err(message) => {
                warn!(
                    path = %self.path.display(),
                    error = %message,
                    "storage unreadable, writing cached entries"
                );
                entries.clone()
            }
        };
        apply(&mut merged);
        if let Err(e) = write_entries(&self.path, &merged) {
            warn!(path = %self.path.display(), error = %e, "failed to persist storage");
            apply(&mut entries);
            return;
        }
        *entries = merged;
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, String> {
    match std::fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(raw) => serde_json::from_str(&raw).map_err(|e| format!("invalid storage file: {e}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.to_string()),
    }
}

/// Write to a sibling temp file, then rename it over `path`.
fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, entries).map_err(std::io::Error::other)?;
    file.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        });
    }

    fn remove(&self, key: &str) {
        self.update(|entries| {
            entries.remove(key);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::with_entries([(THEME, "dark")]);
        assert_eq!(storage.get(THEME).as_deref(), Some("dark"));

        storage.set(AUTH_TOKEN, "T");
        storage.remove(THEME);
        assert_eq!(storage.get(AUTH_TOKEN).as_deref(), Some("T"));
        assert!(storage.get(THEME).is_none());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.get(AUTH_TOKEN).is_none());
        storage.set(AUTH_TOKEN, "T");
        storage.set(SIDEBAR_COLLAPSED, "true");
        storage.remove(SIDEBAR_COLLAPSED);
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(AUTH_TOKEN).as_deref(), Some("T"));
        assert!(reopened.get(SIDEBAR_COLLAPSED).is_none());
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileStorage::open(&path).unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }));
    }

    #[test]
    fn instances_sharing_a_file_keep_each_others_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let watcher = FileStorage::open(&path).unwrap();
        let login = FileStorage::open(&path).unwrap();

        login.set(AUTH_TOKEN, "T");
        watcher.set(THEME, "dark");
        login.set(REFRESH_TOKEN, "R");
        watcher.remove(SIDEBAR_COLLAPSED);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(AUTH_TOKEN).as_deref(), Some("T"));
        assert_eq!(reopened.get(REFRESH_TOKEN).as_deref(), Some("R"));
        assert_eq!(reopened.get(THEME).as_deref(), Some("dark"));

        // A mutation also refreshes the instance's view of the file.
        assert_eq!(watcher.get(AUTH_TOKEN).as_deref(), Some("T"));
    }

    #[test]
    fn same_key_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let a = FileStorage::open(&path).unwrap();
        let b = FileStorage::open(&path).unwrap();
        a.set(THEME, "light");
        b.set(THEME, "dark");

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(THEME).as_deref(), Some("dark"));
    }

    #[cfg(unix)]
    #[test]
    fn storage_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(REFRESH_TOKEN, "R");

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        storage.set(THEME, "dark");
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
