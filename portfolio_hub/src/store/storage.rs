//! Key-value backends for the token store.

use log::warn;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Synchronous string key-value storage.
///
/// Backends have no failure mode visible to callers: storage that cannot be
/// read behaves as an empty store.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// Storage persisted as a flat JSON object on disk.
///
/// The whole document is rewritten on every change. A missing, unreadable or
/// malformed file opens as an empty store.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the document at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path);
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) {
        let document = match serde_json::to_vec_pretty(entries) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to encode token document: {}", e);
                return;
            }
        };

        if let Err(e) = write_private(&self.path, &document) {
            warn!(
                "Failed to write token document {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

/// Write `document` readable by the owner only
fn write_private(path: &Path, document: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // Files created before the mode was set keep their old permissions
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(document)
}

fn load(path: &Path) -> BTreeMap<String, String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!("Token document {} is unreadable: {}", path.display(), e);
            return BTreeMap::new();
        }
    };

    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        warn!("Token document {} is malformed: {}", path.display(), e);
        BTreeMap::new()
    })
}
