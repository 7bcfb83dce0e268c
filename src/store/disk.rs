//! Disk-based term store with file locking and versioning

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{StoreStats, TermStore};
use crate::errors::StoreError;
use crate::sequence::{Index, SparseSnapshot, Term, TermBatch, TermKey, TermRange};

/// Current store file format version
///
/// Version 1 held terms as JSON numbers limited to `u64`; those files are ignored.
const STORE_VERSION: u32 = 2;

/// Serialized store format (versioned)
///
/// Keys are the canonical decimal form of the index and values the decimal digits
/// of the term, so terms of any size survive a round trip through plain JSON.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    /// Store format version
    version: u32,
    /// When the file was last written
    saved_at: DateTime<Utc>,
    /// Decimal terms keyed by decimal index
    terms: BTreeMap<String, String>,
}

/// Decoded store contents
#[derive(Debug, Default)]
struct StoreData {
    terms: HashMap<Index, Term>,
}

impl StoreData {
    fn from_file(file: StoreFile) -> Result<Self, StoreError> {
        let terms = file
            .terms
            .into_iter()
            .map(|(key, term)| {
                let index = match key.parse::<TermKey>() {
                    Ok(parsed) => parsed.index(),
                    Err(e) => return Err(StoreError::corrupt_entry(key, e.to_string())),
                };
                term.parse::<Term>()
                    .map(|term| (index, term))
                    .map_err(|e| StoreError::corrupt_entry(key, e.to_string()))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { terms })
    }

    fn to_file(&self) -> StoreFile {
        StoreFile {
            version: STORE_VERSION,
            saved_at: Utc::now(),
            terms: self
                .terms
                .iter()
                .map(|(index, term)| (TermKey::new(*index).to_string(), term.to_str_radix(10)))
                .collect(),
        }
    }
}

/// Internal state for disk store
#[derive(Debug, Default)]
struct DiskStoreState {
    /// Store statistics (in-memory only, not persisted)
    stats: StoreStats,
}

/// Disk-based term store
///
/// Persists terms to a single JSON file with:
/// - Advisory file locking for multi-process safety
/// - A format version; files written by another version are ignored
/// - Atomic writes through a temp file and rename
///
/// Every operation reads the file. Writers hold an exclusive lock on a sidecar
/// `<path>.lock` file across load, merge and save, so several processes (or several
/// `DiskStore` values) may share one store without losing each other's batches.
///
/// # Examples
///
/// ```rust,ignore
/// use fibcache::store::DiskStore;
///
/// let store = DiskStore::new("/var/cache/fibonacci_terms.json").validate()?;
/// ```
///
/// # File Format
///
/// ```json
/// {"version": 2, "saved_at": "2025-10-15T12:00:00Z", "terms": {"0": "0", "1": "1"}}
/// ```
#[derive(Debug)]
pub struct DiskStore {
    path: PathBuf,
    state: Mutex<DiskStoreState>,
}

impl DiskStore {
    /// Creates a new disk store at the specified path
    ///
    /// Path validation is NOT performed until the first I/O operation. Use
    /// [`validate()`](Self::validate) to check the path immediately.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(DiskStoreState::default()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates the store path and creates the parent directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or is not writable.
    pub fn validate(self) -> Result<Self, StoreError> {
        let parent = match self.path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => {
                return Err(StoreError::io(
                    self.path.display().to_string(),
                    "Store path has no parent directory",
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent directory"),
                ))
            }
        };

        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::io(
                    parent.display().to_string(),
                    "Failed to create store directory",
                    e,
                )
            })?;
            debug!(path = %parent.display(), "Created store directory");
        }

        // Check writability
        let test_file = parent.join(".store_write_test");
        std::fs::write(&test_file, b"test").map_err(|e| {
            StoreError::io(
                parent.display().to_string(),
                "Store directory is not writable",
                e,
            )
        })?;
        let _ = std::fs::remove_file(&test_file);

        debug!(path = %self.path.display(), "Store path validated successfully");
        Ok(self)
    }

    fn io_error(&self, details: &str, source: std::io::Error) -> StoreError {
        StoreError::io(self.path.display().to_string(), details, source)
    }

    /// Path of the sidecar file that serializes writers
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Takes the writer lock; released when the returned file is dropped
    fn lock_for_update(&self) -> Result<File, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(|e| self.io_error("Failed to open store lock file", e))?;
        file.lock()
            .map_err(|e| self.io_error("Failed to acquire store lock", e))?;
        Ok(file)
    }

    /// Loads store data from disk under a shared lock
    async fn load(&self) -> Result<StoreData, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Store file does not exist, using empty store");
            return Ok(StoreData::default());
        }

        let mut file = File::open(&self.path)
            .map_err(|e| self.io_error("Failed to open store file", e))?;
        file.lock_shared()
            .map_err(|e| self.io_error("Failed to acquire read lock on store file", e))?;

        let mut raw = String::new();
        file.read_to_string(&mut raw)
            .map_err(|e| self.io_error("Failed to read store file", e))?;

        // Unlock by dropping the file
        drop(file);

        if raw.trim().is_empty() {
            return Ok(StoreData::default());
        }

        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| StoreError::serialization("Failed to parse store file", e))?;

        let version = value.get("version").and_then(serde_json::Value::as_u64);
        if version != Some(u64::from(STORE_VERSION)) {
            warn!(
                path = %self.path.display(),
                stored_version = ?version,
                current_version = STORE_VERSION,
                "Store version mismatch, ignoring stored data"
            );
            return Ok(StoreData::default());
        }

        let file: StoreFile = serde_json::from_value(value)
            .map_err(|e| StoreError::serialization("Failed to decode store file", e))?;
        let saved_at = file.saved_at;
        let data = StoreData::from_file(file)?;

        debug!(
            path = %self.path.display(),
            entries = data.terms.len(),
            saved_at = %saved_at,
            "Loaded term store"
        );
        Ok(data)
    }

    /// Saves store data with an exclusive lock and atomic rename
    async fn save(&self, data: &StoreData) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&data.to_file())
            .map_err(|e| StoreError::serialization("Failed to encode store file", e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error("Failed to create store directory", e))?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| self.io_error("Failed to write temp store file", e))?;

        let file = File::open(&temp_path)
            .map_err(|e| self.io_error("Failed to open temp store file", e))?;
        file.lock()
            .map_err(|e| self.io_error("Failed to acquire write lock on store file", e))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error("Failed to rename temp store file", e))?;

        // Unlock by dropping the file
        drop(file);

        debug!(
            path = %self.path.display(),
            entries = data.terms.len(),
            "Saved term store"
        );
        Ok(())
    }
}

#[async_trait]
impl TermStore for DiskStore {
    async fn fetch_range(&self, range: TermRange) -> Result<SparseSnapshot, StoreError> {
        let mut state = self.state.lock().await;

        let data = self.load().await?;
        let snapshot = SparseSnapshot::collect(range, |index| data.terms.get(&index).cloned());

        state.stats.record_fetch(&snapshot);
        state.stats.entries = data.terms.len();

        debug!(range = %range, holes = snapshot.holes(), "Fetched range (disk)");
        Ok(snapshot)
    }

    async fn store_terms(&self, batch: &TermBatch) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let lock = self.lock_for_update()?;

        let mut data = self.load().await?;
        data.terms
            .extend(batch.iter().map(|(key, term)| (key.index(), term.clone())));
        self.save(&data).await?;

        drop(lock);

        state.stats.record_write(batch);
        state.stats.entries = data.terms.len();
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        info!(path = %self.path.display(), "Clearing disk store");
        let lock = self.lock_for_update()?;
        if self.path.exists() {
            tokio::fs::remove_file(&self.path)
                .await
                .map_err(|e| self.io_error("Failed to delete store file", e))?;
        }
        drop(lock);

        state.stats.entries = 0;
        Ok(())
    }

    async fn stats(&self) -> StoreStats {
        let mut state = self.state.lock().await;

        if let Ok(data) = self.load().await {
            state.stats.entries = data.terms.len();
        }

        state.stats.clone()
    }

    fn name(&self) -> &'static str {
        "DiskStore"
    }
}
