// src/cache.rs
//! Freshness cache: one wholesale `CacheEntry` per category, backed by an
//! optional persistent key-value store (the library stand-in for browser
//! local storage). Storage failures degrade the cache to memory-only for
//! the rest of the session; they are never surfaced to callers.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use metrics::counter;

use crate::error::StorageError;
use crate::metrics::ensure_metrics_described;
use crate::types::{CacheEntry, NewsItem};

/// Persistent key-value collaborator. Synchronous by design: the browser
/// storage it models is synchronous, and values are small JSON blobs.
pub trait KvStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One JSON file per key under a directory. Keys are sanitized into file
/// names, so arbitrary category strings are safe.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KvStore for FileKvStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::Write {
            key: key.to_string(),
            source: e,
        })?;
        std::fs::write(self.path_for(key), value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            source: e,
        })
    }
}

/// Plain in-memory store, useful for tests and for consumers that opt out
/// of persistence.
#[derive(Default)]
pub struct MemoryKvStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map.lock().expect("kv store mutex poisoned").get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map
            .lock()
            .expect("kv store mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `true` while the entry is younger than `max_age_ms` at `now_ms`.
pub fn is_fresh_at(entry: &CacheEntry, now_ms: i64, max_age_ms: u64) -> bool {
    now_ms.saturating_sub(entry.fetched_at_epoch_ms) < max_age_ms as i64
}

/// Category → entry map with last-writer-wins overwrite semantics and an
/// optional write-through persistent backend.
pub struct FreshnessCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    store: Option<Box<dyn KvStore>>,
    /// Latched on the first storage failure; memory-only from then on.
    degraded: AtomicBool,
}

fn storage_key(category: &str) -> String {
    format!("news-{category}")
}

impl FreshnessCache {
    pub fn in_memory() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            store: None,
            degraded: AtomicBool::new(false),
        }
    }

    pub fn with_store(store: Box<dyn KvStore>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            store: Some(store),
            degraded: AtomicBool::new(false),
        }
    }

    /// Whether persistence has been dropped for this session.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    fn degrade(&self, err: &StorageError) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            counter!("news_storage_degraded_total").increment(1);
            tracing::warn!(error = %err, key = err.key(), "storage failed, cache now memory-only");
        }
    }

    /// Absence is a normal cold-start state, not an error.
    pub fn get(&self, category: &str) -> Option<CacheEntry> {
        ensure_metrics_described();
        if let Some(entry) = self
            .entries
            .lock()
            .expect("cache mutex poisoned")
            .get(category)
            .cloned()
        {
            counter!("news_cache_hits_total").increment(1);
            return Some(entry);
        }

        // Memory miss: fall through to the persistent backend once.
        if let Some(entry) = self.read_through(category) {
            counter!("news_cache_hits_total").increment(1);
            self.entries
                .lock()
                .expect("cache mutex poisoned")
                .entry(category.to_string())
                .or_insert_with(|| entry.clone());
            return Some(entry);
        }

        counter!("news_cache_misses_total").increment(1);
        None
    }

    fn read_through(&self, category: &str) -> Option<CacheEntry> {
        let store = self.store.as_ref()?;
        if self.is_degraded() {
            return None;
        }
        let key = storage_key(category);
        match store.read(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    // Corrupt value: drop it, keep the backend.
                    tracing::warn!(error = %e, key = %key, "discarding corrupt cache value");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                self.degrade(&e);
                None
            }
        }
    }

    /// Overwrite the category wholesale, stamped with the current time.
    pub fn put(&self, category: &str, payload: Vec<NewsItem>) {
        self.put_with_timestamp(category, payload, now_ms());
    }

    /// Overwrite with an explicit fetch time. `fetched_at_epoch_ms` stays
    /// monotonically non-decreasing per key even if the clock steps back.
    pub fn put_with_timestamp(&self, category: &str, payload: Vec<NewsItem>, fetched_at_epoch_ms: i64) {
        ensure_metrics_described();
        let entry = {
            let mut map = self.entries.lock().expect("cache mutex poisoned");
            let floor = map
                .get(category)
                .map(|e| e.fetched_at_epoch_ms)
                .unwrap_or(i64::MIN);
            let entry = CacheEntry {
                payload,
                fetched_at_epoch_ms: fetched_at_epoch_ms.max(floor),
            };
            map.insert(category.to_string(), entry.clone());
            entry
        };

        if let Some(store) = &self.store {
            if !self.is_degraded() {
                let key = storage_key(category);
                let raw = serde_json::to_string(&entry).expect("cache entry serializes");
                if let Err(e) = store.write(&key, &raw) {
                    self.degrade(&e);
                }
            }
        }
    }

    pub fn is_fresh(&self, entry: &CacheEntry, max_age_ms: u64) -> bool {
        is_fresh_at(entry, now_ms(), max_age_ms)
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
