//! Disk cache for the last fetched snapshot
//!
//! Provides a `CacheManager` that stores serializable data to JSON files with
//! expiry timestamps, so the last known weather survives a restart.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::Coordinates;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug)]
pub struct CachedData<T> {
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    pub is_expired: bool,
}

/// Cache key for the snapshot of a location
///
/// Coordinates are rounded to two decimals (about 1 km), the same precision
/// used when showing an unnamed location.
pub fn snapshot_key(coordinates: &Coordinates) -> String {
    format!(
        "snapshot_{:.2}_{:.2}",
        coordinates.latitude, coordinates.longitude
    )
}

/// Manages reading and writing cached data to disk
///
/// Files live in an XDG-compliant cache directory (`~/.cache/meteopanel/` on
/// Linux). Expired entries are still returned, flagged with
/// `is_expired = true`, so stale weather can be shown while offline.
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager using the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "meteopanel")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Writes data to the cache, fresh for `ttl`
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the cache entry (see [`snapshot_key`])
    /// * `data` - The data to cache
    /// * `ttl` - How long the entry should be considered fresh
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let now = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now + ttl,
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads data from the cache
    ///
    /// # Returns
    /// * `Some(CachedData<T>)` if the entry exists and can be parsed, expired or not
    /// * `None` if the entry doesn't exist or parsing fails
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
            is_expired: Utc::now() > entry.expires_at,
        })
    }
}
