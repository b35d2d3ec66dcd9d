//! Snapshot caching
//!
//! Two layers live here. [`WeatherCache`] is the in-memory slot holding the
//! most recent snapshot, replaced wholesale after each successful fetch.
//! [`CacheManager`] persists that snapshot to disk with an expiry so a fresh
//! start can show the last known weather before the first fetch completes.

mod manager;
mod slot;

pub use manager::{snapshot_key, CacheManager, CachedData};
pub use slot::{StoredSnapshot, WeatherCache};
