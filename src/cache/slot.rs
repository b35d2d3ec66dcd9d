//! In-memory slot shared by the refresher and the interface

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

use crate::data::WeatherSnapshot;

/// A snapshot together with when it was fetched
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub snapshot: Arc<WeatherSnapshot>,
    pub fetched_at: DateTime<Utc>,
}

/// Single-owner slot holding the current weather snapshot
///
/// Each successful fetch replaces the whole snapshot. Readers clone the
/// `Arc` and keep a consistent view even while a newer snapshot lands.
#[derive(Debug, Clone)]
pub struct WeatherCache {
    sender: Arc<watch::Sender<Option<StoredSnapshot>>>,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherCache {
    /// Creates an empty slot
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Stores a snapshot fetched just now, dropping the previous one
    pub fn replace(&self, snapshot: WeatherSnapshot) -> Arc<WeatherSnapshot> {
        self.store(snapshot, Utc::now())
    }

    /// Stores a snapshot fetched at `fetched_at`, dropping the previous one
    pub fn store(
        &self,
        snapshot: WeatherSnapshot,
        fetched_at: DateTime<Utc>,
    ) -> Arc<WeatherSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.sender.send_replace(Some(StoredSnapshot {
            snapshot: Arc::clone(&snapshot),
            fetched_at,
        }));
        snapshot
    }

    /// The snapshot currently held, if any
    pub fn current(&self) -> Option<Arc<WeatherSnapshot>> {
        self.sender
            .borrow()
            .as_ref()
            .map(|stored| Arc::clone(&stored.snapshot))
    }

    /// Receiver notified on every replacement
    pub fn subscribe(&self) -> watch::Receiver<Option<StoredSnapshot>> {
        self.sender.subscribe()
    }
}
