//! Background weather refresh
//!
//! A [`Refresher`] performs one fetch cycle: resolve the location, fetch,
//! and store the new snapshot in the shared [`WeatherCache`].
//! [`RefreshHandle::spawn`] drives it on a tokio task and reports the status
//! of each cycle over a channel to the main application.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::cache::{snapshot_key, CacheManager, WeatherCache};
use crate::conditions::{self, Translate};
use crate::data::{WeatherClient, WeatherSnapshot};
use crate::settings::{LocationProvider, Settings};

/// Delay before retrying after a cycle that produced no snapshot (10 minutes)
pub const RETRY_BACKOFF: Duration = Duration::from_secs(600);

/// Result of one refresh cycle
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// A new snapshot replaced the cached one
    Updated(Arc<WeatherSnapshot>),
    /// The server answered without data; the previous snapshot is kept
    NoData,
    /// Location, network, or decoding failure; the previous snapshot is kept
    Failed(String),
}

/// Messages sent from background refresh to main app
#[derive(Debug, Clone)]
pub enum RefreshMessage {
    /// Refresh started
    RefreshStarted,
    /// A new snapshot is in the shared [`WeatherCache`]
    WeatherUpdated,
    /// The cycle finished without new data
    NoData,
    /// An error occurred during refresh
    RefreshError(String),
}

impl From<RefreshOutcome> for RefreshMessage {
    fn from(outcome: RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Updated(_) => Self::WeatherUpdated,
            RefreshOutcome::NoData => Self::NoData,
            RefreshOutcome::Failed(reason) => Self::RefreshError(reason),
        }
    }
}

/// Runs fetch cycles against the current settings
pub struct Refresher {
    client: WeatherClient,
    provider: Arc<dyn LocationProvider>,
    settings: Settings,
    cache: WeatherCache,
    disk: Option<CacheManager>,
}

impl Refresher {
    pub fn new(
        client: WeatherClient,
        provider: Arc<dyn LocationProvider>,
        settings: Settings,
        cache: WeatherCache,
    ) -> Self {
        Self {
            client,
            provider,
            settings,
            cache,
            disk: None,
        }
    }

    /// Also persist each new snapshot to `disk`
    pub fn with_disk_cache(mut self, disk: CacheManager) -> Self {
        self.disk = Some(disk);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Performs one fetch cycle
    ///
    /// Only a successful fetch touches the cache. Soft failures are logged
    /// at `warn`, hard failures at `error`.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        let coordinates = match self.provider.coordinates(&self.settings).await {
            Ok(coordinates) => coordinates,
            Err(e) => {
                error!(error = %e, "Cannot resolve location");
                return RefreshOutcome::Failed(e.to_string());
            }
        };

        let translator: Translate<'_> = &conditions::untranslated;
        let translate = self.settings.translate_condition.then_some(translator);

        let result = self
            .client
            .fetch_weather(coordinates, self.settings.days_forecast, translate)
            .await;

        match result {
            Ok(Some(snapshot)) => {
                if let Some(disk) = &self.disk {
                    let ttl = chrono::Duration::from_std(self.settings.refresh_interval())
                        .unwrap_or_else(|_| chrono::Duration::minutes(10));
                    if let Err(e) = disk.write(&snapshot_key(&coordinates), &snapshot, ttl) {
                        warn!(error = %e, "Failed to write snapshot to disk cache");
                    }
                }

                let snapshot = self.cache.replace(snapshot);
                info!(
                    condition = snapshot.condition(),
                    days = snapshot.forecast().map_or(0, |grid| grid.day_count()),
                    "Weather updated"
                );
                RefreshOutcome::Updated(snapshot)
            }
            Ok(None) => {
                warn!("Weather service returned no data, keeping previous snapshot");
                RefreshOutcome::NoData
            }
            Err(e) => {
                error!(error = %e, "Weather refresh failed");
                RefreshOutcome::Failed(e.to_string())
            }
        }
    }

    /// Delay until the next cycle after `outcome`
    pub fn next_delay(&self, outcome: &RefreshOutcome) -> Duration {
        match outcome {
            RefreshOutcome::Updated(_) => self.settings.refresh_interval(),
            RefreshOutcome::NoData | RefreshOutcome::Failed(_) => RETRY_BACKOFF,
        }
    }

    /// Loads the last snapshot saved for the active location into the cache
    ///
    /// Expired entries are used too; any snapshot beats an empty panel.
    /// Returns the snapshot and when it was fetched.
    pub async fn restore_from_disk(&self) -> Option<(Arc<WeatherSnapshot>, DateTime<Utc>)> {
        let disk = self.disk.as_ref()?;
        let coordinates = self.provider.coordinates(&self.settings).await.ok()?;
        let cached = disk.read::<WeatherSnapshot>(&snapshot_key(&coordinates))?;

        debug!(
            cached_at = %cached.cached_at,
            expired = cached.is_expired,
            "Restored snapshot from disk cache"
        );
        Some((self.cache.store(cached.data, cached.cached_at), cached.cached_at))
    }
}

/// Handle for controlling the background refresh task
pub struct RefreshHandle {
    /// Channel for receiving refresh messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    refresh_tx: mpsc::Sender<()>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns the refresh loop
    ///
    /// The first cycle runs immediately. Cycles never overlap: a refresh
    /// requested while one is running starts as soon as it finishes.
    pub fn spawn(refresher: Refresher) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(1);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            let mut delay = Duration::ZERO;

            loop {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    Some(()) = refresh_rx.recv() => {
                        debug!("Manual refresh requested");
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }

                if msg_tx.send(RefreshMessage::RefreshStarted).await.is_err() {
                    break;
                }

                let outcome = refresher.refresh_once().await;
                delay = refresher.next_delay(&outcome);
                debug!(next_in_secs = delay.as_secs(), "Scheduled next refresh");

                if msg_tx.send(outcome.into()).await.is_err() {
                    break;
                }
            }
        });

        Self {
            receiver: msg_rx,
            refresh_tx,
            shutdown_tx,
        }
    }

    /// Requests an immediate refresh
    ///
    /// Requests made while one is already pending are merged.
    pub fn request_refresh(&self) {
        let _ = self.refresh_tx.try_send(());
    }

    /// Shuts down the background refresh task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Checks for pending refresh messages without blocking
///
/// # Returns
/// * `Some(RefreshMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}
