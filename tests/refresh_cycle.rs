//! Integration tests for refresh cycles against a mock server

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{forecast_body, FORECAST_PATH};
use meteopanel::app::{App, AppState};
use meteopanel::cache::{snapshot_key, CacheManager, WeatherCache};
use meteopanel::data::{Coordinates, WeatherClient, WeatherSnapshot};
use meteopanel::refresh::{RefreshHandle, RefreshMessage, RefreshOutcome, Refresher, RETRY_BACKOFF};
use meteopanel::settings::{Location, Settings, SettingsLocationProvider};
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings() -> Settings {
    Settings {
        locations: vec![Location::coordinates(
            49.28,
            -123.12,
            Some("Vancouver".to_string()),
        )],
        refresh_interval_current: 3600,
        days_forecast: 1,
        ..Settings::default()
    }
}

fn refresher_for(server: &MockServer, cache: WeatherCache) -> Refresher {
    Refresher::new(
        WeatherClient::new().with_base_url(format!("{}{}", server.uri(), FORECAST_PATH)),
        Arc::new(SettingsLocationProvider),
        settings(),
        cache,
    )
}

#[tokio::test]
async fn test_successful_cycle_replaces_cache_and_writes_disk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(48)))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let disk = CacheManager::with_dir(temp_dir.path().to_path_buf());
    let cache = WeatherCache::new();
    let refresher = refresher_for(&server, cache.clone()).with_disk_cache(disk.clone());

    let outcome = refresher.refresh_once().await;
    assert!(matches!(outcome, RefreshOutcome::Updated(_)));
    assert_eq!(refresher.next_delay(&outcome), Duration::from_secs(3600));

    let current = cache.current().expect("Cache should hold the new snapshot");
    assert_eq!(current.forecast().unwrap().day_count(), 2);

    let on_disk = disk
        .read::<WeatherSnapshot>(&snapshot_key(&Coordinates::new(49.28, -123.12)))
        .expect("Snapshot should be written to disk");
    assert!(!on_disk.is_expired);
    assert_eq!(on_disk.data, *current);
}

#[tokio::test]
async fn test_soft_failure_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(48)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let cache = WeatherCache::new();
    let refresher = refresher_for(&server, cache.clone());

    assert!(matches!(refresher.refresh_once().await, RefreshOutcome::Updated(_)));
    let before = cache.current().unwrap();

    let outcome = refresher.refresh_once().await;
    assert!(matches!(outcome, RefreshOutcome::NoData));
    assert_eq!(refresher.next_delay(&outcome), RETRY_BACKOFF);

    let after = cache.current().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn test_hard_failure_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(48)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let cache = WeatherCache::new();
    let refresher = refresher_for(&server, cache.clone());

    refresher.refresh_once().await;
    let outcome = refresher.refresh_once().await;

    assert!(matches!(outcome, RefreshOutcome::Failed(_)));
    assert!(cache.current().is_some());
}

#[tokio::test]
async fn test_background_loop_delivers_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(48)))
        .mount(&server)
        .await;

    let cache = WeatherCache::new();
    let mut handle = RefreshHandle::spawn(refresher_for(&server, cache.clone()));

    let started = handle.receiver.recv().await;
    assert!(matches!(started, Some(RefreshMessage::RefreshStarted)));

    let finished = tokio::time::timeout(Duration::from_secs(10), handle.receiver.recv())
        .await
        .expect("Refresh should finish");
    assert!(
        matches!(finished, Some(RefreshMessage::WeatherUpdated)),
        "Expected WeatherUpdated, got {:?}",
        finished
    );

    let snapshot = cache.current().expect("Slot should hold the new snapshot");
    assert_eq!(snapshot.condition(), "Slight rain");
    handle.shutdown().await;
}

#[tokio::test]
async fn test_app_reads_snapshot_from_shared_slot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(48)))
        .mount(&server)
        .await;

    let cache = WeatherCache::new();
    let mut app = App::new(settings(), &cache);
    assert_eq!(app.state, AppState::Loading);

    let mut handle = RefreshHandle::spawn(refresher_for(&server, cache.clone()));
    for _ in 0..2 {
        let message = tokio::time::timeout(Duration::from_secs(10), handle.receiver.recv())
            .await
            .expect("Refresh should finish")
            .expect("Refresh loop should still be running");
        app.apply_message(message);
    }

    assert_eq!(app.state, AppState::Ready);
    let shown = app.snapshot().expect("App should show the fetched snapshot");
    assert!(Arc::ptr_eq(&shown, &cache.current().unwrap()));
    assert!(app.view(chrono::Utc::now()).is_some());

    handle.shutdown().await;
}
