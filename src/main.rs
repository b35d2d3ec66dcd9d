//! meteopanel - Weather for the terminal
//!
//! Shows current conditions, the next few hours, and a multi-day forecast
//! from Open-Meteo, refreshing in the background.

use std::io;
use std::panic;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use meteopanel::app::App;
use meteopanel::cache::{CacheManager, WeatherCache};
use meteopanel::cli::{Cli, StartupConfig};
use meteopanel::data::WeatherClient;
use meteopanel::panel::{render_report, PanelView};
use meteopanel::refresh::{self, RefreshHandle, RefreshOutcome, Refresher};
use meteopanel::settings::{Settings, SettingsLocationProvider};
use meteopanel::{logging, ui};

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Fetches once and prints a text report
///
/// Falls back to the last snapshot on disk when the fetch fails.
async fn run_once(refresher: &Refresher) -> Result<(), Box<dyn std::error::Error>> {
    let (snapshot, fetched_at) = match refresher.refresh_once().await {
        RefreshOutcome::Updated(snapshot) => (snapshot, Utc::now()),
        RefreshOutcome::NoData => match refresher.restore_from_disk().await {
            Some(restored) => restored,
            None => return Err("The weather service returned no data".into()),
        },
        RefreshOutcome::Failed(reason) => match refresher.restore_from_disk().await {
            Some(restored) => {
                warn!(%reason, "Showing cached weather");
                restored
            }
            None => return Err(reason.into()),
        },
    };

    let settings = refresher.settings();
    let location = settings
        .active_location()
        .map(|location| location.display_name())
        .unwrap_or_default();

    let view = PanelView::build(&snapshot, settings, &location, Utc::now(), fetched_at)?;
    println!("{}", render_report(&view, &settings.units)?);
    Ok(())
}

/// Runs the interactive interface until the user quits
async fn run_tui(refresher: Refresher) -> Result<(), Box<dyn std::error::Error>> {
    if refresher.restore_from_disk().await.is_some() {
        info!("Showing cached weather until the first fetch completes");
    }
    let mut app = App::new(refresher.settings().clone(), refresher.cache());

    let mut handle = RefreshHandle::spawn(refresher);

    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        while let Some(message) = refresh::try_recv(&mut handle) {
            app.apply_message(message);
        }

        terminal.draw(|f| ui::render(f, &app, Utc::now()))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.refresh_requested {
            handle.request_refresh();
            app.refresh_requested = false;
        }

        if app.should_quit {
            break;
        }
    }

    handle.shutdown().await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let startup = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let disk = CacheManager::new();

    if startup.once {
        logging::init_stderr();
    } else if let Some(disk) = &disk {
        if let Err(e) = logging::init_file(disk.dir()) {
            eprintln!("Warning: logging disabled: {}", e);
        }
    }

    let settings_path: Option<PathBuf> =
        startup.settings_path.clone().or_else(Settings::default_path);
    let mut settings = match &settings_path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    startup.apply(&mut settings);

    if settings.active_location().is_none() {
        eprintln!("Error: No location configured.");
        eprintln!("Pass --lat and --lon, or add a location to the settings file.");
        if let Some(path) = &settings_path {
            eprintln!("Settings file: {}", path.display());
        }
        process::exit(1);
    }

    info!(
        location = %settings.active_location().map(|l| l.display_name()).unwrap_or_default(),
        days = settings.days_forecast,
        "Starting meteopanel"
    );

    let mut refresher = Refresher::new(
        WeatherClient::new(),
        Arc::new(SettingsLocationProvider),
        settings,
        WeatherCache::new(),
    );
    if let Some(disk) = disk {
        refresher = refresher.with_disk_cache(disk);
    }

    if startup.once {
        run_once(&refresher).await
    } else {
        run_tui(refresher).await
    }
}
