//! Headlines - a terminal news reader.
//!
//! Breaking news for one country, full-text search over all articles and
//! local bookmarks, backed by the News API.

mod app;
mod pages;
mod ui;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use headlines_core::auth::{
    configured_token, open_store, AccountStore, BootstrapOutcome, BootstrapSequencer,
    RequestAuthenticator, SessionCache,
};
use headlines_core::models::AccountProperties;
use headlines_core::{api::NewsClient, Config};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside the cache directory
const LOG_FILE_NAME: &str = "headlines.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr for the one-shot CLI commands.
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily file so output does not draw over the terminal UI.
/// The returned guard flushes the writer when dropped.
fn init_tui_tracing(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().context("Failed to load config")?;
    let data_dir = config.data_dir()?;
    let cache_dir = config.cache_dir()?;
    let store = open_store(config.credential_backend, &data_dir);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--set-key") => {
            init_cli_tracing();
            return set_key(store.as_ref());
        }
        Some("--clear-key") => {
            init_cli_tracing();
            store.clear().context("Failed to clear stored API key")?;
            println!("Stored API key removed.");
            return Ok(());
        }
        Some("--headlines") => {
            init_cli_tracing();
            return print_headlines(&config, store).await;
        }
        Some(other) => {
            eprintln!("Unknown argument: {}", other);
            eprintln!("Usage: headlines [--set-key | --clear-key | --headlines]");
            std::process::exit(2);
        }
        None => {}
    }

    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("Failed to create {}", cache_dir.display()))?;
    let _log_guard = init_tui_tracing(&cache_dir);
    info!("Headlines starting");

    let session = Arc::new(SessionCache::new(RequestAuthenticator::new()));
    let mut app = App::new(config, store, session, cache_dir)?;

    // The first refresh is not held back for the bootstrap
    app.start_bootstrap(configured_token());
    app.load_from_cache();
    if app.is_cache_stale() {
        app.refresh_breaking_news();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.save_ui_state();
    info!("Headlines shutting down");

    // Navigation errors are programming errors and end the process
    result
}

/// Prompt for an API key and store it as the current account.
fn set_key(store: &dyn AccountStore) -> Result<()> {
    let key = rpassword::prompt_password("News API key: ").context("Failed to read API key")?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("No API key entered");
    }

    let properties = AccountProperties::new(key);
    store
        .insert_account_properties(&properties)
        .context("Failed to store API key")?;
    println!("Stored API key {}", properties.masked_token());
    Ok(())
}

/// Bootstrap the session, then print breaking news titles.
async fn print_headlines(config: &Config, store: Arc<dyn AccountStore>) -> Result<()> {
    let session = Arc::new(SessionCache::new(RequestAuthenticator::new()));
    let outcome = BootstrapSequencer::new(store, Arc::clone(&session), configured_token())
        .run()
        .await;
    if let BootstrapOutcome::StoreFailed(ref reason) = outcome {
        eprintln!("Warning: could not read stored API key: {}", reason);
    }

    let mut api = NewsClient::new(session.authenticator().clone())?.with_country(config.country.clone());
    if let Some(ref base_url) = config.api_base_url {
        api = api.with_base_url(base_url.clone());
    }

    let articles = api
        .get_breaking_news()
        .await
        .context("Failed to fetch breaking news")?
        .into_articles();

    for article in &articles {
        println!("{}  [{}]", article.title, article.source_display());
    }
    eprintln!("{} headlines ({})", articles.len(), api.country().to_uppercase());
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
