use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod config;
mod storage;
mod ui;

use api::{spawn_identity_mirror, ApiClient, AuthClient};
use app::{App, AppEvent, View};
use config::ClientConfig;
use storage::LocalStorage;

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging()?;

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            show_fatal(&e.to_string())?;
            return Err(e.into());
        }
    };
    tracing::debug!("Identity config: {}", config.identity.summary());

    // The terminal is the mount point for the UI.
    if !io::stdout().is_terminal() {
        let message = "Root terminal not found: stdout is not an interactive terminal";
        tracing::error!("{}", message);
        eprintln!("Error: {message}");
        anyhow::bail!(message);
    }

    let storage = Arc::new(LocalStorage::open_default()?);
    tracing::debug!("Local storage at {}", storage.path().display());

    let mut auth = AuthClient::new(config.identity.clone(), storage.clone());
    let _mirror = spawn_identity_mirror(auth.subscribe(), storage);
    if let Err(e) = auth.restore() {
        tracing::error!("Error restoring session: {}", e);
    }

    let mut api = ApiClient::new(&config.api_url, auth);
    match api.health().await {
        Ok(health) => tracing::info!(
            "Connected to {} ({}, project {})",
            config.api_url,
            health.environment,
            health.project_id
        ),
        Err(e) => tracing::warn!("API at {} is not reachable: {}", config.api_url, e),
    }

    let mut terminal = setup_terminal()?;
    let res = run_app(&mut terminal, App::new(api)).await;
    restore_terminal(&mut terminal)?;

    if let Err(err) = res {
        tracing::error!("Error rendering app: {:?}", err);
        eprintln!("Error rendering app: {err}");
        return Err(err);
    }

    Ok(())
}

/// Log to a file in the data directory so output does not tear the TUI.
fn init_logging() -> Result<()> {
    let path = storage::data_dir()?.join("console.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "users_console=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Render a startup error in place of the app and wait for a key.
fn show_fatal(message: &str) -> Result<()> {
    if !io::stdout().is_terminal() {
        eprintln!("Error: {message}");
        return Ok(());
    }

    let mut terminal = setup_terminal()?;
    let drawn = terminal.draw(|f| ui::draw_fatal(f, message)).map(|_| ());
    let waited = drawn.and_then(|()| loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                break Ok(());
            }
        }
    });
    restore_terminal(&mut terminal)?;
    waited?;

    eprintln!("Error: {message}");
    Ok(())
}

async fn run_app(terminal: &mut Tui, mut app: App) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);

    // Spawn input handler
    let tx_input = tx.clone();
    tokio::spawn(async move {
        loop {
            if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press
                        && tx_input.send(AppEvent::Key(key)).await.is_err()
                    {
                        break;
                    }
                }
            }
            if tx_input.send(AppEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    if app.view == View::Users {
        tx.send(AppEvent::Refresh).await?;
    }

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        match rx.recv().await {
            Some(AppEvent::Key(key)) => {
                if app.handle_key(key).await? {
                    return Ok(());
                }
            }
            Some(AppEvent::Tick) => {}
            Some(AppEvent::Refresh) => app.refresh().await,
            None => return Ok(()),
        }
    }
}
