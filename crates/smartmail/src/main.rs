//! `smartmail` - terminal client for the Smart Email Assistant backend.
//!
//! Signs in through the backend's Google authorization flow and keeps a
//! summarised list of today's emails up to date.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod message;
mod platform;
mod view;

use std::sync::Arc;

use anyhow::Context;
use smartmail_core::{Backend, Command, Dashboard, Event, HttpBackend, Intent, execute};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use config::{Settings, load_settings, save_settings, settings_path};
use message::{HELP, Input, parse_input};
use platform::{TokioScheduler, UrlNavigator};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is the rendered view.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartmail=info,smartmail_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting smartmail");

    let path = settings_path();
    let mut settings = load_settings(&path)
        .await
        .context("Failed to load settings")?;
    settings.apply_env(|name| std::env::var(name).ok())?;
    if let Some(location) = std::env::args().nth(1) {
        settings.location = Url::parse(&location)
            .with_context(|| format!("Invalid page address: {location}"))?;
    }

    let backend = Arc::new(HttpBackend::new(&settings.http())?);
    info!(api = %backend.base_url(), "Using backend");
    check_health(backend.as_ref()).await;

    run(backend, settings, &path).await
}

/// Logs whether the backend is reachable. Never fatal.
async fn check_health<B: Backend>(backend: &B) {
    match backend.health().await {
        Ok(health) if health.is_ok() => info!(message = %health.message, "Backend is up"),
        Ok(health) => warn!(status = %health.status, "Backend reports unhealthy"),
        Err(e) => warn!(error = %e, "Backend unreachable, continuing anyway"),
    }
}

/// Owns the dashboard and runs the event loop until `quit` or end of input.
async fn run(
    backend: Arc<HttpBackend>,
    mut settings: Settings,
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let (events, mut inbox) = mpsc::unbounded_channel();
    let scheduler = TokioScheduler::new(events.clone());
    let navigator = UrlNavigator::new(settings.location.clone());
    let mut dashboard = Dashboard::new(navigator, scheduler, settings.refresh_interval);

    spawn_commands(&backend, &events, dashboard.mount());
    info!(location = %dashboard.session().navigator().location(), "Mounted");
    let mut last = dashboard.snapshot();
    print!("{}", view::render(&last));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = inbox.recv() => {
                let commands = dashboard.handle(event);
                spawn_commands(&backend, &events, commands);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match parse_input(&line) {
                    Ok(None) => {}
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(Input::Help)) => println!("{HELP}"),
                    Ok(Some(Input::Intent(intent))) => {
                        let commands = dashboard.dispatch(intent);
                        spawn_commands(&backend, &events, commands);
                        if let Intent::SetInterval(interval) = intent {
                            settings.refresh_interval = interval;
                            if let Err(e) = save_settings(&settings, path).await {
                                warn!(error = %e, "Failed to save settings");
                            }
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
        }

        let snapshot = dashboard.snapshot();
        if snapshot != last {
            print!("\n{}", view::render(&snapshot));
            last = snapshot;
        }
    }

    info!("Shutting down");
    Ok(())
}

/// Runs each command on its own task and feeds the outcome back as an event.
fn spawn_commands(
    backend: &Arc<HttpBackend>,
    events: &UnboundedSender<Event>,
    commands: Vec<Command>,
) {
    for command in commands {
        let backend = Arc::clone(backend);
        let events = events.clone();
        tokio::spawn(async move {
            let event = execute(backend.as_ref(), command).await;
            // The loop may already be gone during shutdown.
            let _ = events.send(event);
        });
    }
}
