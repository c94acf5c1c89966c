use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{config::normalize_server_url, load_settings, ClientSettings};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{DocChatApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Desktop client for chatting with an uploaded document")]
struct Args {
    /// Document service base url; overrides the settings file and environment
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file (defaults to ./docchat.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Per-request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
}

fn resolve_settings(args: &Args) -> anyhow::Result<ClientSettings> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url.as_deref() {
        settings.server_url = normalize_server_url(server_url)?;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }
    settings.validate()?;
    Ok(settings)
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let (settings, startup_error) = match resolve_settings(&args) {
        Ok(settings) => (settings, None),
        Err(err) => {
            tracing::error!("failed to load settings: {err:#}");
            (
                ClientSettings::default(),
                Some(format!("Settings ignored: {err:#}")),
            )
        }
    };
    tracing::info!(server_url = %settings.server_url, "starting desktop client");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings.clone());

    let startup = StartupConfig {
        server_url: settings.server_url,
        startup_error,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Document Chat")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([760.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Document Chat",
        options,
        Box::new(|_cc| Ok(Box::new(DocChatApp::new(cmd_tx, ui_rx, startup)))),
    )
}
