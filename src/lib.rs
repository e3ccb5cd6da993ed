pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

use clap::Parser;
use cli::{Cli, Command};
use config::ArchiveConfig;
use error::AppError;
use models::map_types::MapView;
use serde::Serialize;
use services::watcher::FolderWatcher;
use state::AppState;
use tracing_subscriber::EnvFilter;

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = ArchiveConfig::load(cli.config.as_deref())?.apply_overrides(cli.overrides())?;
    init_tracing(&config.log_level);

    tracing::info!("time-capsule v{}", env!("CARGO_PKG_VERSION"));
    // `load` runs before the subscriber exists
    if let Some(path) = cli.config.as_deref().filter(|p| !p.exists()) {
        tracing::warn!("Config file {} not found, using defaults", path.display());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli.command, config))
}

async fn dispatch(command: Command, config: ArchiveConfig) -> Result<(), AppError> {
    if let Command::Style { light } = command {
        return print_json(&commands::map::map_style(!light));
    }

    let mut state = AppState::from_config(config)?;
    if let Some(seed) = command.seed() {
        state = state.with_shuffle_seed(seed);
    }

    match command {
        Command::Gallery { filter, sort, .. } => {
            commands::map::resolve_coordinates(&state).await;
            print_json(&commands::gallery::list_gallery(&state, filter, sort))
        }
        Command::Points { .. } => {
            commands::map::resolve_coordinates(&state).await;
            print_json(&commands::map::list_map_points(&state))
        }
        Command::Render { light, no_hover, .. } => {
            let view = MapView {
                dark_mode: !light,
                disable_hover: no_hover,
                ..MapView::campus()
            };
            print_json(&commands::map::render_map(&state, view).await)
        }
        Command::Building { id } => {
            print_json(&commands::building::get_building(&state, &id).await?)
        }
        Command::Carousel { .. } => print_json(&commands::gallery::list_carousel(&state)),
        Command::Watch => watch(&state).await,
        Command::Style { .. } => Ok(()),
    }
}

#[derive(Serialize)]
struct ArchiveSummary {
    assets: usize,
    buildings: usize,
    interviews: usize,
    located: usize,
}

async fn summarize(state: &AppState) -> Result<(), AppError> {
    commands::map::resolve_coordinates(state).await;
    let summary = ArchiveSummary {
        assets: state.manifest().len(),
        buildings: state.buildings().len(),
        interviews: state.interviews().len(),
        located: commands::map::list_map_points(state).len(),
    };
    print_json(&summary)
}

async fn watch(state: &AppState) -> Result<(), AppError> {
    let watcher = FolderWatcher::new();
    let mut changes = watcher.watch_folder(&state.config().public_dir)?;
    summarize(state).await?;

    loop {
        tokio::select! {
            change = changes.recv() => {
                if change.is_none() {
                    break;
                }
                match state.rescan() {
                    Ok(count) => tracing::info!("Public directory changed, re-indexed {} assets", count),
                    Err(e) => {
                        tracing::warn!("Rescan failed: {}", e);
                        continue;
                    }
                }
                summarize(state).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch");
                break;
            }
        }
    }

    watcher.stop();
    Ok(())
}
