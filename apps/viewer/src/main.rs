use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{HttpPlaylistSource, PlaylistCache, RefreshCoordinator};
use futures::{stream::FuturesUnordered, StreamExt};
use shared::domain::VideoItem;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_database_url};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long)]
    playlist_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the playlist once and replace the local cache.
    Refresh,
    /// Print the cached playlist without touching the network.
    List,
    /// Keep the cache fresh and print every update until Ctrl-C.
    Watch {
        #[arg(long, default_value_t = 900)]
        refresh_every_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(v) = cli.playlist_url {
        settings.playlist_url = v;
    }
    if let Some(v) = cli.database_url {
        settings.database_url = v;
    }

    let playlist_url = settings.playlist_url()?;
    let database_url = normalize_database_url(&settings.database_url);
    let remote = HttpPlaylistSource::with_timeout(playlist_url, settings.request_timeout())?;
    info!(playlist_url = %remote.playlist_url(), %database_url, "opening playlist cache");
    let cache = PlaylistCache::initialize(&database_url, Arc::new(remote))
        .await
        .map_err(|error| {
            error!(%database_url, %error, "failed to open playlist cache");
            error
        })?;

    match cli.command {
        Command::Refresh => {
            cache.storage().health_check().await?;
            cache
                .refresher()
                .refresh()
                .await
                .context("playlist refresh failed")?;
            let items = cache.storage().load_all().await?;
            println!("cached {} videos", items.len());
        }
        Command::List => {
            print_items(&cache.storage().load_all().await?);
        }
        Command::Watch { refresh_every_secs } => {
            watch(
                cache.coordinator(),
                Duration::from_secs(refresh_every_secs.max(1)),
            )
            .await?;
        }
    }

    Ok(())
}

async fn watch(coordinator: RefreshCoordinator, refresh_every: Duration) -> Result<()> {
    let mut items = coordinator.items();
    let mut error_active = coordinator.network_error_active();
    let mut refreshes = FuturesUnordered::new();
    let mut ticker = tokio::time::interval(refresh_every);
    ticker.tick().await;

    print_items(&items.borrow_and_update());
    refreshes.push(coordinator.start());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("shutting down");
                coordinator.shutdown();
                break;
            }
            changed = items.changed() => {
                changed?;
                print_items(&items.borrow_and_update());
            }
            changed = error_active.changed() => {
                changed?;
                let active = *error_active.borrow_and_update();
                if active && !*coordinator.network_error_acknowledged().borrow() {
                    eprintln!("network error: no cached playlist to show yet");
                    coordinator.acknowledge_network_error();
                }
            }
            _ = ticker.tick() => {
                refreshes.push(coordinator.trigger_refresh());
            }
            Some(joined) = refreshes.next() => {
                joined.context("refresh task panicked")??;
            }
        }
    }

    while let Some(joined) = refreshes.next().await {
        joined.context("refresh task panicked")??;
    }
    Ok(())
}

fn print_items(items: &[VideoItem]) {
    if items.is_empty() {
        println!("(no cached videos)");
        return;
    }
    for (index, item) in items.iter().enumerate() {
        println!("{:>3}. {}", index + 1, item.title);
        println!("     {}", item.short_description());
        println!("     {}", item.url);
    }
}
