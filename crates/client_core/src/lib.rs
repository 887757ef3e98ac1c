use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::{domain::VideoItem, error::PlaylistError, protocol::NetworkVideo};
use storage::Storage;
use tokio::sync::watch;

pub mod coordinator;
mod local_store;
pub mod refresher;
pub mod remote;

pub use coordinator::{CacheState, RefreshCoordinator};
pub use refresher::CacheRefresher;
pub use remote::HttpPlaylistSource;

/// Where fresh playlists come from.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fails with [`PlaylistError::Network`] on connectivity loss, timeout or a
    /// malformed response.
    async fn fetch_playlist(&self) -> std::result::Result<Vec<NetworkVideo>, PlaylistError>;
}

/// Persistent cache the presentation layer reads from.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Atomically swaps the whole cached sequence for `items`.
    async fn replace_all(&self, items: &[VideoItem]) -> std::result::Result<(), PlaylistError>;
    fn observe_all(&self) -> watch::Receiver<Vec<VideoItem>>;
}

/// SQLite cache plus the refresher bound to it.
pub struct PlaylistCache {
    storage: Storage,
    refresher: Arc<CacheRefresher>,
}

impl PlaylistCache {
    pub async fn initialize(database_url: &str, remote: Arc<dyn RemoteSource>) -> Result<Self> {
        let storage = Storage::new(database_url)
            .await
            .with_context(|| format!("failed to initialize playlist cache at '{database_url}'"))?;
        let refresher = Arc::new(CacheRefresher::new(remote, Arc::new(storage.clone())));
        Ok(Self { storage, refresher })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn refresher(&self) -> Arc<CacheRefresher> {
        Arc::clone(&self.refresher)
    }

    /// A coordinator over this cache. Nothing is fetched until it is started.
    pub fn coordinator(&self) -> RefreshCoordinator {
        RefreshCoordinator::new(self.refresher(), self.storage.observe_all())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
