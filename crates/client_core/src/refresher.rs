use std::sync::Arc;

use shared::{domain::VideoItem, error::PlaylistError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{LocalStore, RemoteSource};

/// Runs one fetch-transform-replace cycle against the injected collaborators.
///
/// A failed fetch leaves the store untouched and a store failure is reported
/// as [`PlaylistError::Storage`], never as a network error. Retrying is the
/// caller's business.
pub struct CacheRefresher {
    remote: Arc<dyn RemoteSource>,
    store: Arc<dyn LocalStore>,
}

impl CacheRefresher {
    pub fn new(remote: Arc<dyn RemoteSource>, store: Arc<dyn LocalStore>) -> Self {
        Self { remote, store }
    }

    pub async fn refresh(&self) -> Result<(), PlaylistError> {
        self.refresh_with_cancel(&CancellationToken::new()).await
    }

    /// Same as [`refresh`](Self::refresh) but gives up with
    /// [`PlaylistError::Cancelled`] once `cancel` fires.
    ///
    /// Cancellation is honoured while waiting on the network and right before
    /// the write. Once the write has started it runs to completion, so the
    /// store only ever holds the old or the new playlist.
    pub async fn refresh_with_cancel(&self, cancel: &CancellationToken) -> Result<(), PlaylistError> {
        if cancel.is_cancelled() {
            return Err(PlaylistError::Cancelled);
        }

        let playlist = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PlaylistError::Cancelled),
            fetched = self.remote.fetch_playlist() => fetched?,
        };

        let items: Vec<VideoItem> = playlist.into_iter().map(VideoItem::from).collect();

        if cancel.is_cancelled() {
            debug!(item_count = items.len(), "refresh cancelled before cache write");
            return Err(PlaylistError::Cancelled);
        }

        self.store.replace_all(&items).await?;
        info!(item_count = items.len(), "playlist cache refreshed");
        Ok(())
    }

    pub fn observe_all(&self) -> watch::Receiver<Vec<VideoItem>> {
        self.store.observe_all()
    }
}

#[cfg(test)]
#[path = "tests/refresher_tests.rs"]
mod tests;
