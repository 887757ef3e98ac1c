use std::sync::Arc;

use shared::{domain::VideoItem, error::PlaylistError};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::CacheRefresher;

/// Point-in-time copy of what the presentation layer is looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheState {
    pub items: Vec<VideoItem>,
    pub network_error_active: bool,
    pub network_error_acknowledged: bool,
}

/// Owns the state the presentation layer observes and schedules refreshes.
///
/// Items are forwarded straight from the store's live view. The error flags
/// only change when a refresh completes or the UI acknowledges an error.
/// Dropping the coordinator cancels every refresh it started.
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
    cancel: CancellationToken,
}

struct CoordinatorInner {
    refresher: Arc<CacheRefresher>,
    items: watch::Receiver<Vec<VideoItem>>,
    network_error_active: watch::Sender<bool>,
    network_error_acknowledged: watch::Sender<bool>,
    // FIFO, so overlapping refreshes commit in the order they were triggered.
    refresh_lock: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new(refresher: Arc<CacheRefresher>, items: watch::Receiver<Vec<VideoItem>>) -> Self {
        let (network_error_active, _) = watch::channel(false);
        let (network_error_acknowledged, _) = watch::channel(false);
        Self {
            inner: Arc::new(CoordinatorInner {
                refresher,
                items,
                network_error_active,
                network_error_acknowledged,
                refresh_lock: Mutex::new(()),
            }),
            cancel: CancellationToken::new(),
        }
    }

    /// Kicks off the initial refresh. Call once from the owning scope.
    pub fn start(&self) -> JoinHandle<Result<(), PlaylistError>> {
        info!("starting playlist refresh coordinator");
        self.trigger_refresh()
    }

    /// Schedules one refresh cycle on the runtime and returns immediately.
    ///
    /// Network failures and cancellation are absorbed into the error flags.
    /// Any other failure is returned through the join handle.
    pub fn trigger_refresh(&self) -> JoinHandle<Result<(), PlaylistError>> {
        let inner = Arc::clone(&self.inner);
        let cancel = self.cancel.child_token();
        tokio::spawn(async move { inner.run_refresh(cancel).await })
    }

    pub fn acknowledge_network_error(&self) {
        set_flag(&self.inner.network_error_acknowledged, true);
    }

    pub fn items(&self) -> watch::Receiver<Vec<VideoItem>> {
        self.inner.items.clone()
    }

    pub fn items_stream(&self) -> WatchStream<Vec<VideoItem>> {
        WatchStream::new(self.items())
    }

    pub fn network_error_active(&self) -> watch::Receiver<bool> {
        self.inner.network_error_active.subscribe()
    }

    pub fn network_error_acknowledged(&self) -> watch::Receiver<bool> {
        self.inner.network_error_acknowledged.subscribe()
    }

    pub fn snapshot(&self) -> CacheState {
        CacheState {
            items: self.inner.items.borrow().clone(),
            network_error_active: *self.inner.network_error_active.borrow(),
            network_error_acknowledged: *self.inner.network_error_acknowledged.borrow(),
        }
    }

    /// Cancels in-flight refreshes. Later triggers are cancelled immediately.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for RefreshCoordinator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl CoordinatorInner {
    async fn run_refresh(&self, cancel: CancellationToken) -> Result<(), PlaylistError> {
        let _serialized = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("refresh cancelled while waiting for previous refresh");
                return Ok(());
            }
            guard = self.refresh_lock.lock() => guard,
        };

        match self.refresher.refresh_with_cancel(&cancel).await {
            Ok(()) => {
                set_flag(&self.network_error_active, false);
                set_flag(&self.network_error_acknowledged, false);
                Ok(())
            }
            Err(PlaylistError::Network(message)) => {
                if self.items.borrow().is_empty() {
                    warn!(error = %message, "playlist refresh failed with nothing cached");
                    set_flag(&self.network_error_active, true);
                    set_flag(&self.network_error_acknowledged, false);
                } else {
                    debug!(error = %message, "playlist refresh failed; serving cached items");
                }
                Ok(())
            }
            Err(PlaylistError::Cancelled) => {
                debug!("playlist refresh cancelled");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "playlist refresh failed");
                Err(err)
            }
        }
    }
}

fn set_flag(flag: &watch::Sender<bool>, value: bool) {
    flag.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value;
        true
    });
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
