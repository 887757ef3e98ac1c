use async_trait::async_trait;
use shared::{domain::VideoItem, error::PlaylistError};
use storage::Storage;
use tokio::sync::watch;

use crate::LocalStore;

#[async_trait]
impl LocalStore for Storage {
    async fn replace_all(&self, items: &[VideoItem]) -> Result<(), PlaylistError> {
        Storage::replace_all(self, items)
            .await
            .map_err(|err| PlaylistError::storage(format!("{err:#}")))
    }

    fn observe_all(&self) -> watch::Receiver<Vec<VideoItem>> {
        Storage::observe_all(self)
    }
}
