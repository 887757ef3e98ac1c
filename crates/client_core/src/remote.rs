use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::PlaylistError,
    protocol::{NetworkVideo, NetworkVideoContainer},
};
use tracing::debug;
use url::Url;

use crate::RemoteSource;

/// Fetches the playlist as JSON over HTTP(S) with an injected client.
pub struct HttpPlaylistSource {
    http: Client,
    playlist_url: Url,
}

impl HttpPlaylistSource {
    pub fn new(http: Client, playlist_url: Url) -> Self {
        Self { http, playlist_url }
    }

    pub fn with_timeout(playlist_url: Url, timeout: Duration) -> Result<Self, PlaylistError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlaylistError::network(format!("failed to build http client: {e}")))?;
        Ok(Self::new(http, playlist_url))
    }

    pub fn playlist_url(&self) -> &Url {
        &self.playlist_url
    }
}

#[async_trait]
impl RemoteSource for HttpPlaylistSource {
    async fn fetch_playlist(&self) -> Result<Vec<NetworkVideo>, PlaylistError> {
        let url = self.playlist_url.as_str();
        let container: NetworkVideoContainer = self
            .http
            .get(self.playlist_url.clone())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| PlaylistError::network(format!("playlist request to {url} failed: {e}")))?
            .json()
            .await
            .map_err(|e| PlaylistError::network(format!("invalid playlist payload from {url}: {e}")))?;

        debug!(url, item_count = container.videos.len(), "playlist fetched");
        Ok(container.videos)
    }
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
