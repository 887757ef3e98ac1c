use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use shared::{domain::VideoItem, error::PlaylistError, protocol::NetworkVideo};
use tokio::sync::{watch, Mutex, Notify};
use tokio_util::sync::CancellationToken;

use crate::{LocalStore, RemoteSource};

pub(crate) fn network_video(title: &str) -> NetworkVideo {
    NetworkVideo {
        title: title.to_string(),
        description: format!("{title} description"),
        url: format!("https://videos.example/{title}"),
        updated: "2019-03-01T00:00:00+00:00".to_string(),
        thumbnail: format!("https://videos.example/{title}.jpg"),
        closed_captions: None,
    }
}

pub(crate) fn video_item(title: &str) -> VideoItem {
    network_video(title).into()
}

pub(crate) fn offline() -> Result<Vec<NetworkVideo>, PlaylistError> {
    Err(PlaylistError::network("connection refused"))
}

pub(crate) fn playlist(titles: &[&str]) -> Result<Vec<NetworkVideo>, PlaylistError> {
    Ok(titles.iter().map(|title| network_video(title)).collect())
}

/// Remote that replays canned responses in order.
pub(crate) struct ScriptedRemote {
    responses: Mutex<VecDeque<Result<Vec<NetworkVideo>, PlaylistError>>>,
    calls: AtomicUsize,
    started: Notify,
    hold_first: Option<Arc<Notify>>,
}

impl ScriptedRemote {
    pub(crate) fn new(
        responses: impl IntoIterator<Item = Result<Vec<NetworkVideo>, PlaylistError>>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
            started: Notify::new(),
            hold_first: None,
        }
    }

    /// The first fetch parks until `gate` is notified.
    pub(crate) fn holding_first_call(mut self, gate: Arc<Notify>) -> Self {
        self.hold_first = Some(gate);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) async fn wait_started(&self) {
        self.started.notified().await;
    }
}

#[async_trait]
impl RemoteSource for ScriptedRemote {
    async fn fetch_playlist(&self) -> Result<Vec<NetworkVideo>, PlaylistError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();

        if call == 0 {
            if let Some(gate) = &self.hold_first {
                gate.notified().await;
            }
        }

        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(PlaylistError::network("no scripted response left")))
    }
}

/// Remote whose fetch completes in the same poll that cancels `cancel`.
pub(crate) struct CancelOnFetchRemote {
    cancel: CancellationToken,
    titles: Vec<&'static str>,
}

impl CancelOnFetchRemote {
    pub(crate) fn new(cancel: CancellationToken, titles: Vec<&'static str>) -> Self {
        Self { cancel, titles }
    }
}

#[async_trait]
impl RemoteSource for CancelOnFetchRemote {
    async fn fetch_playlist(&self) -> Result<Vec<NetworkVideo>, PlaylistError> {
        self.cancel.cancel();
        playlist(&self.titles)
    }
}

/// Store whose writes always fail, as on a full disk.
pub(crate) struct FailingStore {
    items: watch::Sender<Vec<VideoItem>>,
}

impl FailingStore {
    pub(crate) fn new(seed: Vec<VideoItem>) -> Self {
        let (items, _) = watch::channel(seed);
        Self { items }
    }
}

#[async_trait]
impl LocalStore for FailingStore {
    async fn replace_all(&self, _items: &[VideoItem]) -> Result<(), PlaylistError> {
        Err(PlaylistError::storage("database or disk is full"))
    }

    fn observe_all(&self) -> watch::Receiver<Vec<VideoItem>> {
        self.items.subscribe()
    }
}
