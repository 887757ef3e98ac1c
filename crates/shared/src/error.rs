use thiserror::Error;

/// Failure kinds of a playlist refresh.
///
/// `Network` is expected and recoverable by relying on the cache, `Storage`
/// is a local fault the caller has to see, and `Cancelled` means the owning
/// scope went away before the refresh finished.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("network error: {0}")]
    Network(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("refresh cancelled")]
    Cancelled,
}

impl PlaylistError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
