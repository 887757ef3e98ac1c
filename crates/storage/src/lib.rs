use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite, Transaction,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use shared::domain::VideoItem;

/// SQLite-backed playlist cache.
///
/// The persisted `videos` table is the only source of truth. Every committed
/// write is pushed to observers through a watch channel that always holds the
/// full current sequence.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
    videos: Arc<watch::Sender<Vec<VideoItem>>>,
    write_lock: Arc<Mutex<()>>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        let current = load_videos(&pool)
            .await
            .context("failed to load cached playlist")?;
        let (videos, _) = watch::channel(current);

        Ok(Self {
            pool,
            videos: Arc::new(videos),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Replaces the whole cached playlist in one transaction.
    ///
    /// Rows absent from `items` are dropped. Readers see either the previous
    /// sequence or the new one, and observers are notified in commit order.
    pub async fn replace_all(&self, items: &[VideoItem]) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to open playlist transaction")?;

        if let Err(err) = write_videos(&mut tx, items).await {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "failed to roll back playlist transaction");
            }
            return Err(err);
        }

        tx.commit()
            .await
            .context("failed to commit playlist transaction")?;

        debug!(item_count = items.len(), "cached playlist replaced");
        self.videos.send_replace(items.to_vec());
        Ok(())
    }

    pub async fn load_all(&self) -> Result<Vec<VideoItem>> {
        load_videos(&self.pool).await
    }

    /// Live view of the cached playlist, starting from the last committed value.
    pub fn observe_all(&self) -> watch::Receiver<Vec<VideoItem>> {
        self.videos.subscribe()
    }
}

async fn write_videos(tx: &mut Transaction<'_, Sqlite>, items: &[VideoItem]) -> Result<()> {
    sqlx::query("DELETE FROM videos")
        .execute(&mut **tx)
        .await
        .context("failed to clear cached playlist")?;

    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO videos (position, title, description, url, thumbnail_url)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(i64::try_from(position).unwrap_or(i64::MAX))
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.url)
        .bind(&item.thumbnail_url)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("failed to cache video '{}'", item.url))?;
    }

    Ok(())
}

async fn load_videos(pool: &Pool<Sqlite>) -> Result<Vec<VideoItem>> {
    let rows = sqlx::query(
        "SELECT title, description, url, thumbnail_url FROM videos ORDER BY position ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| VideoItem {
            title: r.get::<String, _>(0),
            description: r.get::<String, _>(1),
            url: r.get::<String, _>(2),
            thumbnail_url: r.get::<String, _>(3),
        })
        .collect())
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
