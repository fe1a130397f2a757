use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::watchlist::Watchlist;
use crate::providers::traits::{WatchlistFeed, WatchlistStore};
use super::format;
use super::table::WatchlistTable;

/// Watchlist store persisted to a JSON file.
///
/// Every mutation is applied to a copy of the table, written to disk, and
/// only then committed and published. A failed write leaves both the file
/// and the published set unchanged.
pub struct JsonFileWatchlistStore {
    path: PathBuf,
    table: Mutex<WatchlistTable>,
    feed: watch::Sender<Vec<Watchlist>>,
}

impl JsonFileWatchlistStore {
    /// Open the store at `path`, creating an empty one if the file is missing.
    /// The file itself is written on the first mutation.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let table = match tokio::fs::read(&path).await {
            Ok(bytes) => WatchlistTable::from_rows(format::read_document(&bytes)?)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => WatchlistTable::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), watchlists = table.rows().len(), "watchlist store opened");

        let (feed, _) = watch::channel(table.snapshot());
        Ok(Self {
            path,
            table: Mutex::new(table),
            feed,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut WatchlistTable) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut table = self.table.lock().await;
        let mut next = table.clone();
        let out = op(&mut next)?;

        self.write(next.rows()).await?;
        *table = next;
        self.feed.send_replace(table.snapshot());
        Ok(out)
    }

    /// Write to a sibling temp file, then rename over the target.
    async fn write(&self, rows: &[Watchlist]) -> Result<(), CoreError> {
        let bytes = format::write_document(rows)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), rows = rows.len(), "watchlist store written");
        Ok(())
    }
}

#[async_trait]
impl WatchlistStore for JsonFileWatchlistStore {
    fn name(&self) -> &str {
        "JSON file"
    }

    async fn add(&self, watchlist: &Watchlist) -> Result<Watchlist, CoreError> {
        self.mutate(|table| table.insert(watchlist)).await
    }

    async fn update(&self, previous_name: &str, watchlist: &Watchlist) -> Result<(), CoreError> {
        self.mutate(|table| table.rename(previous_name, watchlist)).await
    }

    async fn remove(&self, watchlist: &Watchlist) -> Result<(), CoreError> {
        self.mutate(|table| table.remove(watchlist)).await.map(|_| ())
    }

    fn stream_all(&self) -> Result<WatchlistFeed, CoreError> {
        Ok(self.feed.subscribe())
    }
}
