use crate::tmdb::TmdbMatch;
use anyhow::Result;
use async_trait::async_trait;
use plex_export_models::{HistoryEntry, ItemLookup};

/// A movie library that can list its watch history and re-fetch items by
/// title. Implemented by [`crate::PlexServer`]; the export pipeline only
/// sees this trait so it can run against stubs in tests.
#[async_trait]
pub trait MovieLibrary: Send + Sync {
    /// Display name of the backing server, for messages.
    fn server_name(&self) -> &str;

    /// Full watch history of the movie section, in server order.
    async fn watch_history(&self) -> Result<Vec<HistoryEntry>>;

    /// Look up a full item by exact title. `Ok(NotFound)` means the title
    /// no longer matches anything; transport failures stay in `Err`.
    async fn movie_by_title(&self, title: &str) -> Result<ItemLookup>;
}

/// External metadata lookup used to enrich rows.
///
/// HTTP-level misses (non-200, empty result sets, absent fields) are
/// swallowed into `Ok(None)` / empty strings; only transport errors reach
/// the `Err` branch, where the per-item boundary will skip the row.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search_movie(&self, title: &str, year: Option<u32>) -> Result<Option<TmdbMatch>>;

    async fn imdb_id(&self, tmdb_id: u64) -> Result<String>;
}
