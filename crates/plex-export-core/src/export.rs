use crate::writer::CsvSink;
use anyhow::Result;
use plex_export_models::export_row::letterboxd_uri;
use plex_export_models::{ExportRow, HistoryEntry, ItemLookup};
use plex_export_sources::{MetadataProvider, MovieLibrary};
use std::io::Write;
use tracing::{info, warn};

/// Tally of one export run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportStats {
    pub total: usize,
    /// Rows written, including degraded ones.
    pub exported: usize,
    /// Rows written from sparse-record fallback after a NotFound lookup.
    pub degraded: usize,
    /// Items dropped by the per-item error boundary; no row written.
    pub skipped: usize,
}

impl ExportStats {
    fn log_summary(&self) {
        if self.skipped > 0 {
            warn!(
                "Export completed: {} of {} items written ({} degraded, {} skipped on error)",
                self.exported, self.total, self.degraded, self.skipped
            );
        } else {
            info!(
                "Export completed: {} of {} items written ({} degraded)",
                self.exported, self.total, self.degraded
            );
        }
    }
}

/// Runs the history -> resolve -> enrich -> CSV pipeline.
///
/// Items are processed strictly one at a time; an item is fully resolved,
/// enriched, and written before the next begins. Errors never cross item
/// boundaries.
pub struct Exporter<'a> {
    library: &'a dyn MovieLibrary,
    metadata: &'a dyn MetadataProvider,
}

struct ProcessedEntry {
    row: ExportRow,
    degraded: bool,
}

impl<'a> Exporter<'a> {
    pub fn new(library: &'a dyn MovieLibrary, metadata: &'a dyn MetadataProvider) -> Self {
        Self { library, metadata }
    }

    /// Export the full watch history into `sink`.
    ///
    /// `progress` is invoked once per item with (processed, total) after
    /// the item either produced a row or was skipped.
    pub async fn run<W, F>(&self, sink: &mut CsvSink<W>, mut progress: F) -> Result<ExportStats>
    where
        W: Write,
        F: FnMut(usize, usize),
    {
        let history = self.library.watch_history().await?;
        let total = history.len();
        info!(
            "Found {} items in watch history on '{}'",
            total,
            self.library.server_name()
        );

        sink.write_header()?;

        let mut stats = ExportStats {
            total,
            ..Default::default()
        };

        for (idx, entry) in history.iter().enumerate() {
            // Per-item boundary: lookup NotFound already degraded into a
            // row by this point, so anything landing in Err here is an
            // unexpected failure and the row is dropped, not half-written.
            let outcome = async {
                let processed = self.process_entry(entry).await?;
                sink.write_row(&processed.row)?;
                Ok::<bool, anyhow::Error>(processed.degraded)
            }
            .await;

            match outcome {
                Ok(degraded) => {
                    stats.exported += 1;
                    if degraded {
                        stats.degraded += 1;
                    }
                }
                Err(e) => {
                    warn!("Error processing '{}': {:#}", entry.title, e);
                    stats.skipped += 1;
                }
            }

            progress(idx + 1, total);
        }

        sink.flush()?;
        stats.log_summary();
        Ok(stats)
    }

    async fn process_entry(&self, entry: &HistoryEntry) -> Result<ProcessedEntry> {
        let (title, year, degraded) = match self.library.movie_by_title(&entry.title).await? {
            ItemLookup::Found(movie) => (movie.title, movie.year, false),
            ItemLookup::NotFound => {
                warn!(
                    "Unable to find item with rating key {}; using history fields",
                    entry.rating_key
                );
                (entry.title.clone(), entry.year, true)
            }
        };

        // The viewed timestamp only exists on the history entry; the
        // re-fetched item knows nothing about individual viewings.
        let watched_date = entry
            .viewed_at
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        let (tmdb_id, imdb_id) = match self.metadata.search_movie(&title, year).await? {
            Some(found) => (found.id.to_string(), self.metadata.imdb_id(found.id).await?),
            None => (String::new(), String::new()),
        };

        let row = ExportRow {
            letterboxd_uri: letterboxd_uri(&imdb_id),
            title,
            year,
            watched_date,
            tmdb_id,
            imdb_id,
        };

        Ok(ProcessedEntry { row, degraded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use plex_export_models::MovieDetails;
    use plex_export_sources::TmdbMatch;
    use std::collections::{HashMap, HashSet};

    struct StubLibrary {
        entries: Vec<HistoryEntry>,
        movies: HashMap<String, MovieDetails>,
        failing_titles: HashSet<String>,
    }

    impl StubLibrary {
        fn new(entries: Vec<HistoryEntry>) -> Self {
            Self {
                entries,
                movies: HashMap::new(),
                failing_titles: HashSet::new(),
            }
        }

        fn with_movie(mut self, movie: MovieDetails) -> Self {
            self.movies.insert(movie.title.to_lowercase(), movie);
            self
        }

        fn with_failing_title(mut self, title: &str) -> Self {
            self.failing_titles.insert(title.to_string());
            self
        }
    }

    #[async_trait]
    impl MovieLibrary for StubLibrary {
        fn server_name(&self) -> &str {
            "Test Server"
        }

        async fn watch_history(&self) -> Result<Vec<HistoryEntry>> {
            Ok(self.entries.clone())
        }

        async fn movie_by_title(&self, title: &str) -> Result<ItemLookup> {
            if self.failing_titles.contains(title) {
                return Err(anyhow!("section scan failed"));
            }
            match self.movies.get(&title.to_lowercase()) {
                Some(movie) => Ok(ItemLookup::Found(movie.clone())),
                None => Ok(ItemLookup::NotFound),
            }
        }
    }

    #[derive(Default)]
    struct StubMetadata {
        // title -> (tmdb id, imdb id)
        matches: HashMap<String, (u64, String)>,
    }

    impl StubMetadata {
        fn with_match(mut self, title: &str, tmdb_id: u64, imdb_id: &str) -> Self {
            self.matches
                .insert(title.to_string(), (tmdb_id, imdb_id.to_string()));
            self
        }
    }

    #[async_trait]
    impl MetadataProvider for StubMetadata {
        async fn search_movie(
            &self,
            title: &str,
            _year: Option<u32>,
        ) -> Result<Option<TmdbMatch>> {
            Ok(self.matches.get(title).map(|(id, _)| TmdbMatch {
                id: *id,
                title: Some(title.to_string()),
                release_date: None,
            }))
        }

        async fn imdb_id(&self, tmdb_id: u64) -> Result<String> {
            Ok(self
                .matches
                .values()
                .find(|(id, _)| *id == tmdb_id)
                .map(|(_, imdb)| imdb.clone())
                .unwrap_or_default())
        }
    }

    fn entry(title: &str, rating_key: &str) -> HistoryEntry {
        HistoryEntry {
            title: title.to_string(),
            rating_key: rating_key.to_string(),
            viewed_at: None,
            year: None,
        }
    }

    async fn run_to_string(
        library: &StubLibrary,
        metadata: &StubMetadata,
    ) -> (String, ExportStats) {
        let mut sink = CsvSink::new(Vec::new());
        let exporter = Exporter::new(library, metadata);
        let stats = exporter.run(&mut sink, |_, _| {}).await.unwrap();
        let content = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        (content, stats)
    }

    #[tokio::test]
    async fn test_full_enrichment_scenario() {
        let mut watched = entry("Inception", "101");
        watched.viewed_at = Some(Utc.with_ymd_and_hms(2021, 5, 1, 20, 15, 0).unwrap());

        let library = StubLibrary::new(vec![watched]).with_movie(MovieDetails {
            rating_key: "101".to_string(),
            title: "Inception".to_string(),
            year: Some(2010),
        });
        let metadata = StubMetadata::default().with_match("Inception", 27205, "tt1375666");

        let (content, stats) = run_to_string(&library, &metadata).await;
        assert_eq!(
            content,
            "Title,Year,WatchedDate,tmdbID,imdbID,LetterboxdURI\n\
             Inception,2010,2021-05-01,27205,tt1375666,https://boxd.it/1375666\n"
        );
        assert_eq!(stats.exported, 1);
        assert_eq!(stats.degraded, 0);
        assert_eq!(stats.skipped, 0);
    }

    #[tokio::test]
    async fn test_not_found_falls_back_to_sparse_fields() {
        // No matching library item, no year, no viewed timestamp
        let library = StubLibrary::new(vec![entry("Ghost Movie", "999")]);
        let metadata = StubMetadata::default();

        let (content, stats) = run_to_string(&library, &metadata).await;
        assert_eq!(
            content,
            "Title,Year,WatchedDate,tmdbID,imdbID,LetterboxdURI\n\
             Ghost Movie,,,,,\n"
        );
        assert_eq!(stats.exported, 1);
        assert_eq!(stats.degraded, 1);
    }

    #[tokio::test]
    async fn test_not_found_still_derives_watched_date() {
        let mut watched = entry("Ghost Movie", "999");
        watched.viewed_at = Some(Utc.with_ymd_and_hms(2022, 12, 31, 3, 0, 0).unwrap());
        watched.year = Some(1988);

        let library = StubLibrary::new(vec![watched]);
        let metadata = StubMetadata::default();

        let (content, _) = run_to_string(&library, &metadata).await;
        assert!(content.contains("Ghost Movie,1988,2022-12-31,,,"));
    }

    #[tokio::test]
    async fn test_zero_search_results_degrade_silently() {
        let library = StubLibrary::new(vec![entry("Obscure Film", "5")]).with_movie(
            MovieDetails {
                rating_key: "5".to_string(),
                title: "Obscure Film".to_string(),
                year: Some(1971),
            },
        );
        let metadata = StubMetadata::default();

        let (content, stats) = run_to_string(&library, &metadata).await;
        assert!(content.contains("Obscure Film,1971,,,,"));
        assert_eq!(stats.degraded, 0);
        assert_eq!(stats.skipped, 0);
    }

    #[tokio::test]
    async fn test_unexpected_error_skips_row_and_continues() {
        let library = StubLibrary::new(vec![
            entry("First", "1"),
            entry("Broken", "2"),
            entry("Third", "3"),
        ])
        .with_failing_title("Broken");
        let metadata = StubMetadata::default();

        let (content, stats) = run_to_string(&library, &metadata).await;
        let lines: Vec<&str> = content.lines().collect();
        // Header plus two data rows; the failing item produced nothing
        assert_eq!(lines.len(), 3);
        assert!(!content.contains("Broken"));
        assert_eq!(stats.exported, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.total, 3);
    }

    #[tokio::test]
    async fn test_row_count_bounded_by_history_length() {
        let library = StubLibrary::new(vec![
            entry("A", "1"),
            entry("B", "2"),
            entry("C", "3"),
            entry("D", "4"),
        ]);
        let metadata = StubMetadata::default();

        let (content, _) = run_to_string(&library, &metadata).await;
        let lines = content.lines().count();
        assert!(lines >= 1 && lines <= 5);
    }

    #[tokio::test]
    async fn test_progress_reported_once_per_item() {
        let library = StubLibrary::new(vec![entry("A", "1"), entry("B", "2")]);
        let metadata = StubMetadata::default();

        let mut seen = Vec::new();
        let mut sink = CsvSink::new(Vec::new());
        Exporter::new(&library, &metadata)
            .run(&mut sink, |processed, total| seen.push((processed, total)))
            .await
            .unwrap();

        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical() {
        let mut watched = entry("Inception", "101");
        watched.viewed_at = Some(Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).unwrap());

        let library = StubLibrary::new(vec![watched]).with_movie(MovieDetails {
            rating_key: "101".to_string(),
            title: "Inception".to_string(),
            year: Some(2010),
        });
        let metadata = StubMetadata::default().with_match("Inception", 27205, "tt1375666");

        let (first, _) = run_to_string(&library, &metadata).await;
        let (second, _) = run_to_string(&library, &metadata).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_history_writes_header_only() {
        let library = StubLibrary::new(Vec::new());
        let metadata = StubMetadata::default();

        let (content, stats) = run_to_string(&library, &metadata).await;
        assert_eq!(content, "Title,Year,WatchedDate,tmdbID,imdbID,LetterboxdURI\n");
        assert_eq!(stats.total, 0);
        assert_eq!(stats.exported, 0);
    }
}
