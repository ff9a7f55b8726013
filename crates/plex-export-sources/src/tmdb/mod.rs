use crate::traits::MetadataProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// First match from a TMDB movie search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbMatch {
    pub id: u64,
    pub title: Option<String>,
    #[serde(rename = "release_date")]
    pub release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<TmdbMatch>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(rename = "imdb_id")]
    imdb_id: Option<String>,
}

pub struct TmdbClient {
    client: Client,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    /// Search for a movie by title and optional year.
    ///
    /// Returns the first result, or `None` when the search misses — a
    /// non-200 status counts as a miss, not an error. Title+year search is
    /// usually unambiguous for commercial films, so there is no further
    /// disambiguation.
    pub async fn search_movie(&self, title: &str, year: Option<u32>) -> Result<Option<TmdbMatch>> {
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("query", title.to_string()),
        ];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }

        let url = format!("{}/search/movie", TMDB_BASE_URL);
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .context("Failed to reach TMDB search endpoint")?;

        if !response.status().is_success() {
            debug!("TMDB search for '{}' returned {}", title, response.status());
            return Ok(None);
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse TMDB search response")?;

        Ok(body.results.into_iter().next())
    }

    /// Cross-reference a TMDB id to an IMDB id via the details endpoint.
    /// Misses (non-200, field absent or null) yield an empty string.
    pub async fn imdb_id(&self, tmdb_id: u64) -> Result<String> {
        let url = format!("{}/movie/{}", TMDB_BASE_URL, tmdb_id);
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.clone())])
            .send()
            .await
            .context("Failed to reach TMDB details endpoint")?;

        if !response.status().is_success() {
            debug!("TMDB details for {} returned {}", tmdb_id, response.status());
            return Ok(String::new());
        }

        let body: DetailsResponse = response
            .json()
            .await
            .context("Failed to parse TMDB details response")?;

        Ok(body.imdb_id.unwrap_or_default())
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search_movie(&self, title: &str, year: Option<u32>) -> Result<Option<TmdbMatch>> {
        TmdbClient::search_movie(self, title, year).await
    }

    async fn imdb_id(&self, tmdb_id: u64) -> Result<String> {
        TmdbClient::imdb_id(self, tmdb_id).await
    }
}
