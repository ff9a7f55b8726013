use crate::plex::auth::CLIENT_IDENTIFIER;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use plex_export_models::{HistoryEntry, MovieDetails};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

const PLEX_TV_BASE_URL: &str = "https://plex.tv";
const PLEX_MEDIA_SERVER_PRODUCT: &str = "Plex Media Server";

#[derive(Debug, Clone)]
pub struct ServerResource {
    pub name: String,
    pub product: String,
    pub connections: Vec<ConnectionInfo>,
}

impl ServerResource {
    pub fn is_media_server(&self) -> bool {
        self.product == PLEX_MEDIA_SERVER_PRODUCT
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub uri: String,
    pub local: bool,
}

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub key: String,
    pub type_: String,
    pub title: String,
}

pub struct PlexHttpClient {
    client: Client,
    token: String,
}

impl PlexHttpClient {
    pub fn new(token: String) -> Result<Self> {
        let client = Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-token"),
                    reqwest::header::HeaderValue::from_str(&token)
                        .context("Invalid token format")?,
                );
                headers.insert(
                    reqwest::header::HeaderName::from_static("x-plex-client-identifier"),
                    reqwest::header::HeaderValue::from_static(CLIENT_IDENTIFIER),
                );
                headers
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, token })
    }

    /// List the resources (servers, players, ...) visible to the account.
    pub async fn get_resources(&self) -> Result<Vec<ServerResource>> {
        let url = format!("{}/api/v2/resources?includeHttps=1", PLEX_TV_BASE_URL);
        let response = self
            .client
            .get(&url)
            .header("X-Plex-Token", &self.token)
            .send()
            .await
            .context("Failed to get Plex resources")?;

        let json: Value = response
            .json()
            .await
            .context("Failed to parse resources response")?;

        let resources = parse_resources(&json);
        debug!("Plex resource discovery: found {} resources", resources.len());
        Ok(resources)
    }

    /// Cheap reachability probe for a candidate server URL.
    pub async fn check_connection(&self, server_url: &str) -> bool {
        let url = format!("{}/identity", server_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Plex connection probe to {} failed: {}", server_url, e);
                false
            }
        }
    }

    pub async fn get_libraries(&self, server_url: &str) -> Result<Vec<LibraryInfo>> {
        let url = format!("{}/library/sections", server_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to get libraries")?;

        let json: Value = response
            .json()
            .await
            .context("Failed to parse libraries response")?;

        Ok(parse_libraries(&json))
    }

    /// Watch history for one library section, in server order.
    pub async fn get_section_history(
        &self,
        server_url: &str,
        section_key: &str,
    ) -> Result<Vec<HistoryEntry>> {
        let url = format!(
            "{}/status/sessions/history/all?librarySectionID={}",
            server_url, section_key
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to get watch history")?;

        let json: Value = response
            .json()
            .await
            .context("Failed to parse watch history response")?;

        let history = parse_history(&json);
        debug!("Plex watch history: returning {} items", history.len());
        Ok(history)
    }

    /// All movies in a section whose title matches the query exactly
    /// (server-side filter; the caller decides what counts as a match).
    pub async fn get_movies_by_title(
        &self,
        server_url: &str,
        section_key: &str,
        title: &str,
    ) -> Result<Vec<MovieDetails>> {
        let url = format!(
            "{}/library/sections/{}/all?type=1&title={}",
            server_url,
            section_key,
            urlencoding::encode(title)
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to look up movie by title")?;

        let json: Value = response
            .json()
            .await
            .context("Failed to parse movie lookup response")?;

        Ok(parse_movie_items(&json))
    }
}

fn parse_timestamp(timestamp: Option<&Value>) -> Option<DateTime<Utc>> {
    timestamp
        .and_then(|t| t.as_i64())
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

fn parse_year(item: &Value) -> Option<u32> {
    item.get("year")
        .and_then(|y| y.as_u64().or_else(|| y.as_str().and_then(|s| s.parse::<u64>().ok())))
        .map(|y| y as u32)
}

pub(crate) fn parse_resources(json: &Value) -> Vec<ServerResource> {
    let mut resources = Vec::new();
    let Some(array) = json.as_array() else {
        return resources;
    };

    for resource in array {
        let name = resource
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("Unknown")
            .to_string();
        let product = resource
            .get("product")
            .and_then(|p| p.as_str())
            .unwrap_or("")
            .to_string();

        let mut connections = Vec::new();
        if let Some(conn_array) = resource.get("connections").and_then(|c| c.as_array()) {
            for conn in conn_array {
                if let Some(uri) = conn.get("uri").and_then(|u| u.as_str()) {
                    let local = conn.get("local").and_then(|l| l.as_bool()).unwrap_or(false);
                    connections.push(ConnectionInfo {
                        uri: uri.to_string(),
                        local,
                    });
                }
            }
        }

        resources.push(ServerResource {
            name,
            product,
            connections,
        });
    }

    resources
}

pub(crate) fn parse_libraries(json: &Value) -> Vec<LibraryInfo> {
    let mut libraries = Vec::new();
    let directories = json
        .get("MediaContainer")
        .and_then(|mc| mc.get("Directory"))
        .and_then(|d| d.as_array());

    if let Some(dir_array) = directories {
        for dir in dir_array {
            let key = dir
                .get("key")
                .and_then(|k| k.as_str())
                .unwrap_or("")
                .to_string();
            let type_ = dir
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or("")
                .to_string();
            let title = dir
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or("")
                .to_string();

            libraries.push(LibraryInfo { key, type_, title });
        }
    }

    libraries
}

pub(crate) fn parse_history(json: &Value) -> Vec<HistoryEntry> {
    let mut history = Vec::new();
    let Some(media_container) = json.get("MediaContainer") else {
        return history;
    };

    // Different server versions put history under "Metadata" or "Video"
    let items = media_container
        .get("Metadata")
        .or_else(|| media_container.get("Video"))
        .and_then(|v| v.as_array());

    if let Some(items_array) = items {
        for item in items_array {
            let title = item
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or("")
                .to_string();
            let rating_key = item
                .get("ratingKey")
                .and_then(|k| k.as_str())
                .map(|k| k.to_string())
                .or_else(|| item.get("ratingKey").and_then(|k| k.as_i64()).map(|k| k.to_string()))
                .unwrap_or_default();
            let viewed_at = parse_timestamp(item.get("viewedAt").or_else(|| item.get("lastViewedAt")));
            let year = parse_year(item);

            history.push(HistoryEntry {
                title,
                rating_key,
                viewed_at,
                year,
            });
        }
    }

    history
}

pub(crate) fn parse_movie_items(json: &Value) -> Vec<MovieDetails> {
    let mut movies = Vec::new();
    let items = json
        .get("MediaContainer")
        .and_then(|mc| mc.get("Metadata"))
        .and_then(|m| m.as_array());

    if let Some(items_array) = items {
        for item in items_array {
            let Some(title) = item.get("title").and_then(|t| t.as_str()) else {
                continue;
            };
            let rating_key = item
                .get("ratingKey")
                .and_then(|k| k.as_str())
                .unwrap_or("")
                .to_string();
            let year = parse_year(item);

            movies.push(MovieDetails {
                rating_key,
                title: title.to_string(),
                year,
            });
        }
    }

    movies
}
