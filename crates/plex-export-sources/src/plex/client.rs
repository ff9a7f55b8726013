use crate::error::SourceError;
use crate::plex::api::{PlexHttpClient, ServerResource};
use crate::plex::auth;
use crate::traits::MovieLibrary;
use anyhow::Result;
use async_trait::async_trait;
use plex_export_models::{HistoryEntry, ItemLookup, MovieDetails, PlexCredentials};
use tracing::{debug, info, warn};

/// A connected Plex Media Server, bound to the account's auth token.
pub struct PlexServer {
    http: PlexHttpClient,
    url: String,
    name: String,
}

/// The movie-typed library section of a connected server. This is the
/// handle the export pipeline works against.
pub struct MovieSection {
    server: PlexServer,
    key: String,
    title: String,
}

impl PlexServer {
    /// Sign in and connect to the server named in the credentials.
    ///
    /// On failure the returned error is [`SourceError::ServerUnavailable`]
    /// carrying the names of every media server the account can see, so
    /// the caller can print them before aborting. No retry happens here.
    pub async fn connect(credentials: &PlexCredentials) -> Result<Self> {
        let bootstrap = reqwest::Client::new();
        let token =
            auth::sign_in(&bootstrap, &credentials.username, &credentials.password).await?;
        let http = PlexHttpClient::new(token)?;

        let resources = http.get_resources().await?;
        let servers: Vec<&ServerResource> =
            resources.iter().filter(|r| r.is_media_server()).collect();

        let Some(target) = servers
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(&credentials.server_name))
        else {
            return Err(unavailable(&credentials.server_name, &servers).into());
        };

        // Prefer local connections, then try the rest in order
        let mut candidates: Vec<&str> = Vec::new();
        for conn in target.connections.iter().filter(|c| c.local) {
            candidates.push(&conn.uri);
        }
        for conn in target.connections.iter().filter(|c| !c.local) {
            candidates.push(&conn.uri);
        }

        for uri in candidates {
            if http.check_connection(uri).await {
                info!("Connected to Plex server '{}' at {}", target.name, uri);
                return Ok(Self {
                    http,
                    url: uri.to_string(),
                    name: target.name.clone(),
                });
            }
            debug!("Plex server '{}': connection {} unreachable", target.name, uri);
        }

        Err(unavailable(&credentials.server_name, &servers).into())
    }

    /// Scan library sections in server order and take the first one typed
    /// "movie". No movie section is a fatal condition.
    pub async fn movie_section(self) -> Result<MovieSection> {
        let libraries = self.http.get_libraries(&self.url).await?;
        let Some(section) = libraries.iter().find(|l| l.type_ == "movie") else {
            return Err(SourceError::NoMovieSection {
                server: self.name.clone(),
            }
            .into());
        };

        debug!(
            "Using movie section '{}' (key {}) on '{}'",
            section.title, section.key, self.name
        );
        Ok(MovieSection {
            key: section.key.clone(),
            title: section.title.clone(),
            server: self,
        })
    }
}

impl MovieSection {
    pub fn title(&self) -> &str {
        &self.title
    }
}

fn unavailable(name: &str, servers: &[&ServerResource]) -> SourceError {
    SourceError::ServerUnavailable {
        name: name.to_string(),
        available: servers.iter().map(|s| s.name.clone()).collect(),
    }
}

#[async_trait]
impl MovieLibrary for MovieSection {
    fn server_name(&self) -> &str {
        &self.server.name
    }

    async fn watch_history(&self) -> Result<Vec<HistoryEntry>> {
        self.server
            .http
            .get_section_history(&self.server.url, &self.key)
            .await
    }

    async fn movie_by_title(&self, title: &str) -> Result<ItemLookup> {
        let matches = self
            .server
            .http
            .get_movies_by_title(&self.server.url, &self.key, title)
            .await?;

        // The server-side title filter is a substring match; require an
        // exact title, ignoring case
        let found: Option<&MovieDetails> = matches
            .iter()
            .find(|m| m.title.eq_ignore_ascii_case(title));

        match found {
            Some(movie) => Ok(ItemLookup::Found(movie.clone())),
            None => {
                if !matches.is_empty() {
                    warn!(
                        "Title '{}' matched {} items but none exactly",
                        title,
                        matches.len()
                    );
                }
                Ok(ItemLookup::NotFound)
            }
        }
    }
}
