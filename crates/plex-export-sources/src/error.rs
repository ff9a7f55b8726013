use thiserror::Error;

/// Fatal source-side failures that abort the run.
///
/// `ServerUnavailable` carries the names of every Plex Media Server
/// resource the account can see, so the CLI can print them as a diagnostic
/// before exiting.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Plex sign-in failed with status {status}")]
    SignInFailed { status: u16 },

    #[error("could not connect to Plex server '{name}'")]
    ServerUnavailable { name: String, available: Vec<String> },

    #[error("no movie library found on server '{server}'")]
    NoMovieSection { server: String },
}
