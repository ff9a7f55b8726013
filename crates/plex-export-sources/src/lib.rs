pub mod error;
pub mod plex;
pub mod tmdb;
pub mod traits;

pub use error::SourceError;
pub use plex::client::{MovieSection, PlexServer};
pub use tmdb::{TmdbClient, TmdbMatch};
pub use traits::{MetadataProvider, MovieLibrary};
