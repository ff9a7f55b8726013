/// Plex account credentials and the display name of the target server.
///
/// Assembled once at startup from config + credential store and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct PlexCredentials {
    pub username: String,
    pub password: String,
    pub server_name: String,
}
