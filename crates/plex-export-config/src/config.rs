use plex_export_models::PlexCredentials;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Relative path the CSV lands at when the config does not say otherwise.
pub const DEFAULT_OUTPUT_PATH: &str = "plex_watch_history.csv";

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub plex: PlexConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub export: ExportOptions,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlexConfig {
    pub username: String,
    /// Display name of the server to connect to, as shown in the Plex app.
    pub server_name: String,
}

/// The TMDB API key itself lives in the credential store, not here.
#[derive(Debug, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Combine the configured account with the stored password.
    ///
    /// No validation happens here; bad credentials surface as whatever
    /// error plex.tv returns at sign-in.
    pub fn plex_credentials(&self, password: String) -> PlexCredentials {
        PlexCredentials {
            username: self.plex.username.clone(),
            password,
            server_name: self.plex.server_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_round_trip() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            plex: PlexConfig {
                username: "user@example.com".to_string(),
                server_name: "Living Room".to_string(),
            },
            tmdb: TmdbConfig { enabled: true },
            export: ExportOptions::default(),
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.plex.username, "user@example.com");
        assert_eq!(loaded.plex.server_name, "Living Room");
        assert!(loaded.tmdb.enabled);
        assert_eq!(loaded.export.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
    }

    #[test]
    fn test_config_defaults_for_missing_sections() {
        let toml_str = r#"
            [plex]
            username = "user@example.com"
            server_name = "Den"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.tmdb.enabled);
        assert_eq!(config.export.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
    }

    #[test]
    fn test_plex_credentials_assembly() {
        let config = Config {
            plex: PlexConfig {
                username: "user@example.com".to_string(),
                server_name: "Den".to_string(),
            },
            tmdb: TmdbConfig::default(),
            export: ExportOptions::default(),
        };

        let creds = config.plex_credentials("hunter2".to_string());
        assert_eq!(creds.username, "user@example.com");
        assert_eq!(creds.password, "hunter2");
        assert_eq!(creds.server_name, "Den");
    }
}
