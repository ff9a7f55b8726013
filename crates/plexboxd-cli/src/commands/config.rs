use super::prompts;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use plex_export_config::{Config, CredentialStore, ExportOptions, PathManager, PlexConfig, TmdbConfig};
use serde_json::json;
use std::path::PathBuf;

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output).await,
        crate::ConfigCommands::Plex {
            username,
            server_name,
        } => configure_plex(username, server_name, output).await,
        crate::ConfigCommands::Tmdb { api_key } => configure_tmdb(api_key, output).await,
        crate::ConfigCommands::Interactive => run_wizard(output).await,
    }
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!(
            "Configuration file not found at: {}",
            config_file.display()
        ));
        output.info("Run 'plexboxd config' to create one interactively.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file).map_err(|e| {
        color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e)
    })?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store.load().ok();
    let has_password = cred_store.get_plex_password().is_some();
    let tmdb_key = cred_store.get_tmdb_api_key().cloned().unwrap_or_default();

    match output.format() {
        crate::output::OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            table.set_header(vec![
                Cell::new("Setting").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
            ]);
            table.add_row(vec![
                Cell::new("Config file"),
                Cell::new(config_file.display().to_string()),
            ]);
            table.add_row(vec![
                Cell::new("Plex username"),
                Cell::new(&config.plex.username),
            ]);
            table.add_row(vec![
                Cell::new("Plex server"),
                Cell::new(&config.plex.server_name),
            ]);
            table.add_row(vec![
                Cell::new("Plex password"),
                Cell::new(if has_password { "stored" } else { "not set" }),
            ]);
            let key_display = if full {
                tmdb_key.clone()
            } else {
                mask_string(&tmdb_key)
            };
            table.add_row(vec![Cell::new("TMDB API key"), Cell::new(key_display)]);
            table.add_row(vec![
                Cell::new("Output path"),
                Cell::new(config.export.output_path.display().to_string()),
            ]);

            println!("{}", table);
        }
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "plex": {
                    "username": config.plex.username,
                    "server_name": config.plex.server_name,
                    "password_stored": has_password,
                },
                "tmdb": {
                    "api_key": if full { tmdb_key.clone() } else { mask_string(&tmdb_key) },
                },
                "export": {
                    "output_path": config.export.output_path.display().to_string(),
                },
            }));
        }
    }

    Ok(())
}

async fn configure_plex(
    username: Option<String>,
    server_name: Option<String>,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    let existing = Config::load_from_file(&path_manager.config_file()).ok();

    let username = match username {
        Some(u) => u,
        None => prompts::prompt_string(
            "Plex username",
            existing.as_ref().map(|c| c.plex.username.as_str()),
        )?,
    };
    let server_name = match server_name {
        Some(s) => s,
        None => prompts::prompt_string(
            "Plex server name",
            existing.as_ref().map(|c| c.plex.server_name.as_str()),
        )?,
    };
    let password = prompts::prompt_password("Plex password")?;

    let config = Config {
        plex: PlexConfig {
            username,
            server_name,
        },
        tmdb: existing
            .as_ref()
            .map(|c| TmdbConfig {
                enabled: c.tmdb.enabled,
            })
            .unwrap_or_default(),
        export: existing.map(|c| c.export).unwrap_or_default(),
    };
    config
        .save_to_file(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config: {}", e))?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store.load().ok();
    cred_store.set_plex_password(password);
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;

    output.success("Plex configuration saved.");
    Ok(())
}

async fn configure_tmdb(api_key: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    let api_key = match api_key {
        Some(k) => k,
        None => prompts::prompt_password("TMDB API key")?,
    };

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store.load().ok();
    cred_store.set_tmdb_api_key(api_key);
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;

    output.success("TMDB API key saved.");
    Ok(())
}

async fn run_wizard(output: &Output) -> Result<()> {
    output.info("Configuring plexboxd. Press Enter to accept defaults.");

    configure_plex(None, None, output).await?;
    configure_tmdb(None, output).await?;

    let path_manager = PathManager::default();
    let mut config = Config::load_from_file(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to reload config: {}", e))?;
    let current = config.export.output_path.display().to_string();
    let out_path = prompts::prompt_string("Output CSV path", Some(&current))?;
    config.export = ExportOptions {
        output_path: PathBuf::from(out_path),
    };
    config
        .save_to_file(&path_manager.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config: {}", e))?;

    if prompts::prompt_yes_no("Run an export now?", Some(false))? {
        super::export::run_export(None, output).await?;
    }

    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "not set".to_string();
    }
    let count = s.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let prefix: String = s.chars().take(2).collect();
    format!("{}{}", prefix, "*".repeat(count - 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "not set");
        assert_eq!(mask_string("abc"), "***");
        assert_eq!(mask_string("abcdef"), "ab****");
    }
}
