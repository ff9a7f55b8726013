use super::export_ui::ExportUI;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use plex_export_config::{Config, CredentialStore, PathManager};
use plex_export_core::{CsvSink, Exporter};
use plex_export_models::PlexCredentials;
use plex_export_sources::{PlexServer, SourceError, TmdbClient};
use std::path::PathBuf;

pub async fn run_export(output_path: Option<PathBuf>, output: &Output) -> Result<()> {
    tracing::debug!("Export command started");

    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let config = Config::load_from_file(&config_file).map_err(|e| {
        eyre!(
            "Failed to load config from {}: {}. Run 'plexboxd config' first.",
            config_file.display(),
            e
        )
    })?;

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load().map_err(|e| {
        eyre!(
            "Failed to load credentials from {}: {}",
            credentials_file.display(),
            e
        )
    })?;

    let password = cred_store
        .get_plex_password()
        .cloned()
        .ok_or_else(|| eyre!("No Plex password stored. Run 'plexboxd config plex' first."))?;
    let api_key = cred_store
        .get_tmdb_api_key()
        .cloned()
        .ok_or_else(|| eyre!("No TMDB API key stored. Run 'plexboxd config tmdb' first."))?;

    let credentials: PlexCredentials = config.plex_credentials(password);

    output.info(format!(
        "Connecting to Plex server: {}...",
        credentials.server_name
    ));

    let server = match PlexServer::connect(&credentials).await {
        Ok(server) => server,
        Err(e) => {
            output.error(format!(
                "Error connecting to server '{}': {}",
                credentials.server_name, e
            ));
            if let Some(SourceError::ServerUnavailable { available, .. }) =
                e.downcast_ref::<SourceError>()
            {
                if !available.is_empty() {
                    output.info("Available servers:");
                    for name in available {
                        output.info(format!("- {}", name));
                    }
                }
            }
            return Err(eyre!("could not establish a Plex session"));
        }
    };

    let section = server
        .movie_section()
        .await
        .map_err(|e| eyre!("{:#}", e))?;
    output.info(format!("Using movie library '{}'.", section.title()));

    let tmdb = TmdbClient::new(api_key);
    let out_path = output_path.unwrap_or_else(|| config.export.output_path.clone());

    output.info("Fetching watch history...");

    // The output file is only created once a session and movie section
    // exist; fatal failures above leave no file behind.
    let mut sink =
        CsvSink::create(&out_path).map_err(|e| eyre!("{:#}", e))?;

    let ui = ExportUI::new();
    let exporter = Exporter::new(&section, &tmdb);
    let stats = exporter
        .run(&mut sink, |processed, total| ui.update(processed, total))
        .await
        .map_err(|e| eyre!("Export failed: {:#}", e))?;
    ui.finish();

    output.info(format!("Found {} items in watch history.", stats.total));
    output.success(format!(
        "CSV file '{}' has been created successfully.",
        out_path.display()
    ));
    if stats.degraded > 0 || stats.skipped > 0 {
        output.warn("Some items may have incomplete information due to retrieval errors.");
    }

    Ok(())
}
