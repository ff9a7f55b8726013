use clap::{ArgAction, Parser, Subcommand};
use commands::{config, export};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "plexboxd")]
#[command(about = "Export your Plex movie watch history to a Letterboxd import CSV")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to this file (rotated daily) instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export watch history to a Letterboxd import CSV
    #[command(long_about = "Connect to the configured Plex server, read the movie library's watch history, enrich each title against TMDB, and write a Letterboxd-importable CSV. Items that fail to enrich are still written with empty ID columns.")]
    Export {
        /// Output CSV path (overrides the configured path)
        #[arg(short = 'o', long, value_name = "PATH")]
        output_path: Option<PathBuf>,
    },
    /// Configure credentials and settings
    #[command(long_about = "Manage configuration and credentials. Use subcommands to view or modify the Plex account, server name, and TMDB API key. Running without a subcommand starts the interactive configuration wizard.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure the Plex account and target server
    Plex {
        /// Plex account username (if not provided, will prompt)
        #[arg(long)]
        username: Option<String>,

        /// Display name of the Plex server to export from
        #[arg(long)]
        server_name: Option<String>,
    },

    /// Configure the TMDB API key
    Tmdb {
        /// TMDB API key (if not provided, will prompt)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Interactive configuration wizard
    Interactive,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging_with_file(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Export { output_path } => export::run_export(output_path, &output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Interactive);
            config::run_config(cmd, &output).await
        }
    }
}
