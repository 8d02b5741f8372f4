use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use configuration::Settings;
use std::net::SocketAddr;
use std::path::PathBuf;

/// The main entry point for the starter service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file, if one exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve(ServeArgs::default()));

    let settings = configuration::load_config(command.config_path())
        .context("Failed to load configuration")?;
    // Held until exit so buffered file logs are flushed.
    let _log_guard = configuration::logging::init(&settings.logging)
        .context("Failed to initialize logging")?;

    match command {
        Commands::Serve(args) => handle_serve(args, settings).await,
        Commands::Migrate(_) => handle_migrate(settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small CRUD service: validated JSON routes over a relational store, plus a
/// scheduled job.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server and the job scheduler (the default).
    Serve(ServeArgs),
    /// Apply pending database migrations and exit.
    Migrate(ConfigArgs),
}

impl Commands {
    fn config_path(&self) -> Option<&std::path::Path> {
        match self {
            Commands::Serve(args) => args.config.config.as_deref(),
            Commands::Migrate(args) => args.config.as_deref(),
        }
    }
}

#[derive(Args, Default)]
struct ConfigArgs {
    /// Path to a TOML configuration file (default: ./config.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Default)]
struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Listen address, overriding `server.host`/`server.port`.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(addr) = args.addr {
        settings.server.host = addr.ip().to_string();
        settings.server.port = addr.port();
    }
    web_server::run_server(settings)
        .await
        .context("Server terminated with an error")
}

async fn handle_migrate(settings: Settings) -> anyhow::Result<()> {
    let pool = database::connect(&settings.database)
        .await
        .context("Failed to connect to the database")?;
    database::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    pool.close().await;
    tracing::info!("Migrations applied.");
    Ok(())
}
