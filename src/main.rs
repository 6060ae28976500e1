use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// The main entry point for the Papertrade simulator.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables (DATABASE_URL and friends) from .env if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve(args).await?,
        Commands::Migrate => migrate().await?,
    }

    Ok(())
}

/// A browser-facing stock-trading simulator with a persistent ledger.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    Serve(ServeArgs),
    /// Apply pending database migrations and exit.
    Migrate,
}

#[derive(Parser)]
struct ServeArgs {
    /// Override the bind host from config.toml.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port from config.toml.
    #[arg(long)]
    port: Option<u16>,
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = configuration::load_config()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    web_server::run_server(config).await
}

async fn migrate() -> anyhow::Result<()> {
    let pool = database::connect().await?;
    database::run_migrations(&pool).await?;
    tracing::info!("Migrations applied.");
    Ok(())
}
