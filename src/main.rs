mod config;
mod github;
mod llm;
mod uml;
mod web;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::github::GitHubClient;
use crate::llm::OpenAiClient;
use crate::web::start_server;

#[derive(Parser)]
#[command(name = "umlforge")]
#[command(version)]
#[command(about = "Turn GitHub repositories into PlantUML class diagrams")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve,
}

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub github: GitHubClient,
    pub llm: OpenAiClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets commonly live in a local .env during development.
    dotenvy::dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().or_else(Config::default_config_path);
    let config = Config::load(cli.config.as_deref())?;

    tracing::info!(
        "Config path: {}",
        config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none, using defaults)".to_string())
    );

    let missing = config.missing_credentials();
    if missing.is_empty() {
        tracing::info!("All required credentials are set");
    } else {
        tracing::warn!(
            "Missing credentials: {} (related endpoints will fail)",
            missing.join(", ")
        );
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!("Starting umlforge...");

            let github = GitHubClient::new(&config.github.client_id, &config.github.client_secret)?;
            let llm = OpenAiClient::new(
                &config.openai.base_url,
                &config.openai.api_key,
                &config.openai.model,
            );

            let host = config.web.host.clone();
            let port = config.web.port;

            let state = Arc::new(AppState {
                config,
                github,
                llm,
            });

            tracing::info!(
                "umlforge is running. API available at http://{}:{}",
                host,
                port
            );

            start_server(state, &host, port).await?;
        }
    }

    Ok(())
}
