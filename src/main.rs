use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use promptshot::application::{ServerConfig, serve};
use promptshot::infrastructure::client::PromptshotClient;
use promptshot::infrastructure::openai::OpenAiConfig;
use promptshot::presentation::cli::{Cli, Commands, ServeCommand, images};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::Suggest => {
            let client = PromptshotClient::from_base_url(&cli.api_url)?;
            images::suggest(&client).await
        }
        Commands::Generate(cmd) => {
            let client = PromptshotClient::from_base_url(&cli.api_url)?;
            images::generate(&client, cmd).await
        }
        Commands::List => {
            let client = PromptshotClient::from_base_url(&cli.api_url)?;
            images::list(&client).await
        }
        Commands::Fetch(cmd) => {
            let client = PromptshotClient::from_base_url(&cli.api_url)?;
            images::fetch(&client, cmd).await
        }
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    let storage = command.storage_config();

    let config = ServerConfig {
        bind_address: command.bind_address,
        database_url: command.database_url,
        openai: OpenAiConfig {
            base_url: command.openai_url,
            api_key: command.openai_api_key.unwrap_or_default(),
            completion_model: command.completion_model,
            image_model: command.image_model,
            image_size: command.image_size,
        },
        storage,
        cors_origin: command.cors_origin,
        upstream_timeout: Duration::from_secs(command.upstream_timeout_secs),
    };

    serve(config).await
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if logging cannot be initialized
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
