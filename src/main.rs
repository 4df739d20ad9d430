//! ebook-reader server entry point.

use clap::Parser;
use ebook_reader::{
    config::{Cli, Command, Config},
    server,
};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Init { force }) = &cli.command {
        return cmd_init(*force);
    }

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let mut config = if let Some(ref path) = config_path {
        Config::load(path)?
    } else {
        Config::default()
    };
    config.apply_cli(&cli)?;

    cmd_serve(config, config_path).await
}

/// Write a default config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());
    println!("\nEdit config.toml to list your book directories, then run: ebook-reader");

    Ok(())
}

/// Start the server.
async fn cmd_serve(config: Config, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ebook_reader=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = server::AppState::new(config.clone());

    let roots: Vec<String> = state
        .roots()
        .iter()
        .map(|r| r.display().to_string())
        .collect();
    tracing::info!(
        bind = %config.server.bind,
        config = ?config_path,
        roots = ?roots,
        cache_capacity = config.cache.capacity,
        "Starting ebook-reader server"
    );

    for root in state.roots().iter().filter(|r| !r.is_dir()) {
        tracing::warn!(root = %root.display(), "Library root does not exist");
    }

    let app = server::create_router(state);

    let listener = TcpListener::bind(config.server.bind).await?;
    tracing::info!(address = %config.server.bind, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
