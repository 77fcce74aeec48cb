//! FocusTube CLI entry point.

use anyhow::Result;
use clap::Parser;
use focustube::cli::{commands, Cli, Commands};
use focustube::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_ref().map(PathBuf::from);

    // Load configuration
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging; -v flags override the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("focustube={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Videos {
            query,
            subject,
            duration,
            level,
            channel,
        } => {
            commands::run_videos(
                query,
                subject.clone(),
                *duration,
                *level,
                channel.clone(),
                settings,
            )
            .await?;
        }

        Commands::Trending { seed } => {
            commands::run_trending(*seed, settings).await?;
        }

        Commands::Process { url, title, output } => {
            commands::run_process(url, title.clone(), output.clone(), settings).await?;
        }

        Commands::Ask {
            url,
            question,
            title,
        } => {
            commands::run_ask(url, question, title.clone(), settings).await?;
        }

        Commands::Search { url, query } => {
            commands::run_search(url, query, settings).await?;
        }

        Commands::Doctor => {
            let path = config_path.unwrap_or_else(Settings::default_config_path);
            commands::run_doctor(&settings, &path).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
