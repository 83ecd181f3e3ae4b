mod cli;

use cinescope::{
    config,
    history::{HistoryQuery, HistoryView},
    server::{self, AppContext},
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting Cinescope server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cinescope=trace,cinescope_tmdb=trace,cinescope_trakt=trace,tower_http=debug".to_string()
        } else {
            "cinescope=debug,cinescope_tmdb=info,cinescope_trakt=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::History {
            query,
            kind,
            sort,
            group,
            json,
        } => {
            let query = HistoryQuery::from_params(
                query.as_deref(),
                kind.as_deref(),
                sort.as_deref(),
                group.as_deref(),
            );
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(print_history(cli.config.as_deref(), &query, json))
        }
        Commands::Version => {
            println!("cinescope {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn print_history(config_path: Option<&Path>, query: &HistoryQuery, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let ctx = AppContext::new(config)?;

    if !ctx.history.is_enabled() {
        anyhow::bail!("Trakt is not configured: set trakt.client_id and trakt.username");
    }

    let view = ctx.history.view(query, true).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn print_view(view: &HistoryView) {
    println!(
        "{} of {} plays ({} movies, {} episodes)",
        view.matched, view.total, view.movies, view.episodes
    );
    for group in &view.groups {
        println!("\n{} ({})", group.label, group.items.len());
        for item in &group.items {
            let year = item.year.map(|y| format!(" ({y})")).unwrap_or_default();
            let episode = item
                .episode_label
                .as_deref()
                .map(|e| format!(" - {e}"))
                .unwrap_or_default();
            println!(
                "  {}  {}{}{}",
                view.local_time(item).format("%Y-%m-%d %H:%M"),
                item.title,
                year,
                episode
            );
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!(
                "  TMDb: {}",
                if config.tmdb.api_key.trim().is_empty() {
                    "no API key"
                } else {
                    "API key set"
                }
            );
            println!("  TMDb language/region: {}/{}", config.tmdb.language, config.tmdb.region);
            match config.trakt.username() {
                Some(user) if !config.trakt.client.client_id.trim().is_empty() => {
                    println!("  Trakt history: enabled for {}", user);
                }
                _ => println!("  Trakt history: disabled"),
            }
            println!(
                "  History: concurrency {}, refresh every {}s, UTC offset {} min",
                config.history.concurrency,
                config.history.refresh_secs,
                config.history.utc_offset_minutes
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
