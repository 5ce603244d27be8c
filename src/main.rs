mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use rq_core::config::Config;
use rq_core::MediaRef;
use rq_tracker::{SeerrClient, StatusCache, StatusTracker};

/// Config file, then environment overrides.
fn load_config(config_path: Option<&Path>) -> Config {
    let mut config = Config::load_or_default(config_path);
    config.apply_env();
    config
}

/// A tracker talking to the configured tracking service, for one-shot commands.
fn tracker(config: &Config) -> Result<StatusTracker> {
    let service = SeerrClient::new(&config.tracking).context("tracking service is not configured")?;
    Ok(StatusTracker::new(
        Arc::new(service),
        Arc::new(StatusCache::new()),
        config.requests.clone(),
    )
    .with_recent_requests(config.tracking.recent_requests))
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config_path);
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting reelquest server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    rq_server::start(config).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise defaults depend on --verbose.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelquest=debug,rq_server=debug,rq_tracker=debug,tower_http=debug".to_string()
        } else {
            "reelquest=info,rq_server=info,rq_tracker=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
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
        Commands::Status {
            media_type,
            media_id,
            json,
        } => {
            let media = MediaRef::parse(&media_type, &media_id)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(show_status(media, json, cli.config.as_deref()))
        }
        Commands::Request {
            media_type,
            media_id,
        } => {
            let media = MediaRef::parse(&media_type, &media_id)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(submit_request(media, cli.config.as_deref()))
        }
        Commands::Cancel { request_id } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(cancel_request(request_id, cli.config.as_deref()))
        }
        Commands::Version => {
            println!("reelquest {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let mut config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            Config::load(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };
    config.apply_env();

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!(
        "  Tracking service: {}",
        config.tracking.url.as_deref().unwrap_or("(not set)")
    );
    println!("  Catalog: {} ({})", config.catalog.base_url, config.catalog.language);
    println!("  Recent requests scanned: {}", config.tracking.recent_requests);

    for warning in config.validate() {
        println!("  warning: {warning}");
    }
    if let Err(e) = config.require_services() {
        println!("  {e}");
    }

    Ok(())
}

async fn show_status(media: MediaRef, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let record = tracker(&config)?.resolve(media).await;

    if json {
        let value = serde_json::json!({
            "mediaType": media.kind,
            "mediaId": media.id,
            "status": record.status,
            "statusCode": record.status.code(),
            "requestId": record.request_id,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{media}: {}", record.status);
        if record.status.is_requestable() {
            println!("  request it with: reelquest request {} {}", media.kind, media.id);
        } else if record.status.is_in_flight() {
            match record.request_id {
                Some(id) => println!("  cancel with: reelquest cancel {id}"),
                None => println!("  acquisition in progress"),
            }
        }
    }
    Ok(())
}

async fn submit_request(media: MediaRef, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let ack = tracker(&config)?
        .submit(media)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match ack.request_id {
        Some(id) => println!("Requested {media} (request {id})"),
        None => println!("Requested {media}"),
    }
    Ok(())
}

async fn cancel_request(request_id: u64, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    tracker(&config)?
        .cancel(request_id, None)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    println!("Cancelled request {request_id}");
    Ok(())
}
