use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelquest")]
#[command(author, version, about = "Media discovery server with Overseerr request tracking")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Show the request status of a title
    Status {
        /// movie or tv
        media_type: String,

        /// Catalog (TMDB) id
        media_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the tracking service to acquire a title
    Request {
        /// movie or tv
        media_type: String,

        /// Catalog (TMDB) id
        media_id: String,
    },

    /// Cancel a pending request
    Cancel {
        /// Tracking-service request id
        request_id: u64,
    },

    /// Display version information
    Version,
}
