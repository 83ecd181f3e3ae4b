use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cinescope")]
#[command(author, version, about = "Browse TMDb titles and your Trakt watch history")]
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
    /// Start the web server
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
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Print watch history from Trakt, enriched with TMDb artwork
    History {
        /// Case-insensitive text filter
        #[arg(short, long)]
        query: Option<String>,

        /// movies, episodes, or all
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// watched_desc, watched_asc, title_asc, title_desc, year_desc, year_asc
        #[arg(short, long)]
        sort: Option<String>,

        /// none, day, month, or year
        #[arg(short, long)]
        group: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display version information
    Version,
}
