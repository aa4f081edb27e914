//! Command-line interface for tango.

mod cache;
mod config;
mod lookup;
mod say;
mod serve;
mod words;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tango::Config;

#[derive(Parser, Debug)]
#[command(name = "tango", version, about = "Vocabulary study server with AI word explanations")]
pub struct Cli {
    /// Log output format
    #[arg(long, value_enum, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,
        /// Port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// List catalog words
    Words {
        /// Case-insensitive substring filter
        #[arg(short, long, default_value = "")]
        query: String,
        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show the detail for one word, generating it if needed
    Lookup {
        slug: String,
        /// Print the raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Synthesize pronunciation audio to an MP3 file
    Say {
        text: String,
        /// Output file
        #[arg(short, long, default_value = "out.mp3")]
        output: PathBuf,
    },
    /// Manage the word detail cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Print the effective configuration (secrets redacted)
    Config,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum CacheAction {
    /// Drop one word from the durable cache
    Clear { slug: String },
}

fn init_logging(format: LogFormat, verbose: u8) {
    let default = match verbose {
        0 => "tango=info,tower_http=info",
        1 => "tango=debug,tower_http=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Parse arguments, set up logging and config, and dispatch.
pub async fn run() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve { bind, port } => serve::cmd_serve(config, bind, port).await,
        Commands::Words { query, page } => words::cmd_words(&query, page),
        Commands::Lookup { slug, json } => lookup::cmd_lookup(&config, &slug, json).await,
        Commands::Say { text, output } => say::cmd_say(&config, &text, &output).await,
        Commands::Cache { action } => cache::cmd_cache(&config, action).await,
        Commands::Config => config::cmd_config(&config),
    }
}
