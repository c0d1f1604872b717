mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::AppContext;
use sitesearch::config::{Config, LoggingConfig};

#[derive(Parser)]
#[command(
    name = "sitesearch",
    version,
    about = "Crawl configured sites and search them by lemma",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, default_value = "sitesearch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json), overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve,

    /// Index all configured sites and wait for completion
    Index {
        /// Index only this configured site
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Search indexed pages
    Search {
        /// Query text
        query: String,

        /// Restrict results to one site
        #[arg(short, long)]
        site: Option<String>,

        /// Number of results to skip
        #[arg(short, long, default_value = "0")]
        offset: usize,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show index statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    setup_tracing(&config.logging, cli.log_format.as_deref(), cli.verbose)?;

    let ctx = AppContext::new(config)?;
    tracing::debug!(config = %cli.config.display(), sites = ctx.config.sites.len(), "Configuration loaded");

    match cli.command {
        Commands::Serve => {
            tracing::info!("Starting serve command");
            commands::serve(&ctx).await?;
        }

        Commands::Index { url } => {
            tracing::info!(url = ?url, "Starting index command");
            commands::index(&ctx, url).await?;
        }

        Commands::Search {
            query,
            site,
            offset,
            limit,
        } => {
            tracing::info!(
                query = %query,
                site = ?site,
                offset = %offset,
                limit = ?limit,
                "Starting search command"
            );
            commands::search(&ctx, &query, site.as_deref(), offset, limit)?;
        }

        Commands::Stats => {
            commands::stats(&ctx)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the config file; `--log-format` wins over `[logging].format`
fn setup_tracing(logging: &LoggingConfig, format: Option<&str>, verbose: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(logging.filter_directive(verbose))
    });

    let json = format.map_or_else(|| logging.is_json(), |f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    Ok(())
}
