//! mojiset CLI
//!
//! Crawls a site (or reads local files) and writes the sorted set of
//! Japanese characters found, followed by the fixed symbol table.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mojiset::{
    error::Result,
    models::Config,
    pipeline,
    services::HttpFetcher,
    storage::LocalStorage,
};

/// mojiset - Japanese character inventory crawler
#[derive(Parser, Debug)]
#[command(
    name = "mojiset",
    version,
    about = "Collects the Japanese characters used across a website"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the configured site and write the character report
    Crawl {
        /// Seed URL (overrides crawler.seed_url)
        #[arg(long)]
        seed: Option<String>,

        /// Allowed domain, repeatable (overrides crawler.allowed_domains)
        #[arg(short, long = "domain")]
        domains: Vec<String>,

        /// Maximum link depth (overrides crawler.max_depth)
        #[arg(long)]
        depth: Option<usize>,

        /// Report path (overrides output.path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract characters from local HTML or text files
    Extract {
        /// Files to read
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Report path (overrides output.path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Crawl {
            seed,
            domains,
            depth,
            output,
        } => {
            if let Some(seed) = seed {
                config.crawler.seed_url = seed;
            }
            if !domains.is_empty() {
                config.crawler.allowed_domains = domains;
            }
            if let Some(depth) = depth {
                config.crawler.max_depth = depth;
            }
            if let Some(path) = output {
                config.output.path = path;
            }

            if let Err(e) = config.validate() {
                log::error!("{}", e);
                return Err(e);
            }

            let fetcher = HttpFetcher::new(&config.crawler)?;
            let storage = LocalStorage::from_config(&config.output);
            log_failure(pipeline::run_extraction(&config, fetcher, &storage).await)?;
        }

        Command::Extract { files, output } => {
            if let Some(path) = output {
                config.output.path = path;
            }

            let storage = LocalStorage::from_config(&config.output);
            log_failure(pipeline::run_local(&config, &files, &storage).await)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            log::info!("  Seed: {}", config.crawler.seed_url);
            log::info!("  Domains: {}", config.crawler.allowed_domains.join(", "));
            log::info!("  Max depth: {}", config.crawler.max_depth);
            log::info!("  Stop words: {}", config.extraction.stop_words.len());
            log::info!("  Output: {}", config.output.path.display());
        }
    }

    Ok(())
}

/// Log a failed extraction run before handing the error back to `main`.
fn log_failure<T>(result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        log::error!("Extraction failed: {}", e);
    }
    result
}
