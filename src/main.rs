// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr, so stdout only carries the sitemap)
// 3. Crawl the website
// 4. Print the sitemap (XML) or a JSON report
// 5. Exit with proper code (0 = success, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Arc<dyn Trait>: The crawler takes any PageSource; here it's the HTTP one
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - the concurrent crawl engine
mod error; // src/error.rs - error types
mod fetch; // src/fetch/ - downloading pages
mod link; // src/link/ - extracting links from HTML
mod sitemap; // src/sitemap.rs - XML output

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the parse() method
use cli::{Cli, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// How often --stats prints a progress line
const STATS_INTERVAL: Duration = Duration::from_secs(2);

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    let fetcher = fetch::HttpFetcher::new(Duration::from_secs(cli.timeout_secs))
        .context("failed to create HTTP client")?;

    let mut config = crawl::CrawlConfig::new(cli.url.as_str(), cli.depth, usize::from(cli.workers));
    if cli.stats {
        config = config.with_stats(STATS_INTERVAL);
    }

    let result = crawl::crawl(&config, Arc::new(fetcher))
        .await
        .with_context(|| format!("Error building sitemap for {}", cli.url))?;

    tracing::info!("Finished crawling. Found {} unique pages.", result.pages.len());

    let document = if cli.json {
        let mut json = serde_json::to_string_pretty(&result)?;
        json.push('\n');
        json
    } else {
        sitemap::generate_sitemap(&result.pages).context("Error generating XML sitemap")?
    };

    match cli.output {
        Some(path) => {
            tokio::fs::write(&path, document)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Sitemap written to {}", path.display());
        }
        None => print!("{}", document),
    }

    Ok(())
}

// Sets up tracing
//
// RUST_LOG wins if it is set; otherwise --verbose picks between the normal
// and the chatty filter
fn init_logging(verbose: bool, format: LogFormat) {
    let default_filter = if verbose {
        "sitemapper=debug,info"
    } else {
        "sitemapper=info,warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
