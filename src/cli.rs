// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Example:
//   sitemapper https://example.com --depth 2 --workers 20 --stats > sitemap.xml
// =============================================================================

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "sitemapper",
    version,
    about = "Crawl a website and print a sitemap of every page it links to",
    long_about = "sitemapper starts at a URL, follows links that stay on the same host \
                  up to a maximum depth, and prints the pages it found as a sitemaps.org \
                  XML document. Progress and warnings go to stderr, so stdout can be \
                  redirected straight into sitemap.xml."
)]
pub struct Cli {
    /// The URL to build a sitemap for (e.g., https://example.com)
    pub url: String,

    /// The maximum depth to traverse
    ///
    /// Depth 0 = just the starting URL
    /// Depth 1 = starting URL + every page it links to
    /// Depth 2 = ... + every page those link to (only the first two levels
    ///           are downloaded)
    #[arg(long, default_value_t = 3)]
    pub depth: usize,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: u16,

    /// Show periodic crawling stats on stderr
    #[arg(long)]
    pub stats: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = crate::fetch::DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Write the sitemap to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Output a JSON report (pages + stats) instead of XML
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}
