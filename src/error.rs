// src/error.rs
// =============================================================================
// Error types for the crawler.
//
// Only one of these is fatal: CrawlError::InvalidInput, which stops us before
// the first request is made. Everything else happens to a single page or a
// single link and is absorbed by the worker that hit it.
//
// Rust concepts:
// - thiserror: derive macro that writes the Display and Error impls for us
// - #[from]: lets the ? operator convert a reqwest::Error into a FetchError
// =============================================================================

use thiserror::Error;

/// Errors that abort a crawl before it starts.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The crawl configuration cannot be used (bad start URL, zero workers)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Why a single page contributed no links.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure, DNS failure or timeout
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with something other than 2xx
    #[error("received non-2xx status code {0}")]
    Status(u16),

    /// The page is not HTML (images, PDFs, feeds...)
    #[error("content type is not HTML ({0})")]
    UnsupportedContent(String),

    /// The response body could not be read as text
    #[error("failed to read body: {0}")]
    Body(String),
}

impl FetchError {
    /// Non-HTML responses are normal on any site that links to files,
    /// so they are not worth a warning.
    pub fn is_expected(&self) -> bool {
        matches!(self, FetchError::UnsupportedContent(_))
    }
}

/// Why a hyperlink did not become a crawl candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkRejection {
    #[error("empty href")]
    Empty,
    #[error("fragment-only reference")]
    FragmentOnly,
    #[error("not an http(s) link")]
    ForeignScheme,
    #[error("could not be resolved against the page URL")]
    Malformed,
    #[error("points at a non-document file")]
    IgnoredExtension,
}

/// Returned when work is submitted to a queue that has already shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("job queue is closed")]
    Closed,
}
