// src/fetch/mod.rs
// =============================================================================
// This module downloads pages for the crawler.
//
// The crawl engine never talks to reqwest directly. It only sees the
// PageSource trait below, which has one job: "give me the HTML at this URL,
// or tell me why you can't". That seam is what lets the engine tests run
// against an in-memory website instead of the real internet.
//
// Submodules:
// - http: the real implementation, built on reqwest
// =============================================================================

mod http;

pub use http::{HttpFetcher, DEFAULT_TIMEOUT};

use crate::error::FetchError;
use async_trait::async_trait;

/// Anything that can hand the crawler the HTML body of a page.
///
/// Implementations must treat non-2xx responses and non-HTML content as
/// errors, so that a successful return always means "this is a page worth
/// parsing".
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}
