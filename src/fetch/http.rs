// src/fetch/http.rs
// =============================================================================
// Fetches pages over HTTP(S) with reqwest.
//
// Key functionality:
// - One shared Client for the whole crawl (connection pooling)
// - A fixed per-request timeout (15 seconds unless configured otherwise)
// - Rejects non-2xx responses and non-HTML content types before the body
//   is downloaded, so linked images and PDFs cost us only the headers
//
// No retries: a page that fails once simply contributes no links.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

use super::PageSource;
use crate::error::FetchError;

/// Per-request timeout used when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP implementation of [`PageSource`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the HTTP client
    //
    // reqwest follows up to 10 redirects by default, which is what we want:
    // a redirected page is still a page on the site
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sitemapper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        ensure_html(response.status().as_u16(), &content_type)?;

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

// Decides whether a response is worth downloading and parsing
//
// HTTP status codes:
// - 200-299: Success, keep going
// - anything else: FetchError::Status
//
// Content types are compared case-insensitively and only the prefix is
// checked, so "text/html; charset=utf-8" is accepted.
pub fn ensure_html(status: u16, content_type: &str) -> Result<(), FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::Status(status));
    }

    if !content_type.to_ascii_lowercase().starts_with("text/html") {
        let shown = if content_type.is_empty() {
            "none".to_string()
        } else {
            content_type.to_string()
        };
        return Err(FetchError::UnsupportedContent(shown));
    }

    Ok(())
}
