// src/crawl/resolve.rs
// =============================================================================
// Decides which hyperlinks are crawl candidates.
//
// A raw href from a page goes through these checks, in order:
// 1. Empty hrefs are dropped
// 2. Fragment-only links (#section) and non-web schemes (mailto:, tel:,
//    javascript:, data:, or anything else that isn't http: / https:) are dropped
// 3. The href is resolved against the URL of the page it was found on
//    (protocol-relative links like //host/path pick up the page's scheme)
// 4. The #fragment is removed, because it points inside a page, not at a
//    different page
// 5. Links to files that are not documents (images, archives, stylesheets,
//    scripts, feeds...) are dropped
//
// What survives is serialized by the url crate, which gives every URL one
// canonical spelling (lowercase scheme and host, default port removed, "/"
// for an empty path). That canonical string is what the visited set keys on.
//
// This file also holds the domain filter: the crawl never leaves the host
// it started on.
// =============================================================================

use url::Url;

use crate::error::LinkRejection;

// Extensions (lowercase, with the dot) that never point at an HTML page
const IGNORED_EXTENSIONS: &[&str] = &[
    ".txt", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", // documents
    ".zip", ".rar", ".tar", ".gz", // archives
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".ico", ".webp", // images
    ".mp3", ".mp4", ".avi", ".mov", ".wmv", ".flv", // audio/video
    ".css", ".js", ".json", ".xml", ".map", ".webmanifest", // assets and data
    ".rss", ".atom", // feeds
];

// Schemes that are rejected before we even try to parse the href
const REJECTED_PREFIXES: &[&str] = &["#", "mailto:", "javascript:", "tel:", "data:"];

/// Resolves `href` against `base` and returns the canonical URL string, or
/// `None` if the link is not a crawl candidate.
#[cfg(test)]
pub fn resolve(base: &Url, href: &str) -> Option<String> {
    resolve_link(base, href).ok().map(String::from)
}

/// Resolves `href` against `base` into a canonical URL, or says why the
/// link is not a crawl candidate.
pub fn resolve_link(base: &Url, href: &str) -> Result<Url, LinkRejection> {
    let href = href.trim();
    if href.is_empty() {
        return Err(LinkRejection::Empty);
    }

    // "//host/path" has no scheme of its own; Url::join gives it the
    // base's scheme, so it skips the scheme checks below
    if !href.starts_with("//") {
        let lower = href.to_ascii_lowercase();

        if lower.starts_with('#') {
            return Err(LinkRejection::FragmentOnly);
        }
        if REJECTED_PREFIXES.iter().any(|p| lower.starts_with(p)) || has_foreign_scheme(&lower) {
            return Err(LinkRejection::ForeignScheme);
        }
    }

    let mut resolved = base.join(href).map_err(|_| LinkRejection::Malformed)?;
    resolved.set_fragment(None);

    if !matches!(resolved.scheme(), "http" | "https") {
        return Err(LinkRejection::ForeignScheme);
    }

    if has_ignored_extension(&resolved) {
        return Err(LinkRejection::IgnoredExtension);
    }

    Ok(resolved)
}

// True when the href starts with a scheme other than http: or https:
//
// Only the part before the first '/' is checked, so "/wiki/Help:Contents"
// is kept while "page?q=a:b" is treated as a scheme and dropped
fn has_foreign_scheme(lower_href: &str) -> bool {
    let head = lower_href.split('/').next().unwrap_or("");

    head.contains(':') && !lower_href.starts_with("http:") && !lower_href.starts_with("https:")
}

// Checks the extension of the last path segment, case-insensitively
//
// "/assets/app.CSS" -> ".css" -> ignored
// "/blog/v1.2/" -> last segment is empty -> no extension -> kept
fn has_ignored_extension(url: &Url) -> bool {
    let last_segment = url.path().rsplit('/').next().unwrap_or("");

    match last_segment.rfind('.') {
        Some(dot) => {
            let ext = last_segment[dot..].to_ascii_lowercase();
            IGNORED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Domain filter: true when both URLs name the same host (and port).
///
/// Scheme and path are ignored. Hosts are compared case-insensitively.
/// If either side fails to parse the answer is `false`.
pub fn same_host(start_url: &str, candidate_url: &str) -> bool {
    match (Url::parse(start_url), Url::parse(candidate_url)) {
        (Ok(start), Ok(candidate)) => same_host_url(&start, &candidate),
        _ => false,
    }
}

/// [`same_host`] for URLs that are already parsed.
pub fn same_host_url(start: &Url, candidate: &Url) -> bool {
    match (start.host_str(), candidate.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b) && start.port() == candidate.port(),
        _ => false,
    }
}
