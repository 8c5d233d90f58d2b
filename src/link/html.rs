// src/link/html.rs
// =============================================================================
// Extracts <a> elements from an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), so broken markup is
//   repaired the same way a browser would repair it
//
// Commented-out markup never shows up here: html5ever turns <!-- ... --> into
// comment nodes, and comment nodes are never matched by an element selector.
//
// Rust concepts:
// - Iterators: element.text() walks every descendant text node
// - Owned vs borrowed: we copy the href out of the DOM because the DOM
//   (scraper::Html) cannot be sent across threads
// =============================================================================

use scraper::{ElementRef, Html, Selector};

/// A hyperlink found in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Raw value of the href attribute, exactly as written (may be relative,
    /// may be empty when the attribute is missing)
    pub href: String,
    /// All text inside the element, collapsed to single spaces
    pub text: String,
}

// Parses an HTML document and returns every <a> element in document order
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//
// Returns: Vec<Link>, one entry per <a> element
//
// Example:
//   html = "<a href='/docs'>  Read <b>the</b> docs </a>"
//   result = [Link { href: "/docs", text: "Read the docs" }]
pub fn parse_links(html: &str) -> Vec<Link> {
    let document = Html::parse_document(html);

    // Our selector "a" is a constant and known to be valid, so unwrap is
    // a programmer-error check, not input validation
    let selector = Selector::parse("a").unwrap();

    document.select(&selector).map(build_link).collect()
}

// Copies the href and the normalized text out of an <a> element
fn build_link(element: ElementRef<'_>) -> Link {
    let href = element.value().attr("href").unwrap_or("").to_string();

    Link {
        href,
        text: collapse_whitespace(element.text()),
    }
}

// Joins text fragments with single spaces and squeezes every run of
// whitespace (spaces, tabs, newlines) down to one space
fn collapse_whitespace<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    fragments
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
