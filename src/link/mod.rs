// src/link/mod.rs
// =============================================================================
// This module turns an HTML document into the list of hyperlinks it contains.
//
// The crawler only cares about the href of each link, but we keep the visible
// text as well so the parser is useful on its own (and easy to test).
// =============================================================================

mod html;

pub use html::parse_links;
