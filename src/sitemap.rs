// src/sitemap.rs
// =============================================================================
// Turns the list of crawled pages into a sitemaps.org XML document.
//
// Output looks like:
//
//   <?xml version="1.0" encoding="UTF-8"?>
//   <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//     <url>
//       <loc>https://example.com/</loc>
//     </url>
//   </urlset>
//
// The crawler already hands us unique URLs, but this module doesn't rely on
// that: duplicates and anything that is not an absolute URL are dropped here.
//
// We use quick-xml's Writer, which escapes text for us ("&" in a query
// string becomes "&amp;").
// =============================================================================

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashSet;
use std::io::Cursor;
use url::Url;

const XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

// Builds the sitemap document
//
// Parameters:
//   pages: URLs in the order they should appear
//
// Returns: the XML document as a String, ending with a newline
pub fn generate_sitemap(pages: &[String]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", XMLNS));
    writer.write_event(Event::Start(urlset))?;

    let mut seen = HashSet::new();
    for page in pages {
        if let Err(e) = Url::parse(page) {
            tracing::warn!("Warning: Skipping invalid URL for XML sitemap: {} ({})", page, e);
            continue;
        }
        if !seen.insert(page.as_str()) {
            continue;
        }

        writer.write_event(Event::Start(BytesStart::new("url")))?;
        writer.write_event(Event::Start(BytesStart::new("loc")))?;
        writer.write_event(Event::Text(BytesText::new(page)))?;
        writer.write_event(Event::End(BytesEnd::new("loc")))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    let mut xml = String::from_utf8(writer.into_inner().into_inner())
        .context("sitemap XML is not valid UTF-8")?;
    xml.push('\n');
    Ok(xml)
}
