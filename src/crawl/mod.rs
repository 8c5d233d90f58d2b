// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - A fixed pool of concurrent workers sharing one job queue
// - Each page is admitted exactly once, no matter how many pages link to it
// - Respects same-host restriction (doesn't crawl external sites)
// - Configurable depth limit
// - The crawl ends by itself when no work is left (no timeouts, no polling)
//
// Submodules, leaves first:
// - resolve:    href -> canonical URL, or "not a crawl candidate"; same-host check
// - visited:    the set of admitted URLs
// - dispatcher: job queue + outstanding-work counter (termination detection)
// - stats:      diagnostic counters and the periodic reporter
// - worker:     the per-job loop
// - engine:     crawl(), which wires all of the above together
// =============================================================================

mod dispatcher;
mod engine;
mod resolve;
mod stats;
mod visited;
mod worker;

// Re-export the main crawling function and its types
pub use engine::{crawl, CrawlConfig};
