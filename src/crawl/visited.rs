// src/crawl/visited.rs
// =============================================================================
// The set of every URL the crawl has ever admitted.
//
// The important method is admit(): it records a URL and tells the caller
// whether it was the first to do so, in ONE atomic step. Doing it in two
// steps ("contains? then insert") lets two workers that find the same link
// at the same moment both see "not visited" and both queue the page.
//
// Rust concepts:
// - DashMap/DashSet: a concurrent hash map split into shards, each with its
//   own lock, so workers touching different URLs rarely wait on each other
// - &self methods that mutate: DashSet does its own locking internally
// =============================================================================

use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` and returns true if this call was the first to record it.
    ///
    /// DashSet::insert holds the shard lock for the lookup and the insert,
    /// so two concurrent callers can never both get `true`.
    pub fn admit(&self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does admit() take &str but store String?
//    - Callers keep ownership of their URL (they still need it for the job)
//    - The set needs its own copy, so we allocate one with to_string()
//
// 2. Why not HashSet inside a Mutex?
//    - That works too, and insert() also returns a bool
//    - DashSet just avoids every worker queueing on one lock
// -----------------------------------------------------------------------------
