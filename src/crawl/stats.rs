// src/crawl/stats.rs
// =============================================================================
// Crawl counters, and an optional task that logs them every few seconds.
//
// These numbers are for humans watching a long crawl. Nothing in the engine
// reads them back to make a decision (termination is the dispatcher's job).
//
// Counters:
// - scanned:     jobs a worker has picked up
// - added:       URLs admitted to the visited set (start URL not included)
// - queued:      jobs submitted but not yet picked up
// - skipped_ext: links dropped because they point at a non-document file
// =============================================================================

use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Shared counters, passed to every worker behind an `Arc`.
#[derive(Debug)]
pub struct CrawlStats {
    started: Instant,
    scanned: AtomicU64,
    added: AtomicU64,
    queued: AtomicI64,
    skipped_ext: AtomicU64,
}

/// A point-in-time copy of [`CrawlStats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub elapsed_secs: u64,
    pub scanned: u64,
    pub added: u64,
    pub queued: i64,
    pub skipped_ext: u64,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            scanned: AtomicU64::new(0),
            added: AtomicU64::new(0),
            queued: AtomicI64::new(0),
            skipped_ext: AtomicU64::new(0),
        }
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_submitted(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn job_dequeued(&self) {
        self.scanned.fetch_add(1, Ordering::Relaxed);
        self.queued.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn url_admitted(&self) {
        self.added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped_by_extension(&self) {
        self.skipped_ext.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            elapsed_secs: self.started.elapsed().as_secs(),
            scanned: self.scanned.load(Ordering::Relaxed),
            added: self.added.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            skipped_ext: self.skipped_ext.load(Ordering::Relaxed),
        }
    }
}

/// Background task that logs a snapshot on every tick until stopped.
pub struct StatsReporter {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl StatsReporter {
    pub fn spawn(stats: Arc<CrawlStats>, every: Duration) -> Self {
        let (shutdown, mut stop) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick fires immediately; skip it so the first line
            // shows some progress
            ticker.tick().await;
            tracing::info!("Starting crawl...");

            loop {
                tokio::select! {
                    _ = ticker.tick() => log_snapshot(&stats.snapshot()),
                    _ = &mut stop => break,
                }
            }

            tracing::info!("Stats display finished.");
        });

        Self { shutdown, handle }
    }

    /// Stops the task and waits for it to print its last line.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            tracing::warn!("stats reporter ended abnormally: {}", e);
        }
    }
}

fn log_snapshot(s: &StatsSnapshot) {
    tracing::info!(
        elapsed_secs = s.elapsed_secs,
        scanned = s.scanned,
        added = s.added,
        queued = s.queued,
        skipped_ext = s.skipped_ext,
        "crawl progress"
    );
}
