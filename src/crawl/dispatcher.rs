// src/crawl/dispatcher.rs
// =============================================================================
// The job queue, and the counter that tells us when the crawl is finished.
//
// How termination works:
// - `outstanding` counts jobs that were submitted but not yet completed.
//   It starts at 1 for the seed job.
// - submit() adds 1 and pushes the job onto the queue.
// - complete() subtracts 1. The call that brings it to 0 closes the queue,
//   and every worker waiting in next_job() gets None and exits.
//
// The rule that makes this correct: a worker calls submit() for every link
// it found BEFORE it calls complete() for the job it was working on. While a
// job is running it holds one unit of `outstanding`, so its children are
// counted before its own unit is released and the counter can't touch 0
// while there is still work about to be queued.
//
// The queue itself is an unbounded tokio channel. Workers are both the
// producers and the consumers of this queue, so a bounded queue could fill
// up with every worker blocked on send and nobody left to receive.
//
// Rust concepts:
// - AtomicUsize: a counter many tasks can update without a lock
// - mpsc::unbounded_channel: send() never waits, it just appends
// - Closing a channel: dropping the last Sender makes recv() return None
//   once the queue is empty
// - tokio::sync::Mutex around the Receiver: mpsc has a single receiver,
//   so the workers take turns waiting on it
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::DispatchError;

/// One page to fetch, and how many hops it is from the start URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub url: String,
    pub depth: usize,
}

#[derive(Debug)]
pub struct Dispatcher {
    outstanding: AtomicUsize,
    // None once the queue has been closed
    sender: Mutex<Option<UnboundedSender<CrawlJob>>>,
    receiver: tokio::sync::Mutex<UnboundedReceiver<CrawlJob>>,
}

impl Dispatcher {
    /// Creates the queue with `seed` already in it and one unit of
    /// outstanding work.
    pub fn new(seed: CrawlJob) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        // The receiver is alive right here, so this send cannot fail
        let _ = sender.send(seed);

        Self {
            outstanding: AtomicUsize::new(1),
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
        }
    }

    /// Queues a new job. Never waits.
    ///
    /// Must be called before the submitting worker calls `complete()` for its
    /// own job. Fails with [`DispatchError::Closed`] if the crawl has already
    /// finished.
    pub fn submit(&self, job: CrawlJob) -> Result<(), DispatchError> {
        let sender = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        let sender = sender.as_ref().ok_or(DispatchError::Closed)?;

        // Count first, then publish: a worker may pick the job up and finish
        // it before this function returns
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        if sender.send(job).is_err() {
            // The receiver lives as long as `self`, so this is unreachable
            // in practice; undo the count so we can't hang
            self.outstanding.fetch_sub(1, Ordering::AcqRel);
            return Err(DispatchError::Closed);
        }

        Ok(())
    }

    /// Marks one job as fully processed. Returns true if this was the last
    /// outstanding job, in which case the queue is now closed.
    pub fn complete(&self) -> bool {
        let previous = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match previous {
            Ok(1) => {
                self.close();
                true
            }
            Ok(_) => false,
            Err(_) => {
                tracing::error!("complete() called with no outstanding jobs");
                false
            }
        }
    }

    /// Waits for the next job. Returns None once the queue is closed and empty.
    pub async fn next_job(&self) -> Option<CrawlJob> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    /// Jobs submitted but not yet completed.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }

    fn close(&self) {
        // Dropping the sender closes the channel
        self.sender.lock().unwrap_or_else(|e| e.into_inner()).take();
        tracing::debug!("no outstanding work left, job queue closed");
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why two kinds of Mutex?
//    - std::sync::Mutex guards the Sender. We only hold it for a moment and
//      never across an .await, so the plain blocking mutex is fine
//    - tokio::sync::Mutex guards the Receiver. A worker holds it WHILE it
//      waits in recv().await, and only tokio's mutex may be held across .await
//
// 2. What is fetch_update?
//    - A compare-and-swap loop: read the value, compute the new one, and
//      store it only if nobody changed it in between
//    - checked_sub(1) returns None at 0, which makes fetch_update give up
//      instead of wrapping around to usize::MAX
//
// 3. What does unwrap_or_else(|e| e.into_inner()) do on a lock?
//    - lock() fails only if another thread panicked while holding it
//    - into_inner() takes the guard anyway; an Option<Sender> can't be
//      left half-updated, so the data is still good
// -----------------------------------------------------------------------------
