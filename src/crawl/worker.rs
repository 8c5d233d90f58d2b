// src/crawl/worker.rs
// =============================================================================
// One crawl worker. The engine starts a fixed number of these.
//
// Each worker loops:
// 1. Wait for a job from the dispatcher (None = crawl finished, exit)
// 2. Fetch the page. Failures are logged and the page gives us no links
// 3. For every link on the page:
//    resolve -> same host? -> admit to visited set -> add to output
//    -> submit a follow-on job (unless the depth limit says stop)
// 4. Mark the job complete
//
// Step 4 always comes after step 3. See dispatcher.rs for why that order is
// what keeps the crawl from stopping early.
// =============================================================================

use std::sync::Arc;
use url::Url;

use super::dispatcher::{CrawlJob, Dispatcher};
use super::engine::CrawlContext;
use super::resolve::{resolve_link, same_host_url};
use crate::error::LinkRejection;
use crate::link;

// Calls complete() when dropped, so a job is marked done exactly once even if
// processing it panics
struct Completion<'a>(&'a Dispatcher);

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

pub(super) async fn run_worker(id: usize, ctx: Arc<CrawlContext>) {
    while let Some(job) = ctx.dispatcher.next_job().await {
        let _done = Completion(&ctx.dispatcher);
        ctx.stats.job_dequeued();
        process_job(&ctx, &job).await;
    }

    tracing::debug!(worker = id, "worker finished");
}

async fn process_job(ctx: &CrawlContext, job: &CrawlJob) {
    tracing::debug!(url = %job.url, depth = job.depth, "crawling");

    let body = match ctx.source.fetch_page(&job.url).await {
        Ok(body) => body,
        Err(e) if e.is_expected() => {
            tracing::debug!(url = %job.url, "skipped: {}", e);
            return;
        }
        Err(e) => {
            tracing::warn!(url = %job.url, "fetch failed: {}", e);
            return;
        }
    };

    // Only the seed can get here with depth >= max_depth (max_depth = 0):
    // it is fetched, but its links must not be listed
    if job.depth >= ctx.max_depth {
        return;
    }

    let base = match Url::parse(&job.url) {
        Ok(base) => base,
        Err(e) => {
            tracing::warn!(url = %job.url, "cannot use page URL as a base: {}", e);
            return;
        }
    };

    // Pages found here are listed either way; they are only fetched if
    // they are still inside the depth limit
    let next_depth = job.depth + 1;
    let expand = next_depth < ctx.max_depth;

    for found in link::parse_links(&body) {
        let resolved = match resolve_link(&base, &found.href) {
            Ok(url) => url,
            Err(LinkRejection::IgnoredExtension) => {
                ctx.stats.skipped_by_extension();
                continue;
            }
            Err(reason) => {
                tracing::trace!(href = %found.href, text = %found.text, "link skipped: {}", reason);
                continue;
            }
        };

        if !same_host_url(&ctx.start, &resolved) {
            continue;
        }

        let url = String::from(resolved);
        if !ctx.visited.admit(&url) {
            continue;
        }

        ctx.record(url.clone());
        ctx.stats.url_admitted();

        if expand {
            ctx.stats.job_submitted();
            let child = CrawlJob {
                url,
                depth: next_depth,
            };
            if let Err(e) = ctx.dispatcher.submit(child) {
                tracing::error!(url = %job.url, "could not queue follow-on job: {}", e);
            }
        }
    }
}
