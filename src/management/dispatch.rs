use std::{pin::pin, sync::Arc};

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    management::{FailedRequest, PhaseReport, RateLimiter},
    spotify::fetch::{FailureReason, FetchResult, PageFetcher},
    utils,
};

/// Results of one batch. Successes are in completion order, not request order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub successes: Vec<(String, Value)>,
    pub failures: Vec<FailedRequest>,
}

impl BatchOutcome {
    fn push(&mut self, result: FetchResult) {
        match result {
            FetchResult::Success { url, payload } => self.successes.push((url, payload)),
            FetchResult::Failure {
                url,
                status,
                reason,
            } => self.failures.push(FailedRequest {
                url,
                status,
                reason,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Issues batches of GETs concurrently, one batch at a time.
pub struct Dispatcher {
    fetcher: Arc<dyn PageFetcher>,
    limiter: Box<dyn RateLimiter>,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, limiter: impl RateLimiter + 'static) -> Self {
        Self {
            fetcher,
            limiter: Box::new(limiter),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fetches every url of the batch concurrently and waits for all of them,
    /// then runs the cooldown.
    ///
    /// Every url ends up in exactly one of the two lists. On cancellation the
    /// requests still in flight are dropped and reported as cancelled.
    pub async fn dispatch(&self, urls: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut done = vec![false; urls.len()];

        self.limiter.before_batch().await;

        {
            let mut pending = pin!(
                stream::iter(urls.iter().enumerate())
                    .map(|(idx, url)| {
                        let fetcher = Arc::clone(&self.fetcher);
                        async move { (idx, fetcher.fetch(url).await) }
                    })
                    // the whole batch is in flight at once
                    .buffer_unordered(urls.len().max(1))
            );

            loop {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break,
                    next = pending.next() => match next {
                        Some((idx, result)) => {
                            done[idx] = true;
                            outcome.push(result);
                        }
                        None => break,
                    },
                }
            }
        }

        for (idx, url) in urls.iter().enumerate() {
            if !done[idx] {
                outcome.failures.push(cancelled(url));
            }
        }

        tokio::select! {
            _ = self.limiter.after_batch() => {}
            _ = self.cancel.cancelled() => {}
        }

        outcome
    }

    /// Walks `urls` in batches of `batch_size`, strictly one after the other,
    /// and hands every successful payload to `handler`.
    ///
    /// A handler error marks the page as a parse failure. Once the crawl is
    /// cancelled no further batch is issued and the remaining urls are
    /// reported as cancelled.
    pub async fn run<H>(
        &self,
        phase: &str,
        urls: &[String],
        batch_size: usize,
        mut handler: H,
    ) -> PhaseReport
    where
        H: FnMut(&str, Value) -> Result<(), String>,
    {
        let batches = utils::batch(urls, batch_size);
        let mut report = PhaseReport::new(phase);

        let pb = progress_bar(batches.len() as u64);
        pb.set_message(phase.to_string());

        for batch in batches {
            if self.cancel.is_cancelled() {
                for url in &batch {
                    report.record_failure(cancelled(url));
                }
                continue;
            }

            let outcome = self.dispatch(&batch).await;

            for (url, payload) in outcome.successes {
                match handler(&url, payload) {
                    Ok(()) => report.record_success(),
                    Err(e) => report.record_failure(FailedRequest {
                        url,
                        status: Some(200),
                        reason: FailureReason::Parse(e),
                    }),
                }
            }
            for failure in outcome.failures {
                report.record_failure(failure);
            }

            pb.set_message(format!(
                "{phase} ({failed} failed)",
                phase = phase,
                failed = report.failed_count()
            ));
            pb.inc(1);
        }

        pb.finish_and_clear();
        report
    }
}

fn cancelled(url: &str) -> FailedRequest {
    FailedRequest {
        url: url.to_string(),
        status: None,
        reason: FailureReason::Cancelled,
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.blue}] {pos}/{len} batches {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
