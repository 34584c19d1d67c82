mod common;

use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use common::{FnFetcher, ok, status};
use genrecrawl::{
    management::{Dispatcher, NoDelay, RateLimiter},
    spotify::fetch::{FailureReason, FetchResult, PageFetcher},
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn urls(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("https://api.example/page/{i}")).collect()
}

#[derive(Default)]
struct CountingLimiter {
    before: AtomicUsize,
    after: AtomicUsize,
}

struct SharedLimiter(Arc<CountingLimiter>);

#[async_trait]
impl RateLimiter for SharedLimiter {
    async fn before_batch(&self) {
        self.0.before.fetch_add(1, Ordering::SeqCst);
    }

    async fn after_batch(&self) {
        self.0.after.fetch_add(1, Ordering::SeqCst);
    }
}

struct SlowFirstFetcher;

#[async_trait]
impl PageFetcher for SlowFirstFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        if url.ends_with("/0") {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        ok(url, json!({ "url": url }))
    }
}

#[tokio::test]
async fn test_dispatch_partitions_successes_and_failures() {
    let fetcher = Arc::new(FnFetcher::new(|url: &str| {
        if url.ends_with("/1") || url.ends_with("/3") {
            status(url, 500)
        } else {
            ok(url, json!({ "ok": true }))
        }
    }));
    let dispatcher = Dispatcher::new(fetcher.clone(), NoDelay);
    let batch = urls(5);

    let outcome = dispatcher.dispatch(&batch).await;

    assert_eq!(outcome.successes.len(), 3);
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.len(), 5);
    assert_eq!(fetcher.calls(), 5);

    let succeeded: HashSet<&str> = outcome.successes.iter().map(|(u, _)| u.as_str()).collect();
    let failed: HashSet<&str> = outcome.failures.iter().map(|f| f.url.as_str()).collect();
    assert!(succeeded.is_disjoint(&failed));
    for url in &batch {
        assert!(succeeded.contains(url.as_str()) || failed.contains(url.as_str()));
    }

    for failure in &outcome.failures {
        assert_eq!(failure.status, Some(500));
        assert_eq!(failure.reason, FailureReason::Status(500));
    }
}

#[tokio::test]
async fn test_dispatch_collects_in_completion_order() {
    let dispatcher = Dispatcher::new(Arc::new(SlowFirstFetcher), NoDelay);
    let batch = urls(4);

    let outcome = dispatcher.dispatch(&batch).await;

    assert_eq!(outcome.successes.len(), 4);
    // the slow first request finishes last
    assert_eq!(outcome.successes.last().unwrap().0, batch[0]);
}

#[tokio::test]
async fn test_run_walks_batches_and_calls_limiter() {
    let fetcher = Arc::new(FnFetcher::new(|url: &str| ok(url, json!({ "n": 1 }))));
    let limiter = Arc::new(CountingLimiter::default());
    let dispatcher = Dispatcher::new(fetcher.clone(), SharedLimiter(Arc::clone(&limiter)));

    let mut seen = Vec::new();
    let report = dispatcher
        .run("test", &urls(7), 3, |url, _| {
            seen.push(url.to_string());
            Ok(())
        })
        .await;

    assert_eq!(report.requests, 7);
    assert_eq!(report.succeeded, 7);
    assert!(!report.has_failures());
    assert_eq!(seen.len(), 7);
    assert_eq!(limiter.before.load(Ordering::SeqCst), 3);
    assert_eq!(limiter.after.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_run_marks_rejected_payloads_as_parse_failures() {
    let fetcher = Arc::new(FnFetcher::new(|url: &str| {
        if url.ends_with("/2") {
            ok(url, json!({ "unexpected": true }))
        } else {
            ok(url, json!({ "tracks": {} }))
        }
    }));
    let dispatcher = Dispatcher::new(fetcher, NoDelay);

    let report = dispatcher
        .run("test", &urls(4), 2, |_, payload| {
            if payload.get("tracks").is_some() {
                Ok(())
            } else {
                Err("missing tracks".to_string())
            }
        })
        .await;

    assert_eq!(report.requests, 4);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].url, "https://api.example/page/2");
    assert_eq!(report.failed[0].status, Some(200));
    assert!(matches!(report.failed[0].reason, FailureReason::Parse(_)));
}

#[tokio::test]
async fn test_cancelled_run_issues_no_requests() {
    let fetcher = Arc::new(FnFetcher::new(|url: &str| ok(url, json!({}))));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let dispatcher = Dispatcher::new(fetcher.clone(), NoDelay).with_cancellation(cancel);

    let report = dispatcher.run("test", &urls(5), 2, |_, _| Ok(())).await;

    assert_eq!(fetcher.calls(), 0);
    assert_eq!(report.requests, 5);
    assert_eq!(report.failed_count(), 5);
    assert!(
        report
            .failed
            .iter()
            .all(|f| f.reason == FailureReason::Cancelled && f.status.is_none())
    );
}

#[tokio::test]
async fn test_cancel_drops_in_flight_requests() {
    let cancel = CancellationToken::new();
    let dispatcher =
        Dispatcher::new(Arc::new(SlowFirstFetcher), NoDelay).with_cancellation(cancel.clone());
    let batch = urls(3);

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });
    let outcome = dispatcher.dispatch(&batch).await;
    trigger.await.unwrap();

    assert_eq!(outcome.len(), 3);
    assert_eq!(outcome.successes.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].url, batch[0]);
    assert_eq!(outcome.failures[0].reason, FailureReason::Cancelled);
}
