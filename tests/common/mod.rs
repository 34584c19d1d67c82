#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use genrecrawl::{
    CrawlError,
    spotify::{
        Connect,
        fetch::{FailureReason, FetchResult, PageFetcher},
    },
};
use serde_json::Value;

/// Answers every url through a closure and counts the calls.
pub struct FnFetcher<F> {
    respond: F,
    pub calls: AtomicUsize,
}

impl<F> FnFetcher<F>
where
    F: Fn(&str) -> FetchResult + Send + Sync,
{
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<F> PageFetcher for FnFetcher<F>
where
    F: Fn(&str) -> FetchResult + Send + Sync,
{
    async fn fetch(&self, url: &str) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(url)
    }
}

pub fn ok(url: &str, payload: Value) -> FetchResult {
    FetchResult::Success {
        url: url.to_string(),
        payload,
    }
}

pub fn status(url: &str, code: u16) -> FetchResult {
    FetchResult::Failure {
        url: url.to_string(),
        status: Some(code),
        reason: FailureReason::Status(code),
    }
}

/// Hands out the same fetcher for every phase.
pub struct StaticConnector {
    pub fetcher: Arc<dyn PageFetcher>,
    pub connects: AtomicUsize,
}

impl StaticConnector {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            connects: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Connect for StaticConnector {
    async fn connect(&self) -> Result<Arc<dyn PageFetcher>, CrawlError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.fetcher))
    }
}

pub fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("genrecrawl-{}-{}", name, std::process::id()))
}
