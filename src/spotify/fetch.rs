use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CrawlError, warning};

/// Why a request did not produce a usable payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The server answered with a status other than 200.
    Status(u16),
    /// The request never got an answer (DNS, connection reset, TLS ...).
    Transport(String),
    /// The per-request deadline elapsed.
    Timeout,
    /// The body of a 200 response was not what the caller expected.
    Parse(String),
    /// The crawl was cancelled while the request was in flight.
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Status(code) => write!(f, "status {code}"),
            FailureReason::Transport(e) => write!(f, "transport error: {e}"),
            FailureReason::Timeout => write!(f, "timed out"),
            FailureReason::Parse(e) => write!(f, "unexpected payload: {e}"),
            FailureReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of exactly one GET.
#[derive(Debug, Clone)]
pub enum FetchResult {
    Success {
        url: String,
        payload: Value,
    },
    Failure {
        url: String,
        status: Option<u16>,
        reason: FailureReason,
    },
}

/// Performs one GET and classifies the outcome. Implementations must never
/// panic or return early with an error: every failure is a
/// [`FetchResult::Failure`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Authenticated fetcher for the Spotify Web API.
///
/// Holds one `reqwest::Client`, so every request of a phase goes through the
/// same connection pool.
pub struct SpotifyFetcher {
    client: Client,
    token: String,
}

impl SpotifyFetcher {
    pub fn new(client: Client, token: String) -> Self {
        Self { client, token }
    }

    /// Builds the shared HTTP client with a deadline on every request.
    pub fn client(timeout: Duration) -> Result<Client, CrawlError> {
        Ok(Client::builder().timeout(timeout).build()?)
    }
}

#[async_trait]
impl PageFetcher for SpotifyFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        let response = match self.client.get(url).bearer_auth(&self.token).send().await {
            Ok(resp) => resp,
            Err(err) => {
                let reason = if err.is_timeout() {
                    FailureReason::Timeout
                } else {
                    FailureReason::Transport(err.to_string())
                };
                warning!("request failed ({}) for {}", reason, url);
                return FetchResult::Failure {
                    url: url.to_string(),
                    status: None,
                    reason,
                };
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warning!("invalid request with {} for {}", status.as_u16(), url);
            return FetchResult::Failure {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: FailureReason::Status(status.as_u16()),
            };
        }

        match response.json::<Value>().await {
            Ok(payload) => FetchResult::Success {
                url: url.to_string(),
                payload,
            },
            Err(err) => {
                // the body is read after the headers, so the deadline can still hit here
                let reason = if err.is_timeout() {
                    FailureReason::Timeout
                } else {
                    FailureReason::Parse(err.to_string())
                };
                warning!("cannot read response ({}) for {}", reason, url);
                FetchResult::Failure {
                    url: url.to_string(),
                    status: Some(status.as_u16()),
                    reason,
                }
            }
        }
    }
}
