//! # Spotify Integration Module
//!
//! This module is the integration layer between the crawler and the Spotify Web
//! API. It authenticates with the client-credentials grant, classifies every GET
//! into a [`fetch::FetchResult`], and implements the two request-heavy parts of a
//! crawl: the alphabetical track search and the bulk metadata lookups.
//!
//! ## Architecture
//!
//! ```text
//! Pipeline (cli::crawl)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (client credentials)
//!     ├── Track Search (prefix enumeration + overflow pages)
//!     └── Metadata Joiners (tracks, artists, audio features)
//!          ↓
//! Dispatching (management::Dispatcher, batches + cooldowns)
//!          ↓
//! Page Fetcher (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## API Coverage
//!
//! - `POST /api/token` - client-credentials token request
//! - `GET /search` - track search, 50 results per page, prefix filtered
//! - `GET /tracks?ids=` - up to 50 tracks per request
//! - `GET /artists?ids=` - up to 50 artists per request
//! - `GET /audio-features?ids=` - up to 100 tracks per request
//!
//! ## Error Handling
//!
//! Request failures never abort a crawl. A page that fails (non-200 status,
//! transport error, timeout, unexpected body) is logged and recorded in the
//! phase report; the data it would have contributed is missing from the
//! output. Only authentication failures are returned as errors.
//!
//! ## Token Lifetime
//!
//! A token is requested once per phase and never refreshed.

pub mod auth;
pub mod fetch;
pub mod metadata;
pub mod search;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{CrawlError, types::Credentials};

use fetch::{PageFetcher, SpotifyFetcher};

/// Opens an authenticated session for one crawl phase.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn PageFetcher>, CrawlError>;
}

/// Client-credentials login against the configured token endpoint.
pub struct SpotifyConnector {
    credentials: Credentials,
    timeout: Duration,
}

impl SpotifyConnector {
    pub fn new(credentials: Credentials, timeout: Duration) -> Self {
        Self {
            credentials,
            timeout,
        }
    }
}

#[async_trait]
impl Connect for SpotifyConnector {
    /// Requests a new token and returns a fetcher backed by a fresh
    /// connection pool.
    async fn connect(&self) -> Result<Arc<dyn PageFetcher>, CrawlError> {
        let client = SpotifyFetcher::client(self.timeout)?;
        let token = auth::request_token(&client, &self.credentials).await?;
        Ok(Arc::new(SpotifyFetcher::new(client, token)))
    }
}
