//! # CLI Module
//!
//! This module provides the command-line layer of the crawler. It wires the
//! configuration, the Spotify session and the management components into one
//! linear pipeline and turns its result into user-facing output.
//!
//! ## Pipeline
//!
//! ```text
//! credentials.json ─▶ token ─▶ prefix search (aaa..zzz) ─▶ overflow pages
//!                                        │
//!                                        ▼
//!                              track.csv (raw), dedupe (name, artist)
//!                                        │
//!            ┌───────────────────────────┼───────────────────────────┐
//!            ▼                           ▼                           ▼
//!   artist_metadata.csv        track_metadata.csv          track_features.csv
//!            └───────────────────────────┼───────────────────────────┘
//!                                        ▼
//!                        inner joins ─▶ track.csv (final)
//! ```
//!
//! ## Output
//!
//! Everything is written to a folder named after the current date
//! (`YYYY_MM_DD`) in the working directory. A `failures.json` with the
//! per-phase reports is added when any request failed.
//!
//! ## Error Handling
//!
//! Failed requests shrink the dataset but never stop the run. Missing
//! credentials, a rejected token request or I/O errors on the output folder
//! end the program through the `error!` macro.

mod crawl;

pub use crawl::CrawlOutcome;
pub use crawl::CrawlSettings;
pub use crawl::crawl;
pub use crawl::full_download;
