//! Genre dataset crawler library
//!
//! This library provides the building blocks for crawling the Spotify Web API into
//! a tabular dataset of tracks, artists and audio features for a given genre and
//! release year. It includes modules for API communication, batched concurrent
//! dispatching, tabular accumulation and merging, and the CLI orchestration.
//!
//! # Modules
//!
//! - `cli` - Command-line pipeline implementation
//! - `config` - Configuration management and environment variables
//! - `management` - Dispatching, rate limiting, reports and tables
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Batching, prefix enumeration and overflow helpers
//!
//! # Example
//!
//! ```
//! use genrecrawl::{config, cli};
//!
//! #[tokio::main]
//! async fn main() {
//!     if let Err(e) = config::load_env().await {
//!         eprintln!("Configuration error: {}", e);
//!     }
//!     cli::crawl("indie".to_string(), 2022).await;
//! }
//! ```

pub mod cli;
pub mod config;
pub mod management;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the orchestration layer where errors from several sources
/// (I/O, HTTP, CSV, authentication) meet and are only reported to the user.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Errors raised by the library layer.
///
/// Request-level failures never show up here: those are folded into
/// [`management::PhaseReport`] values. A `CrawlError` means the run itself
/// cannot continue (unreadable credentials, failed authentication, broken
/// output directory).
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("table error: {0}")]
    Table(String),
}

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("First batch: performing {} requests ...", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors. Code after the macro does not run, which lets it
/// stand in for a value in `match` arms.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for every recoverable problem: rejected pages, skipped rows,
/// truncated searches.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
