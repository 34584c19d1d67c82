//! Configuration management for the genre crawler.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Nothing here is exposed on the command line: the CLI
//! only takes the genre and the year, everything else has a default that can be
//! overridden through the environment.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults

use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Loads environment variables from `.env` files.
///
/// Creates the platform-specific data directory if it doesn't exist, loads a
/// `.env` from the working directory and then `genrecrawl/.env` from the data
/// directory. `dotenv` never overrides variables that are already set, so the
/// working directory file wins over the data directory file.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/genrecrawl/.env`
/// - macOS: `~/Library/Application Support/genrecrawl/.env`
/// - Windows: `%LOCALAPPDATA%/genrecrawl/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created. Missing
/// `.env` files are not errors.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    let _ = dotenv::dotenv();
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns the local data directory of the application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("genrecrawl");
    path
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`).
///
/// Trailing slashes are stripped so endpoint paths can be appended with `/`.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL")
        .unwrap_or_else(|_| DEFAULT_SPOTIFY_API_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Returns the OAuth token URL used for the client-credentials grant
/// (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|_| DEFAULT_SPOTIFY_API_TOKEN_URL.to_string())
}

/// Returns the path of the JSON credentials file (`GENRECRAWL_CREDENTIALS`).
pub fn credentials_path() -> PathBuf {
    env::var("GENRECRAWL_CREDENTIALS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CREDENTIALS_PATH))
}

/// Returns the deadline applied to every single request
/// (`GENRECRAWL_REQUEST_TIMEOUT_SECS`).
///
/// Unparsable or zero values fall back to the default.
pub fn request_timeout() -> Duration {
    let secs = env::var("GENRECRAWL_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    Duration::from_secs(secs)
}
