use std::path::Path;

use reqwest::Client;
use serde_json::Value;

use crate::{
    CrawlError, config,
    types::Credentials,
};

/// Loads the client credentials from a JSON file with `client_id` and
/// `client_secret`.
///
/// # Errors
///
/// Fails if the file cannot be read or one of the two fields is missing.
pub async fn load_credentials(path: &Path) -> Result<Credentials, CrawlError> {
    let content = async_fs::read_to_string(path).await?;
    let credentials: Credentials = serde_json::from_str(&content)?;
    Ok(credentials)
}

/// Requests an access token with the OAuth 2.0 client-credentials grant and
/// returns the bearer token.
///
/// The token is used as is for a whole crawl phase. There is no refresh: a
/// phase that outlives the token sees its remaining requests fail with 401.
///
/// # Errors
///
/// - `CrawlError::Http` on network failures or an unreadable body
/// - `CrawlError::Auth` when the token endpoint rejects the credentials or
///   answers without an `access_token`
pub async fn request_token(
    client: &Client,
    credentials: &Credentials,
) -> Result<String, CrawlError> {
    let res = client
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ])
        .send()
        .await?;

    let status = res.status();
    let json: Value = res.json().await?;

    let Some(access_token) = json["access_token"].as_str() else {
        let reason = json["error_description"]
            .as_str()
            .or_else(|| json["error"].as_str())
            .unwrap_or("no access token in response");
        return Err(CrawlError::Auth(format!("{reason} (status {status})")));
    };

    Ok(access_token.to_string())
}
