use std::time::Duration;

use genrecrawl::spotify::fetch::{FailureReason, FetchResult, PageFetcher, SpotifyFetcher};
use serde_json::json;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

const TOKEN: &str = "test-token";

/// Serves canned answers by request path until the test ends.
async fn serve() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(answer(stream));
        }
    });

    format!("http://{addr}")
}

async fn answer(mut stream: TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let request = String::from_utf8_lossy(&buf).to_lowercase();
    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
    let authorized = request.contains(&format!("authorization: bearer {TOKEN}"));

    let (status, body) = if !authorized {
        ("401 Unauthorized", r#"{"error":"no token"}"#.to_string())
    } else {
        match path.as_str() {
            "/ok" => ("200 OK", json!({ "tracks": { "items": [], "total": 0 } }).to_string()),
            "/limited" => ("429 Too Many Requests", r#"{"error":"slow down"}"#.to_string()),
            "/garbage" => ("200 OK", "<html>not json</html>".to_string()),
            "/slow" => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                ("200 OK", "{}".to_string())
            }
            _ => ("404 Not Found", "{}".to_string()),
        }
    };

    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn fetcher(timeout: Duration) -> SpotifyFetcher {
    SpotifyFetcher::new(SpotifyFetcher::client(timeout).unwrap(), TOKEN.to_string())
}

#[tokio::test]
async fn test_fetch_success() {
    let base = serve().await;
    let url = format!("{base}/ok");

    match fetcher(Duration::from_secs(5)).fetch(&url).await {
        FetchResult::Success { url: got, payload } => {
            assert_eq!(got, url);
            assert_eq!(payload["tracks"]["total"], 0);
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_non_200_is_status_failure() {
    let base = serve().await;
    let url = format!("{base}/limited");

    match fetcher(Duration::from_secs(5)).fetch(&url).await {
        FetchResult::Failure {
            url: got,
            status,
            reason,
        } => {
            assert_eq!(got, url);
            assert_eq!(status, Some(429));
            assert_eq!(reason, FailureReason::Status(429));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_sends_bearer_token() {
    let base = serve().await;
    let client = SpotifyFetcher::client(Duration::from_secs(5)).unwrap();
    let anonymous = SpotifyFetcher::new(client, "other".to_string());

    match anonymous.fetch(&format!("{base}/ok")).await {
        FetchResult::Failure { status, .. } => assert_eq!(status, Some(401)),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_malformed_body_is_parse_failure() {
    let base = serve().await;

    match fetcher(Duration::from_secs(5))
        .fetch(&format!("{base}/garbage"))
        .await
    {
        FetchResult::Failure { status, reason, .. } => {
            assert_eq!(status, Some(200));
            assert!(matches!(reason, FailureReason::Parse(_)));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_closed_port_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    match fetcher(Duration::from_secs(5))
        .fetch(&format!("http://{addr}/ok"))
        .await
    {
        FetchResult::Failure { status, reason, .. } => {
            assert_eq!(status, None);
            assert!(matches!(reason, FailureReason::Transport(_)));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_deadline_is_timeout_failure() {
    let base = serve().await;

    match fetcher(Duration::from_millis(200))
        .fetch(&format!("{base}/slow"))
        .await
    {
        FetchResult::Failure { status, reason, .. } => {
            assert_eq!(status, None);
            assert_eq!(reason, FailureReason::Timeout);
        }
        other => panic!("expected failure, got {other:?}"),
    }
}
