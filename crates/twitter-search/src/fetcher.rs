//! Fetch strategy trait and the real HTTP implementation
//!
//! `SearchFetcher` decouples the pagination engine from the transport: the
//! engine drives the cursor and counts, the fetcher performs exactly one
//! bounded network call and classifies its outcome. Swapping the real
//! fetcher for the mock is a constructor argument, nothing more.

use std::time::Duration;

use async_trait::async_trait;
use common::Secret;
use tracing::debug;

use crate::error::{FetchError, classify_status, reset_after};
use crate::model::{Page, SearchResponse};

/// Recent-search endpoint of the v2 API.
pub const RECENT_SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";

/// One bounded page fetch against the remote search API.
///
/// `max_results` must already respect the remote per-call cap; `next_token`
/// is the opaque cursor from the previous page, absent on the first call.
#[async_trait]
pub trait SearchFetcher: Send + Sync {
    async fn fetch_page(
        &self,
        token: &Secret,
        query: &str,
        max_results: u32,
        next_token: Option<&str>,
    ) -> Result<Page, FetchError>;
}

/// Real fetcher backed by a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpFetcher {
    /// Fetcher against the production endpoint.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoint(client, RECENT_SEARCH_URL)
    }

    /// Fetcher against an alternate endpoint (tests, mirrors).
    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the per-call timeout (default 30s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl SearchFetcher for HttpFetcher {
    async fn fetch_page(
        &self,
        token: &Secret,
        query: &str,
        max_results: u32,
        next_token: Option<&str>,
    ) -> Result<Page, FetchError> {
        let max = max_results.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("query", query),
            ("max_results", &max),
            ("tweet.fields", "created_at,public_metrics,conversation_id"),
            ("user.fields", "username,name"),
            ("expansions", "author_id"),
        ];
        if let Some(cursor) = next_token {
            params.push(("next_token", cursor));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(token.expose())
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Transient("request timed out".into())
                } else {
                    FetchError::Transient(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let reset = reset_after(
                response
                    .headers()
                    .get("x-rate-limit-reset")
                    .and_then(|v| v.to_str().ok()),
            );
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "search request rejected");
            return Err(classify_status(status.as_u16(), reset));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Transient(format!("malformed response body: {e}")))?;
        Ok(Page::from(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response on a fresh local port.
    async fn serve_once(status_line: &str, headers: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n{headers}\r\n{body}",
            body.len()
        );
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 8192];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    fn token() -> Secret {
        Secret::new("test-bearer")
    }

    #[tokio::test]
    async fn success_parses_page() {
        let body = r#"{
            "data": [{"id": "7", "text": "low energy all week"}],
            "includes": {"users": [{"id": "1", "username": "a", "name": "A"}]},
            "meta": {"result_count": 1, "next_token": "cur-2"}
        }"#;
        let url = serve_once("200 OK", "", body).await;
        let fetcher = HttpFetcher::with_endpoint(reqwest::Client::new(), url);

        let page = fetcher
            .fetch_page(&token(), "depression", 10, None)
            .await
            .unwrap();
        assert_eq!(page.tweets.len(), 1);
        assert_eq!(page.tweets[0].id, "7");
        assert_eq!(page.next_token.as_deref(), Some("cur-2"));
    }

    #[tokio::test]
    async fn unauthorized_is_auth_error() {
        let url = serve_once(
            "401 Unauthorized",
            "",
            r#"{"title":"Unauthorized"}"#,
        )
        .await;
        let fetcher = HttpFetcher::with_endpoint(reqwest::Client::new(), url);

        let err = fetcher
            .fetch_page(&token(), "depression", 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Auth { status: 401 }));
    }

    #[tokio::test]
    async fn too_many_requests_carries_reset_window() {
        let reset_epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 60;
        let url = serve_once(
            "429 Too Many Requests",
            &format!("x-rate-limit-reset: {reset_epoch}\r\n"),
            r#"{"title":"Too Many Requests"}"#,
        )
        .await;
        let fetcher = HttpFetcher::with_endpoint(reqwest::Client::new(), url);

        let err = fetcher
            .fetch_page(&token(), "depression", 10, None)
            .await
            .unwrap_err();
        match err {
            FetchError::RateLimited { reset_after } => {
                let wait = reset_after.expect("reset header should be honored");
                assert!(wait <= Duration::from_secs(60));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let url = serve_once("503 Service Unavailable", "", "{}").await;
        let fetcher = HttpFetcher::with_endpoint(reqwest::Client::new(), url);

        let err = fetcher
            .fetch_page(&token(), "depression", 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transient(_)));
    }

    #[tokio::test]
    async fn garbage_body_is_transient() {
        let url = serve_once("200 OK", "", "not json at all").await;
        let fetcher = HttpFetcher::with_endpoint(reqwest::Client::new(), url);

        let err = fetcher
            .fetch_page(&token(), "depression", 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transient(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_transient() {
        let fetcher =
            HttpFetcher::with_endpoint(reqwest::Client::new(), "http://127.0.0.1:1")
                .with_timeout(Duration::from_millis(500));

        let err = fetcher
            .fetch_page(&token(), "depression", 10, None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transient(_)));
    }
}
