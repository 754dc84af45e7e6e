//! Source retrieval over HTTP

use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// Downloads raw asset bytes from their source URL
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a new fetcher
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch the bytes behind a source URL.
    ///
    /// Any transport failure, non-success status, or truncated body maps to
    /// a fetch error carrying the URL.
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        if url.trim().is_empty() {
            return Err(Error::fetch(url, "source URL is empty"));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("server returned {}", status)));
        }

        response
            .bytes()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn fetcher() -> Fetcher {
        Fetcher::new(&FetchConfig { timeout_secs: 5 })
    }

    #[tokio::test]
    async fn test_fetch_returns_body_bytes() {
        let base = spawn_server(Router::new().route("/doc.txt", get(|| async { "hello" }))).await;
        let bytes = fetcher().fetch(&format!("{}/doc.txt", base)).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn test_fetch_rejects_empty_url() {
        let err = fetcher().fetch("   ").await.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_maps_not_found_to_fetch_error() {
        let base = spawn_server(Router::new()).await;
        let url = format!("{}/missing.pdf", base);
        let err = fetcher().fetch(&url).await.unwrap_err();
        match err {
            Error::Fetch { url: got, message } => {
                assert_eq!(got, url);
                assert!(message.contains("404"));
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_maps_connection_refused_to_fetch_error() {
        // Bind then drop a listener so the port is very likely closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher().fetch(&format!("http://{}/x", addr)).await.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }
}
