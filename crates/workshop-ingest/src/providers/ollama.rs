//! Ollama embedding provider using the batched embed endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

/// Ollama embedding provider using nomic-embed-text or similar models
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: &EmbeddingConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);
        let request = EmbedRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::embedding(format!(
                "embedding failed: HTTP {}",
                response.status()
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("failed to parse embedding response: {}", e)))?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(Error::embedding(format!(
                "provider returned {} embeddings for {} inputs",
                embed_response.embeddings.len(),
                texts.len()
            )));
        }

        Ok(embed_response.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Captured = Arc<Mutex<Option<serde_json::Value>>>;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn embedder_for(base_url: String) -> OllamaEmbedder {
        OllamaEmbedder::new(&EmbeddingConfig {
            base_url,
            model: "nomic-embed-text".to_string(),
            dimensions: 4,
            timeout_secs: 5,
        })
    }

    async fn embed_endpoint(
        State(captured): State<Captured>,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        let count = body["input"].as_array().map(|a| a.len()).unwrap_or(0);
        *captured.lock() = Some(body);
        let embeddings: Vec<Vec<f32>> = (0..count).map(|i| vec![i as f32; 4]).collect();
        Json(serde_json::json!({ "embeddings": embeddings }))
    }

    #[tokio::test]
    async fn test_embed_batch_posts_model_and_inputs() {
        let captured: Captured = Arc::new(Mutex::new(None));
        let router = Router::new()
            .route("/api/embed", post(embed_endpoint))
            .with_state(Arc::clone(&captured));
        let base = spawn_server(router).await;

        let texts = vec!["first".to_string(), "second".to_string()];
        let embeddings = embedder_for(base).embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0], vec![0.0; 4]);
        assert_eq!(embeddings[1], vec![1.0; 4]);

        let body = captured.lock().take().unwrap();
        assert_eq!(body["model"], "nomic-embed-text");
        assert_eq!(body["input"], serde_json::json!(["first", "second"]));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_the_request() {
        // Unroutable base URL: an attempted request would error out.
        let embedder = embedder_for("http://127.0.0.1:1".to_string());
        let embeddings = embedder.embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_embedding_error() {
        let router = Router::new().route(
            "/api/embed",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_server(router).await;

        let err = embedder_for(base)
            .embed_batch(&["text".to_string()])
            .await
            .unwrap_err();
        match err {
            Error::Embedding(message) => assert!(message.contains("500")),
            other => panic!("expected embedding error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_count_mismatch_is_rejected() {
        let router = Router::new().route(
            "/api/embed",
            post(|| async { Json(serde_json::json!({ "embeddings": [[0.1, 0.2, 0.3, 0.4]] })) }),
        );
        let base = spawn_server(router).await;

        let err = embedder_for(base)
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        match err {
            Error::Embedding(message) => assert!(message.contains("1 embeddings for 2 inputs")),
            other => panic!("expected embedding error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_health_check_probes_tags_endpoint() {
        let router = Router::new().route(
            "/api/tags",
            get(|| async { Json(serde_json::json!({ "models": [] })) }),
        );
        let base = spawn_server(router).await;
        assert!(embedder_for(base).health_check().await.unwrap());

        let down = embedder_for("http://127.0.0.1:1".to_string());
        assert!(!down.health_check().await.unwrap());
    }
}
