use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// Blocking embeddings client for OpenAI-compatible endpoints.
///
/// Each call is attempted once; a timeout surfaces as [`Error::Embedding`].
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    /// Builds a new embeddings client.
    ///
    /// `dimension` is the vector length the model is expected to return;
    /// responses of any other length are rejected.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("missing embeddings API key".to_string()));
        }
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| Error::Config("invalid embeddings API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to build embeddings HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            dimension,
        })
    }

    fn request(&self, inputs: &[&str]) -> Result<Vec<Embedding>> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|e| Error::Embedding(format!("request to {} failed: {e}", self.endpoint)))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::Embedding(format!("endpoint returned {status}: {text}")));
        }
        let mut parsed: EmbeddingResponse = resp
            .json()
            .map_err(|e| Error::Embedding(format!("failed to parse embedding response: {e}")))?;
        parsed.data.sort_by_key(|entry| entry.index);
        if parsed.data.len() != inputs.len() {
            return Err(Error::Embedding(format!(
                "endpoint returned {} embeddings for {} inputs",
                parsed.data.len(),
                inputs.len()
            )));
        }
        if let Some(entry) = parsed
            .data
            .iter()
            .find(|entry| entry.embedding.len() != self.dimension)
        {
            return Err(Error::Embedding(format!(
                "{} returned a {}-dimensional vector, expected {}",
                self.model,
                entry.embedding.len(),
                self.dimension
            )));
        }
        Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        self.request(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("endpoint returned no embeddings".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{canned_endpoint, silent_endpoint};
    use std::time::Instant;

    fn embedder(base: &str, dimension: usize, timeout: Duration) -> OpenAiEmbedder {
        OpenAiEmbedder::new("key", base, "m", dimension, timeout).unwrap()
    }

    #[test]
    fn test_rejects_blank_key() {
        let result = OpenAiEmbedder::new(
            "  ",
            "https://api.openai.com/v1",
            "text-embedding-3-small",
            1536,
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let embedder = OpenAiEmbedder::new(
            "key",
            "http://localhost:11434/v1/",
            "nomic-embed-text",
            768,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(embedder.endpoint, "http://localhost:11434/v1/embeddings");
        assert_eq!(embedder.dimension(), 768);
        assert_eq!(embedder.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_response_sorted_by_index() {
        let json = r#"{"data":[{"embedding":[0.0,1.0],"index":1},{"embedding":[1.0,0.0],"index":0}]}"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        parsed.data.sort_by_key(|entry| entry.index);
        assert_eq!(parsed.data[0].embedding, vec![1.0, 0.0]);
    }

    #[test]
    fn test_embed_documents_over_http() {
        let base = canned_endpoint(
            200,
            r#"{"data":[{"embedding":[0.0,1.0],"index":1},{"embedding":[1.0,0.0],"index":0}]}"#,
        );
        let mut embedder = embedder(&base, 2, Duration::from_secs(5));

        let vectors = embedder.embed_documents(&["a", "b"]).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_rejects_wrong_dimension() {
        let base = canned_endpoint(200, r#"{"data":[{"embedding":[1.0,0.0,0.0],"index":0}]}"#);
        let mut embedder = embedder(&base, 2, Duration::from_secs(5));

        let err = embedder.embed_query("a").unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(err.to_string().contains("expected 2"));
    }

    #[test]
    fn test_timeout_is_embedding_error() {
        let base = silent_endpoint();
        let mut embedder = embedder(&base, 2, Duration::from_millis(300));

        let started = Instant::now();
        let result = embedder.embed_query("a");

        assert!(matches!(result, Err(Error::Embedding(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_error_status_is_embedding_error() {
        let base = canned_endpoint(500, r#"{"error":"boom"}"#);
        let mut embedder = embedder(&base, 2, Duration::from_secs(5));

        let err = embedder.embed_documents(&["a"]).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(err.to_string().contains("500"));
    }
}
