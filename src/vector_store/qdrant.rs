//! Qdrant vector store implementation over its JSON REST API.

use super::{IndexedChunk, ScoredChunk, VectorStore};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

/// Qdrant-backed vector store.
pub struct QdrantStore {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl QdrantStore {
    /// Create a store for a Qdrant instance at `url` (e.g. `http://localhost:6333`).
    pub fn new(url: &str, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    async fn collection_exists(&self, collection: &str) -> Result<bool> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/collections/{}", collection),
            )
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => Err(SvarError::VectorStore(format!(
                "collection lookup failed with status {}",
                status
            ))),
        }
    }
}

/// Surface a Qdrant error status with its response body.
async fn check_status(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(SvarError::VectorStore(format!(
        "{} failed with status {}: {}",
        operation, status, body
    )))
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> Result<()> {
        if self.collection_exists(collection).await? {
            return Ok(());
        }

        info!("Creating collection {} ({} dims)", collection, dimensions);
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}", collection),
            )
            .json(&json!({
                "vectors": { "size": dimensions, "distance": "Cosine" }
            }))
            .send()
            .await?;
        check_status(response, "collection create").await?;
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[IndexedChunk]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let points: Vec<serde_json::Value> = records
            .iter()
            .map(|record| {
                json!({
                    "id": record.id.to_string(),
                    "vector": record.embedding,
                    "payload": {
                        "content": record.content,
                        "source": record.source,
                        "note": record.note,
                    }
                })
            })
            .collect();

        debug!("Upserting {} points into {}", points.len(), collection);
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}/points?wait=true", collection),
            )
            .json(&json!({ "points": points }))
            .send()
            .await?;
        check_status(response, "point upsert").await?;

        Ok(records.len())
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{}/points/search", collection),
            )
            .json(&json!({
                "vector": query,
                "limit": limit,
                "with_payload": true,
            }))
            .send()
            .await?;
        let response = check_status(response, "similarity search").await?;

        let body: SearchResponse = response.json().await?;
        Ok(body
            .result
            .into_iter()
            .map(|hit| ScoredChunk {
                content: hit.payload.content.unwrap_or_default(),
                source: hit.payload.source.unwrap_or_default(),
                score: hit.score,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    score: f32,
    #[serde(default)]
    payload: HitPayload,
}

#[derive(Debug, Default, Deserialize)]
struct HitPayload {
    content: Option<String>,
    source: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = QdrantStore::new("http://localhost:6333/", None);
        assert_eq!(store.base_url, "http://localhost:6333");
    }

    #[test]
    fn test_search_response_parsing() {
        let body = r#"{
            "result": [
                {"id": "a", "score": 0.92, "payload": {"content": "text", "source": "inline", "note": null}},
                {"id": "b", "score": 0.45, "payload": {"content": "more", "source": "doc.pdf"}}
            ],
            "status": "ok",
            "time": 0.001
        }"#;

        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.result.len(), 2);
        assert_eq!(parsed.result[0].payload.content.as_deref(), Some("text"));
        assert!((parsed.result[1].score - 0.45).abs() < f32::EPSILON);
    }
}
