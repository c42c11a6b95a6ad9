use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{RetrievedDocument, Retriever};

/// Client for a managed vector index with a text-query search endpoint.
/// The index embeds the query server-side, so only the question text and a
/// result budget travel over the wire.
pub struct VectorIndexClient {
    http: Client,
    api_key: SecretString,
    index_host: String,
    index_name: String,
}

impl VectorIndexClient {
    pub fn new(api_key: SecretString, index_host: String, index_name: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            index_host: index_host.trim_end_matches('/').to_string(),
            index_name,
        }
    }
}

#[async_trait]
impl Retriever for VectorIndexClient {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
        let url = format!(
            "{}/records/namespaces/{}/search",
            self.index_host, self.index_name
        );
        let body = json!({
            "query": { "inputs": { "text": query }, "top_k": k },
            "fields": ["text", "source"],
        });

        let response = self
            .http
            .post(&url)
            .header("Api-Key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context("vector index request failed")?
            .error_for_status()
            .context("vector index returned an error status")?;

        let parsed: SearchResponse =
            response.json().await.context("vector index response was not valid JSON")?;

        let documents = parsed
            .result
            .hits
            .into_iter()
            .map(|hit| RetrievedDocument {
                text: hit.text().to_string(),
                source: hit.source(),
                score: hit.score,
            })
            .collect::<Vec<_>>();

        debug!(query, hits = documents.len(), "similarity search completed");
        Ok(documents)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: SearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_score", default)]
    score: f64,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

impl Hit {
    fn text(&self) -> &str {
        self.fields
            .get("text")
            .or_else(|| self.fields.get("chunk_text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    fn source(&self) -> Option<String> {
        self.fields.get("source").and_then(Value::as_str).map(str::to_string)
    }
}
