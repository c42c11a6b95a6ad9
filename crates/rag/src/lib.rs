//! Query-time retrieval against the store knowledge base.
//!
//! Ingestion lives elsewhere; this crate only knows how to ask a managed
//! vector index for the documents closest to a question, and what to answer
//! when retrieval is unavailable.

pub mod canned;
mod index;

use anyhow::Result;
use async_trait::async_trait;

pub use index::VectorIndexClient;

/// One retrieved knowledge-base chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrievedDocument {
    pub text: String,
    pub source: Option<String>,
    pub score: f64,
}

#[async_trait]
pub trait Retriever: Send + Sync {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<RetrievedDocument>>;
}
