//! Informational Q&A handler, retrieval-augmented when credentials allow.
//!
//! The retrieval chain has several stages that can each fail: credential
//! presence, the index sanity check, retrieval itself, and the grounded
//! answer pass. Any failure aborts the whole chain to the same canned
//! fallback, with the cause carried in the payload note.

use std::sync::Arc;

use anyhow::{bail, Result};
use serde_json::{json, Value};
use shopfront_rag::canned::fallback_answer;
use shopfront_rag::Retriever;
use tracing::warn;

use crate::llm::{generate_lenient, LlmClient};

/// Whether retrieval is usable this process. `Unavailable` carries the
/// reason (typically a missing credential) for the fallback note.
#[derive(Clone)]
pub enum RagAccess {
    Ready(Arc<dyn Retriever>),
    Unavailable(String),
}

const OFFER_PROMPT_KEYWORDS: [&str; 9] = [
    "offer",
    "offers",
    "discount",
    "sale",
    "flash",
    "deal",
    "coupon",
    "membership",
    "loyalty",
];

pub async fn run(llm: &dyn LlmClient, rag: &RagAccess, top_k: usize, user_message: &str) -> Value {
    match rag {
        RagAccess::Unavailable(reason) => fallback_payload(user_message, reason),
        RagAccess::Ready(retriever) => {
            match answer_with_retrieval(llm, retriever.as_ref(), top_k, user_message).await {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(error = %error, "retrieval chain failed, serving canned answer");
                    fallback_payload(user_message, &format!("{error:#}"))
                }
            }
        }
    }
}

async fn answer_with_retrieval(
    llm: &dyn LlmClient,
    retriever: &dyn Retriever,
    top_k: usize,
    user_message: &str,
) -> Result<Value> {
    // Sanity check before committing to the full retrieval budget.
    let probe = retriever.similarity_search(user_message, 1).await?;
    if probe.is_empty() {
        bail!("knowledge-base index appears to be empty");
    }

    let documents = retriever.similarity_search(user_message, top_k).await?;
    let context =
        documents.iter().map(|doc| doc.text.as_str()).collect::<Vec<_>>().join("\n\n");

    let grounded = llm.generate(&grounded_prompt(user_message, &context)).await?;
    let grounded = grounded.trim();
    if grounded.is_empty() {
        bail!("model returned no grounded answer");
    }

    // Brand-voice pass; an empty second pass keeps the grounded answer.
    let brand_prompt = if is_offer_query(user_message) {
        offers_format_prompt(grounded)
    } else {
        structured_format_prompt(grounded)
    };
    let formatted = generate_lenient(llm, &brand_prompt).await;
    let answer =
        if formatted.trim().is_empty() { grounded.to_string() } else { formatted.trim().to_string() };

    let mut sources: Vec<String> = Vec::new();
    for document in &documents {
        if let Some(source) = &document.source {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
    }

    Ok(json!({
        "info": { "topic": "general", "answer": answer },
        "sources": sources,
    }))
}

fn fallback_payload(user_message: &str, reason: &str) -> Value {
    let canned = fallback_answer(user_message);
    json!({
        "info": {
            "topic": canned.topic,
            "answer": canned.answer,
            "note": format!("Retrieval not available; showing fallback information. Error: {reason}"),
        },
    })
}

fn is_offer_query(user_message: &str) -> bool {
    let message_lower = user_message.to_lowercase();
    OFFER_PROMPT_KEYWORDS.iter().any(|keyword| message_lower.contains(keyword))
}

fn grounded_prompt(user_message: &str, context: &str) -> String {
    format!(
        "Answer strictly based on the retrieved documents below. If nothing relevant was \
         retrieved, say so.\n\nRetrieved documents:\n{context}\n\nUser question: {user_message}"
    )
}

const FORMATTING_INSTRUCTIONS: &str =
    "Rephrase and organize the content into a polished, conversational Shopfront-branded response.\n\
     - Use headings, bullet points, and bold highlights.\n\
     - Keep it warm, helpful, and modern.\n\
     - Do not include citations, technical details, or raw snippets.\n";

fn offers_format_prompt(raw_answer: &str) -> String {
    format!(
        r#"You are a Shopfront copywriter. Based strictly on the following content, produce a marketing-quality answer.

{FORMATTING_INSTRUCTIONS}

FORMAT THE ANSWER LIKE THIS:
- Title: "Current Offers at Shopfront"
- A warm one-line welcome.
- Numbered sections for each distinct offer found (name + 1-2 bullets with percentages, codes, timing, or categories when available). Do not invent details.
- Optional section: "Exclusive Member Benefits" if such info appears in the content.
- Close with a friendly invitation to ask more.

CONTENT TO USE:
{raw_answer}"#
    )
}

fn structured_format_prompt(raw_answer: &str) -> String {
    format!(
        r#"You are a Shopfront copywriter. Based strictly on the following content, produce a structured, skimmable answer.

{FORMATTING_INSTRUCTIONS}

Preferred structure when applicable:
- Start with a friendly heading (e.g., ### About Shopfront)
- Include subheadings such as **Who We Are**, **Product Range**, **Why Choose Us**, **Member Benefits**, **Sustainability & Community**, **How to Stay Updated**.
- Close with a helpful invitation to explore or ask more.

CONTENT TO USE:
{raw_answer}"#
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::bail;
    use async_trait::async_trait;
    use serde_json::json;
    use shopfront_rag::{RetrievedDocument, Retriever};

    use super::{run, RagAccess};
    use crate::llm::LlmClient;

    struct ScriptedLlm;

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            if prompt.contains("Retrieved documents:") {
                Ok("Returns are accepted within 14 days.".to_string())
            } else {
                Ok("### Returns at Shopfront\nReturns are accepted within 14 days.".to_string())
            }
        }
    }

    struct FixedRetriever {
        documents: Vec<RetrievedDocument>,
    }

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn similarity_search(
            &self,
            _query: &str,
            k: usize,
        ) -> anyhow::Result<Vec<RetrievedDocument>> {
            Ok(self.documents.iter().take(k).cloned().collect())
        }
    }

    struct BrokenRetriever;

    #[async_trait]
    impl Retriever for BrokenRetriever {
        async fn similarity_search(
            &self,
            _query: &str,
            _k: usize,
        ) -> anyhow::Result<Vec<RetrievedDocument>> {
            bail!("index connection refused")
        }
    }

    fn document(text: &str, source: Option<&str>) -> RetrievedDocument {
        RetrievedDocument {
            text: text.to_string(),
            source: source.map(str::to_string),
            score: 0.9,
        }
    }

    #[tokio::test]
    async fn missing_credentials_serve_the_canned_answer_with_a_note() {
        let rag = RagAccess::Unavailable("vector-store API key not found".to_string());
        let payload = run(&ScriptedLlm, &rag, 8, "What is your return policy?").await;

        assert_eq!(payload["info"]["topic"], json!("return_policy"));
        let note = payload["info"]["note"].as_str().expect("note");
        assert!(note.contains("vector-store API key not found"));
        assert!(payload.get("sources").is_none());
    }

    #[tokio::test]
    async fn retrieval_failure_aborts_to_the_canned_answer() {
        let rag = RagAccess::Ready(Arc::new(BrokenRetriever));
        let payload = run(&ScriptedLlm, &rag, 8, "any discounts right now?").await;

        assert_eq!(payload["info"]["topic"], json!("current_offers"));
        assert!(payload["info"]["note"]
            .as_str()
            .expect("note")
            .contains("index connection refused"));
    }

    #[tokio::test]
    async fn empty_index_aborts_to_the_canned_answer() {
        let rag = RagAccess::Ready(Arc::new(FixedRetriever { documents: Vec::new() }));
        let payload = run(&ScriptedLlm, &rag, 8, "how do I contact support?").await;

        assert_eq!(payload["info"]["topic"], json!("contact_details"));
    }

    #[tokio::test]
    async fn successful_retrieval_dedupes_sources_in_insertion_order() {
        let rag = RagAccess::Ready(Arc::new(FixedRetriever {
            documents: vec![
                document("Returns within 14 days.", Some("policies/returns.md")),
                document("Unused items only.", Some("policies/returns.md")),
                document("Contact support for exceptions.", Some("policies/contact.md")),
                document("No source here.", None),
            ],
        }));
        let payload = run(&ScriptedLlm, &rag, 8, "What is your return policy?").await;

        assert_eq!(
            payload["sources"],
            json!(["policies/returns.md", "policies/contact.md"])
        );
        assert!(payload["info"]["answer"]
            .as_str()
            .expect("answer")
            .contains("Returns are accepted"));
        assert!(payload["info"].get("note").is_none());
    }
}
