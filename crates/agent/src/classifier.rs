//! Intent classification: one LLM call plus a keyword safety net.

use serde_json::Value;
use shopfront_core::extract::extract_json;
use shopfront_core::state::Intent;
use tracing::debug;

use crate::llm::{generate_lenient, LlmClient};

/// Keyword lists for the fallback path. Checks run in this order, so a
/// message matching several lists resolves by priority, not confidence -
/// a known limitation of the fallback, not a tie-break guarantee.
const ORDER_CREATION_KEYWORDS: [&str; 4] = ["buy", "purchase", "order", "add to cart"];
const ORDER_STATUS_KEYWORDS: [&str; 4] = ["track", "status", "order id", "tracking"];
const INFO_SEARCH_KEYWORDS: [&str; 13] = [
    "return",
    "refund",
    "exchange",
    "contact",
    "phone",
    "email",
    "support",
    "address",
    "offer",
    "discount",
    "sale",
    "promotion",
    "deal",
];

#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub details: Value,
}

/// Classify one user message. The LLM path wins when it produces a parsable
/// object; anything else (empty output, prose, broken JSON) drops to the
/// keyword fallback, which always yields exactly one tag.
pub async fn classify(llm: &dyn LlmClient, user_message: &str) -> Classification {
    let raw = generate_lenient(llm, &classification_prompt(user_message)).await;

    match extract_json(&raw) {
        Ok(value) => {
            let intent = value
                .get("intent")
                .and_then(Value::as_str)
                .and_then(|tag| tag.parse::<Intent>().ok())
                .unwrap_or(Intent::ProductSearch);
            let details = value.get("details").cloned().unwrap_or_else(empty_object);
            Classification { intent, details }
        }
        Err(error) => {
            debug!(error = %error, "classifier output unusable, using keyword fallback");
            Classification { intent: keyword_fallback(user_message), details: empty_object() }
        }
    }
}

/// Ordered keyword-membership check. Always lands on exactly one tag;
/// unmatched messages default to product search.
pub fn keyword_fallback(user_message: &str) -> Intent {
    let message_lower = user_message.to_lowercase();
    let contains_any =
        |keywords: &[&str]| keywords.iter().any(|keyword| message_lower.contains(keyword));

    if contains_any(&ORDER_CREATION_KEYWORDS) {
        Intent::OrderCreation
    } else if contains_any(&ORDER_STATUS_KEYWORDS) {
        Intent::OrderStatus
    } else if contains_any(&INFO_SEARCH_KEYWORDS) {
        Intent::InfoSearch
    } else {
        Intent::ProductSearch
    }
}

fn classification_prompt(user_message: &str) -> String {
    format!(
        r#"Analyze the user message and classify the intent. Return ONLY a JSON object with the following structure:
{{
    "intent": "product_search" | "order_creation" | "order_status" | "info_search",
    "confidence": 0.0-1.0,
    "details": {{
        "extracted_info": "relevant information extracted from the message"
    }}
}}

Intent Classification Rules:
- "product_search": User is looking for products, asking about availability, prices, or product information
- "order_creation": User wants to buy/purchase/order something, mentions placing an order
- "order_status": User wants to track/check order status, mentions order ID or tracking
- "info_search": User is asking for business information such as return/exchange policy, contact details (phone/email/address), current offers/discounts/promotions

User Message: "{user_message}"

Examples:
- "Show me floral shirts" -> product_search
- "I want to buy this product" -> order_creation
- "What's the status of order 12345?" -> order_status
- "Track my order" -> order_status
- "What is your return policy?" -> info_search
- "How can I contact support?" -> info_search
- "Any offers or discounts right now?" -> info_search

Return ONLY the JSON object, no other text."#
    )
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
