//! Order creation handler.
//!
//! Extract a variant id and customer email from the message, refuse to call
//! the adapter while anything is missing, then submit a single line item and
//! reformat the adapter envelope into the fixed display schema.

use serde::Deserialize;
use serde_json::{json, Value};
use shopfront_core::extract::{extract, extract_json};
use tracing::debug;

use crate::llm::{generate_lenient, LlmClient};
use crate::tools::ToolInvoker;

const MISSING_INFO_MESSAGE: &str =
    "Missing information. Please provide variant ID and email address to create an order.";

#[derive(Debug, Deserialize)]
struct OrderDraft {
    #[serde(default)]
    variant_id: Option<Value>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default = "default_quantity")]
    quantity: u32,
    // Absent flag is treated as "more info needed", not as consent.
    #[serde(default = "default_true")]
    needs_more_info: bool,
}

fn default_quantity() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl OrderDraft {
    fn variant_id(&self) -> Option<String> {
        let value = self.variant_id.as_ref()?;
        value
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .or_else(|| value.as_i64().map(|id| id.to_string()))
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|email| !email.is_empty())
    }
}

pub async fn run(llm: &dyn LlmClient, tools: &dyn ToolInvoker, user_message: &str) -> Value {
    let raw = generate_lenient(llm, &extraction_prompt(user_message)).await;
    let draft = match extract::<OrderDraft>(&raw) {
        Ok(draft) => draft,
        Err(error) => {
            return json!({ "error": format!("Order parsing failed: {error}") });
        }
    };

    let (Some(variant_id), Some(email)) = (draft.variant_id(), draft.email()) else {
        return json!({ "error": MISSING_INFO_MESSAGE });
    };
    if draft.needs_more_info {
        return json!({ "error": MISSING_INFO_MESSAGE });
    }

    let Ok(variant_id) = variant_id.parse::<i64>() else {
        return json!({ "error": "Invalid variant ID format." });
    };

    let arguments = json!({
        "line_items": [{
            "variant_id": variant_id,
            "quantity": draft.quantity,
            "title": "Product",
            "price": 0,
        }],
        "customer_email": email,
        "financial_status": "paid",
        "test": true,
    });

    let raw_order = tools.call_tool("create_order", arguments).await;

    let formatted = generate_lenient(llm, &format_prompt(&raw_order)).await;
    match extract_json(&formatted) {
        Ok(display) => display,
        Err(error) => {
            debug!(error = %error, "order formatting unusable, returning raw envelope");
            raw_order
        }
    }
}

fn extraction_prompt(user_message: &str) -> String {
    format!(
        r#"Extract order information from the user message and return a JSON object:
{{
    "variant_id": "extracted variant ID if mentioned",
    "email": "extracted email if mentioned",
    "quantity": 1,
    "needs_more_info": true/false
}}

User Message: "{user_message}"

If variant_id or email is missing, set needs_more_info to true.
Return ONLY the JSON object."#
    )
}

fn format_prompt(raw_order: &Value) -> String {
    let raw = serde_json::to_string_pretty(raw_order).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"Format the order creation result into the exact JSON structure below:

Required JSON format:
{{
  "order_created": {{
    "id": "ORDER_ID",
    "order_id": "ORDER_NUMBER",
    "product": "PRODUCT_TITLE",
    "total_paid": "AMOUNT INR",
    "message": "Your order has been placed successfully! Use the ID: ORDER_ID to track your order status at any time."
  }}
}}

Raw order result: {raw}

Extract the order ID, order number, product title, and total amount from the raw data.
Return ONLY the formatted JSON, no other text."#
    )
}
