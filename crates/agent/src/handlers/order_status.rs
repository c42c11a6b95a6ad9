//! Order status handler.
//!
//! Extract a numeric order id from free text, short-circuit on anything
//! invalid or missing, then query the adapter and reformat the envelope
//! into the fixed display schema.

use serde::Deserialize;
use serde_json::{json, Value};
use shopfront_core::extract::{extract, extract_json};
use tracing::debug;

use crate::llm::{generate_lenient, LlmClient};
use crate::tools::ToolInvoker;

#[derive(Debug, Deserialize)]
struct OrderIdProbe {
    #[serde(default)]
    order_id: Option<Value>,
    #[serde(default)]
    found: bool,
}

pub async fn run(llm: &dyn LlmClient, tools: &dyn ToolInvoker, user_message: &str) -> Value {
    let raw = generate_lenient(llm, &extraction_prompt(user_message)).await;
    let probe = match extract::<OrderIdProbe>(&raw) {
        Ok(probe) => probe,
        Err(error) => {
            return json!({ "error": format!("Order ID parsing failed: {error}") });
        }
    };

    if !probe.found {
        return json!({ "error": "Please provide a valid order ID to check status." });
    }

    let Some(order_id) = probe.order_id.as_ref().and_then(value_to_order_id) else {
        return json!({ "error": "Invalid order ID format." });
    };

    let raw_status = tools.call_tool("get_order_status", json!({ "order_id": order_id })).await;

    let formatted = generate_lenient(llm, &format_prompt(&raw_status)).await;
    match extract_json(&formatted) {
        Ok(display) => display,
        Err(error) => {
            debug!(error = %error, "status formatting unusable, returning raw envelope");
            raw_status
        }
    }
}

/// The adapter expects an integer id; the model may hand back a number or a
/// digit string.
fn value_to_order_id(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_str().and_then(|text| text.trim().parse().ok()))
}

fn extraction_prompt(user_message: &str) -> String {
    format!(
        r#"Extract the order ID from the user message. Return ONLY a JSON object:
{{
    "order_id": "extracted order ID",
    "found": true/false
}}

User Message: "{user_message}"

Look for numbers that could be order IDs. Return ONLY the JSON object."#
    )
}

fn format_prompt(raw_status: &Value) -> String {
    let raw = serde_json::to_string_pretty(raw_status).unwrap_or_else(|_| "{}".to_string());
    format!(
        r##"Format the order status result into the exact JSON structure below:

Required JSON format:
{{
  "order_id": order_id_number,
  "order_number": "#ORDER_NUMBER",
  "product": "PRODUCT_NAME",
  "quantity": quantity_number,
  "total_paid": "AMOUNT INR",
  "status": "STATUS",
  "fulfillment_status": "FULFILLMENT_STATUS",
  "order_date": "YYYY-MM-DD HH:MM:SS"
}}

Raw order status result: {raw}

Extract the order ID, order number, product name, quantity, total amount, status, fulfillment status, and order date from the raw data.
For fulfillment_status, use "Not yet shipped" if null or empty, otherwise use the actual status.
Return ONLY the formatted JSON, no other text."##
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::run;
    use crate::llm::LlmClient;
    use crate::tools::ToolInvoker;

    struct ScriptedLlm {
        extraction: &'static str,
        formatting: &'static str,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            if prompt.contains("Extract the order ID") {
                Ok(self.extraction.to_string())
            } else {
                Ok(self.formatting.to_string())
            }
        }
    }

    #[derive(Default)]
    struct RecordingTools {
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingTools {
        fn call_count(&self) -> usize {
            self.calls.lock().expect("lock").len()
        }
    }

    #[async_trait]
    impl ToolInvoker for RecordingTools {
        async fn call_tool(&self, name: &str, arguments: Value) -> Value {
            self.calls.lock().expect("lock").push((name.to_string(), arguments));
            json!({
                "success": true,
                "order_id": 5904242344019i64,
                "order_number": 1001,
                "financial_status": "paid",
                "fulfillment_status": Value::Null,
            })
        }
    }

    #[tokio::test]
    async fn missing_order_id_never_reaches_the_adapter() {
        let llm = ScriptedLlm {
            extraction: r#"{"order_id": null, "found": false}"#,
            formatting: "",
        };
        let tools = RecordingTools::default();

        let payload = run(&llm, &tools, "track my order").await;

        assert!(payload["error"].as_str().expect("error").contains("valid order ID"));
        assert_eq!(tools.call_count(), 0);
    }

    #[tokio::test]
    async fn non_numeric_order_id_never_reaches_the_adapter() {
        let llm = ScriptedLlm {
            extraction: r#"{"order_id": "ORD-ABC", "found": true}"#,
            formatting: "",
        };
        let tools = RecordingTools::default();

        let payload = run(&llm, &tools, "status of order ORD-ABC").await;

        assert_eq!(payload["error"], json!("Invalid order ID format."));
        assert_eq!(tools.call_count(), 0);
    }

    #[tokio::test]
    async fn digit_string_order_id_is_accepted() {
        let llm = ScriptedLlm {
            extraction: r#"{"order_id": "5904242344019", "found": true}"#,
            formatting: r##"{"order_id": 5904242344019, "order_number": "#1001", "product": "Sample", "quantity": 1, "total_paid": "29.99 INR", "status": "paid", "fulfillment_status": "Not yet shipped", "order_date": "2026-08-02 10:00:00"}"##,
        };
        let tools = RecordingTools::default();

        let payload = run(&llm, &tools, "What's the status of order 5904242344019?").await;

        assert_eq!(payload["order_id"], json!(5904242344019i64));
        assert_eq!(payload["fulfillment_status"], json!("Not yet shipped"));

        let calls = tools.calls.lock().expect("lock");
        assert_eq!(calls[0].0, "get_order_status");
        assert_eq!(calls[0].1, json!({ "order_id": 5904242344019i64 }));
    }

    #[tokio::test]
    async fn unusable_formatting_falls_back_to_the_raw_envelope() {
        let llm = ScriptedLlm {
            extraction: r#"{"order_id": 42, "found": true}"#,
            formatting: "the order looks fine to me",
        };
        let tools = RecordingTools::default();

        let payload = run(&llm, &tools, "status of order 42").await;

        assert_eq!(payload["success"], json!(true));
        assert_eq!(tools.call_count(), 1);
    }
}
