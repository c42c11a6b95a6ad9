//! Tool invocation seam between handlers and the commerce operations.
//!
//! Handlers never talk to the adapter directly; they go through a
//! `ToolInvoker`, which is either in-process dispatch against the local
//! tools surface or a JSON-RPC call to a deployed tools server. Both return
//! a JSON envelope - transport and shape problems become `{error: ...}`
//! objects, never panics.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use shopfront_commerce::CommerceApi;
use shopfront_tools::{dispatch, RpcRequest};
use tracing::warn;

#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn call_tool(&self, name: &str, arguments: Value) -> Value;
}

/// JSON-RPC client for a remote tools endpoint. The tool result arrives as
/// text content inside the envelope and is re-parsed into JSON here.
pub struct JsonRpcToolClient {
    http: Client,
    endpoint: String,
}

impl JsonRpcToolClient {
    pub fn new(endpoint: String) -> Self {
        Self { http: Client::new(), endpoint }
    }

    async fn try_call(&self, tool_name: &str, arguments: &Value) -> Result<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": tool_name, "arguments": arguments },
            "id": 1,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .context("tool server request failed")?
            .error_for_status()
            .context("tool server returned an error status")?;

        let envelope: Value =
            response.json().await.context("tool server response was not valid JSON")?;

        if let Some(error) = envelope.get("error").filter(|error| !error.is_null()) {
            let message =
                error.get("message").and_then(Value::as_str).unwrap_or("unknown error");
            anyhow::bail!("tool call rejected: {message}");
        }

        content_text(&envelope["result"])
    }
}

#[async_trait]
impl ToolInvoker for JsonRpcToolClient {
    async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        match self.try_call(name, &arguments).await {
            Ok(value) => value,
            Err(error) => {
                warn!(tool = name, error = %error, "remote tool call failed");
                json!({ "error": format!("Tool server error: {error:#}") })
            }
        }
    }
}

/// In-process dispatch against the local tools surface, for environments
/// without a deployed tools server.
pub struct LocalTools {
    api: Arc<CommerceApi>,
}

impl LocalTools {
    pub fn new(api: Arc<CommerceApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ToolInvoker for LocalTools {
    async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        let request = RpcRequest {
            jsonrpc: Some("2.0".to_string()),
            method: "tools/call".to_string(),
            params: json!({ "name": name, "arguments": arguments }),
            id: json!(1),
        };

        let response = dispatch(self.api.as_ref(), request).await;
        if let Some(error) = response.error {
            warn!(tool = name, code = error.code, "local tool call failed");
            return json!({ "error": format!("Local tool call error: {}", error.message) });
        }

        match response.result.as_ref().map(content_text) {
            Some(Ok(value)) => value,
            Some(Err(error)) => json!({ "error": format!("Local tool call error: {error:#}") }),
            None => json!({ "error": "Local tool call error: empty result" }),
        }
    }
}

/// Unwrap `{content: [{type: "text", text}]}` back into the inner JSON.
fn content_text(result: &Value) -> Result<Value> {
    let text = result
        .pointer("/content/0/text")
        .and_then(Value::as_str)
        .context("tool result is missing text content")?;
    serde_json::from_str(text).context("tool content was not valid JSON")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use shopfront_commerce::CommerceApi;
    use shopfront_core::config::AppConfig;

    use super::{LocalTools, ToolInvoker};

    fn local_tools(dummy_responses: bool) -> LocalTools {
        let mut commerce = AppConfig::default().commerce;
        commerce.dummy_responses = dummy_responses;
        LocalTools::new(Arc::new(CommerceApi::new(&commerce).expect("client builds")))
    }

    #[tokio::test]
    async fn local_dispatch_unwraps_the_adapter_envelope() {
        let tools = local_tools(true);
        let result = tools
            .call_tool("get_order_status", json!({ "order_id": 5904242344019i64 }))
            .await;

        assert_eq!(result["dummy_mode"], json!(true));
        assert_eq!(result["order_id"], json!(5904242344019i64));
    }

    #[tokio::test]
    async fn unknown_tool_becomes_an_error_envelope() {
        let tools = local_tools(true);
        let result = tools.call_tool("delete_order", json!({})).await;

        let message = result["error"].as_str().expect("error message");
        assert!(message.contains("Local tool call error"));
    }

    #[tokio::test]
    async fn malformed_arguments_become_an_error_envelope() {
        let tools = local_tools(true);
        let result = tools.call_tool("get_order_status", json!({ "order_id": "later" })).await;

        assert!(result["error"].as_str().expect("error message").contains("invalid params"));
    }
}
