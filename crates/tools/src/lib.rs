//! JSON-RPC tools surface for the commerce adapter.
//!
//! Exposes the two order operations as named tools behind a single POST
//! endpoint speaking the JSON-RPC 2.0 envelope: `tools/list` returns the
//! tool descriptors with JSON-schema parameters, `tools/call` dispatches by
//! tool name and wraps the adapter's JSON envelope as text content.

mod server;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shopfront_commerce::{CommerceApi, LineItem};
use thiserror::Error;

pub use server::router;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct RpcErrorBody {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Convert to JSON-RPC error code.
    pub fn error_code(&self) -> i32 {
        match self {
            ToolError::MethodNotFound(_) => -32601,
            ToolError::InvalidParams(_) => -32602,
            ToolError::Internal(_) => -32603,
        }
    }
}

/// Descriptors for every exposed tool, parameters declared as JSON schema.
pub fn tool_descriptors() -> Value {
    json!({
        "tools": [
            {
                "name": "create_order",
                "description": "Create an order via the commerce Admin API",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "line_items": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "variant_id": { "type": "integer" },
                                    "quantity": { "type": "integer", "default": 1 },
                                    "title": { "type": "string" },
                                    "price": { "type": "number" },
                                },
                                "required": ["variant_id"],
                            },
                        },
                        "customer_email": { "type": "string" },
                        "financial_status": {
                            "type": "string",
                            "default": "pending",
                            "enum": [
                                "pending",
                                "authorized",
                                "paid",
                                "partially_paid",
                                "refunded",
                                "voided",
                            ],
                        },
                        "test": { "type": "boolean", "default": true },
                    },
                    "required": ["line_items"],
                },
            },
            {
                "name": "get_order_status",
                "description": "Fetch status and details of an order by numeric id",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "order_id": { "type": "integer" },
                    },
                    "required": ["order_id"],
                },
            },
        ],
    })
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct CreateOrderArgs {
    line_items: Vec<LineItem>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default = "default_financial_status")]
    financial_status: String,
    #[serde(default = "default_test")]
    test: bool,
}

fn default_financial_status() -> String {
    "pending".to_string()
}

fn default_test() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct OrderStatusArgs {
    order_id: i64,
}

/// Handle one JSON-RPC request against the commerce adapter.
pub async fn dispatch(api: &CommerceApi, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    match handle(api, request).await {
        Ok(result) => RpcResponse { jsonrpc: JSONRPC_VERSION, id, result: Some(result), error: None },
        Err(error) => RpcResponse {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(RpcErrorBody { code: error.error_code(), message: error.to_string() }),
        },
    }
}

async fn handle(api: &CommerceApi, request: RpcRequest) -> Result<Value, ToolError> {
    match request.method.as_str() {
        "tools/list" => Ok(tool_descriptors()),
        "tools/call" => {
            let params: ToolCallParams = serde_json::from_value(request.params)
                .map_err(|err| ToolError::InvalidParams(err.to_string()))?;

            let payload = match params.name.as_str() {
                "create_order" => {
                    let args: CreateOrderArgs = serde_json::from_value(params.arguments)
                        .map_err(|err| ToolError::InvalidParams(err.to_string()))?;
                    api.create_order(
                        &args.line_items,
                        args.customer_email.as_deref(),
                        &args.financial_status,
                        args.test,
                    )
                    .await
                }
                "get_order_status" => {
                    let args: OrderStatusArgs = serde_json::from_value(params.arguments)
                        .map_err(|err| ToolError::InvalidParams(err.to_string()))?;
                    api.get_order_status(args.order_id).await
                }
                other => return Err(ToolError::InvalidParams(format!("unknown tool `{other}`"))),
            };

            let text = serde_json::to_string_pretty(&payload)
                .map_err(|err| ToolError::Internal(err.to_string()))?;
            Ok(json!({ "content": [ { "type": "text", "text": text } ] }))
        }
        other => Err(ToolError::MethodNotFound(other.to_string())),
    }
}
