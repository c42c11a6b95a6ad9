//! Commerce Admin-API adapter.
//!
//! Thin authenticated REST client for the store's versioned admin API,
//! exposing the two order operations the assistant needs. Every public call
//! returns a JSON envelope, success or failure alike - errors are folded
//! into `{success: false, error, message}` shapes rather than surfaced as
//! `Err`, because downstream formatting treats both the same way. A
//! configuration toggle swaps failures for deterministic mock envelopes so
//! demo environments work without live credentials.

use chrono::{Duration, Utc};
use reqwest::{Client, Method, StatusCode};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shopfront_core::config::CommerceConfig;
use thiserror::Error;
use tracing::{debug, warn};

pub const DUMMY_ORDER_ID: i64 = 9_999_999_999;
pub const DUMMY_ORDER_NUMBER: i64 = 1001;

/// One order line as accepted by the admin API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub variant_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Error)]
enum RequestError {
    #[error("access token is not configured")]
    MissingToken,
    #[error("commerce API returned status {status}")]
    Status { status: StatusCode, body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

pub struct CommerceApi {
    http: Client,
    api_base_url: String,
    access_token: Option<SecretString>,
    dummy_responses: bool,
}

impl CommerceApi {
    pub fn new(config: &CommerceConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        let access_token = config
            .access_token
            .clone()
            .filter(|token| !token.expose_secret().trim().is_empty());

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token,
            dummy_responses: config.dummy_responses,
        })
    }

    /// Submit an order with the given line items. Returns the success
    /// envelope, a dummy envelope (dummy mode), or a failure envelope.
    pub async fn create_order(
        &self,
        line_items: &[LineItem],
        customer_email: Option<&str>,
        financial_status: &str,
        test: bool,
    ) -> Value {
        let mut order = json!({
            "line_items": line_items,
            "financial_status": financial_status,
            "test": test,
        });
        if let Some(email) = customer_email {
            order["customer"] = json!({ "email": email });
        }
        let payload = json!({ "order": order });

        match self.request(Method::POST, "/orders.json", Some(&payload)).await {
            Ok(body) => {
                let order = &body["order"];
                debug!(order_id = ?order["id"], "order created");
                json!({
                    "success": true,
                    "order_id": order["id"],
                    "order_number": order["order_number"],
                    "financial_status": order["financial_status"],
                    "total_price": order["total_price"],
                    "currency": order["currency"],
                    "created_at": order["created_at"],
                    "test_order": order["test"],
                    "line_items_count": order["line_items"].as_array().map(Vec::len).unwrap_or(0),
                    "customer_email": order["customer"]["email"],
                })
            }
            Err(error) => {
                if self.dummy_responses {
                    warn!(error = %error, "order creation failed, serving dummy envelope");
                    return dummy_order_created(
                        line_items,
                        customer_email,
                        financial_status,
                        test,
                        dummy_note(&error),
                    );
                }
                failure_envelope(error, None)
            }
        }
    }

    /// Fetch the status and details of an order by its numeric id.
    pub async fn get_order_status(&self, order_id: i64) -> Value {
        let path = format!("/orders/{order_id}.json");

        match self.request(Method::GET, &path, None).await {
            Ok(body) => {
                let order = &body["order"];
                let line_items: Vec<Value> = order["line_items"]
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(|item| {
                        json!({
                            "title": item["title"],
                            "quantity": item["quantity"],
                            "price": item["price"],
                            "variant_id": item["variant_id"],
                            "fulfillment_status": item["fulfillment_status"],
                        })
                    })
                    .collect();
                let fulfillments: Vec<Value> = order["fulfillments"]
                    .as_array()
                    .into_iter()
                    .flatten()
                    .map(|fulfillment| {
                        json!({
                            "status": fulfillment["status"],
                            "tracking_company": fulfillment["tracking_company"],
                            "tracking_number": fulfillment["tracking_number"],
                            "created_at": fulfillment["created_at"],
                        })
                    })
                    .collect();

                json!({
                    "success": true,
                    "order_id": order["id"],
                    "order_number": order["order_number"],
                    "financial_status": order["financial_status"],
                    "fulfillment_status": order["fulfillment_status"],
                    "total_price": order["total_price"],
                    "currency": order["currency"],
                    "created_at": order["created_at"],
                    "updated_at": order["updated_at"],
                    "cancelled_at": order["cancelled_at"],
                    "test_order": order["test"],
                    "customer": {
                        "email": order["customer"]["email"],
                        "first_name": order["customer"]["first_name"],
                        "last_name": order["customer"]["last_name"],
                    },
                    "line_items": line_items,
                    "fulfillments": fulfillments,
                    "tags": order["tags"],
                    "note": order["note"],
                })
            }
            Err(error) => {
                if self.dummy_responses {
                    warn!(error = %error, order_id, "status lookup failed, serving dummy envelope");
                    return dummy_order_status(order_id, dummy_note(&error));
                }
                failure_envelope(error, Some(order_id))
            }
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, RequestError> {
        let token = self.access_token.as_ref().ok_or(RequestError::MissingToken)?;
        let url = format!("{}{path}", self.api_base_url);

        let mut request = self
            .http
            .request(method, &url)
            .header("Content-Type", "application/json")
            .header("X-Shopify-Access-Token", token.expose_secret());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

fn failure_envelope(error: RequestError, order_id: Option<i64>) -> Value {
    match error {
        RequestError::MissingToken => json!({
            "success": false,
            "error": "Configuration Error",
            "message": error.to_string(),
        }),
        RequestError::Status { status, body } => {
            let mut envelope = json!({
                "success": false,
                "error": "Commerce API Error",
                "status_code": status.as_u16(),
                "message": format!("commerce API returned status {status}"),
                "response_body": body,
            });
            if status == StatusCode::NOT_FOUND {
                if let Some(id) = order_id {
                    envelope["helpful_message"] = json!(format!(
                        "Order ID {id} not found. Please verify the order ID is correct."
                    ));
                }
            }
            envelope
        }
        RequestError::Transport(source) => json!({
            "success": false,
            "error": "Unexpected Error",
            "message": source.to_string(),
        }),
    }
}

fn dummy_note(error: &RequestError) -> &'static str {
    match error {
        RequestError::Status { .. } => {
            "This is a dummy response for testing purposes (API returned error)"
        }
        _ => "This is a dummy response for testing purposes",
    }
}

fn dummy_order_created(
    line_items: &[LineItem],
    customer_email: Option<&str>,
    financial_status: &str,
    test: bool,
    note: &str,
) -> Value {
    let total: Decimal = line_items
        .iter()
        .map(|item| item.price.unwrap_or_default() * Decimal::from(item.quantity))
        .sum();

    json!({
        "success": true,
        "dummy_mode": true,
        "order_id": DUMMY_ORDER_ID,
        "order_number": DUMMY_ORDER_NUMBER,
        "financial_status": financial_status,
        "total_price": format!("{total:.2}"),
        "currency": "USD",
        "created_at": Utc::now().to_rfc3339(),
        "test_order": test,
        "line_items_count": line_items.len(),
        "customer_email": customer_email,
        "note": note,
    })
}

fn dummy_order_status(order_id: i64, note: &str) -> Value {
    json!({
        "success": true,
        "dummy_mode": true,
        "order_id": order_id,
        "order_number": DUMMY_ORDER_NUMBER,
        "financial_status": "paid",
        "fulfillment_status": "fulfilled",
        "total_price": "150.00",
        "currency": "USD",
        "created_at": (Utc::now() - Duration::days(2)).to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339(),
        "cancelled_at": Value::Null,
        "test_order": true,
        "customer": {
            "email": "customer@example.com",
            "first_name": "Test",
            "last_name": "Customer",
        },
        "line_items": [
            {
                "title": "Sample Product",
                "quantity": 2,
                "price": "75.00",
                "variant_id": 12345,
                "fulfillment_status": "fulfilled",
            }
        ],
        "fulfillments": [
            {
                "status": "success",
                "tracking_company": "USPS",
                "tracking_number": "9400111111111111111111",
                "created_at": (Utc::now() - Duration::days(1)).to_rfc3339(),
            }
        ],
        "tags": "test, dummy",
        "note": note,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;
    use shopfront_core::config::{AppConfig, CommerceConfig};

    use super::{CommerceApi, LineItem, DUMMY_ORDER_ID};

    fn config(dummy_responses: bool) -> CommerceConfig {
        let mut commerce = AppConfig::default().commerce;
        commerce.access_token = None;
        commerce.dummy_responses = dummy_responses;
        commerce
    }

    fn sample_line_items() -> Vec<LineItem> {
        vec![LineItem {
            variant_id: 42910880890963,
            quantity: 2,
            title: Some("Cool T-Shirt".to_string()),
            price: Some(Decimal::new(2999, 2)),
        }]
    }

    #[tokio::test]
    async fn missing_token_with_dummy_mode_returns_deterministic_order() {
        let api = CommerceApi::new(&config(true)).expect("client builds");
        let result = api
            .create_order(&sample_line_items(), Some("customer@example.com"), "paid", true)
            .await;

        assert_eq!(result["success"], json!(true));
        assert_eq!(result["dummy_mode"], json!(true));
        assert_eq!(result["order_id"], json!(DUMMY_ORDER_ID));
        assert_eq!(result["order_number"], json!(1001));
        assert_eq!(result["total_price"], json!("59.98"));
        assert_eq!(result["customer_email"], json!("customer@example.com"));
    }

    #[tokio::test]
    async fn missing_token_without_dummy_mode_is_a_configuration_error() {
        let api = CommerceApi::new(&config(false)).expect("client builds");
        let result = api.create_order(&sample_line_items(), None, "pending", true).await;

        assert_eq!(result["success"], json!(false));
        assert_eq!(result["error"], json!("Configuration Error"));
        assert!(result.get("dummy_mode").is_none());
    }

    #[tokio::test]
    async fn status_lookup_in_dummy_mode_echoes_the_order_id() {
        let api = CommerceApi::new(&config(true)).expect("client builds");
        let result = api.get_order_status(5904242344019).await;

        assert_eq!(result["success"], json!(true));
        assert_eq!(result["dummy_mode"], json!(true));
        assert_eq!(result["order_id"], json!(5904242344019i64));
        assert_eq!(result["fulfillment_status"], json!("fulfilled"));
    }

    #[tokio::test]
    async fn status_lookup_without_dummy_mode_is_a_configuration_error() {
        let api = CommerceApi::new(&config(false)).expect("client builds");
        let result = api.get_order_status(42).await;

        assert_eq!(result["success"], json!(false));
        assert_eq!(result["error"], json!("Configuration Error"));
    }

    #[test]
    fn line_item_quantity_defaults_to_one() {
        let item: LineItem =
            serde_json::from_value(json!({ "variant_id": 42 })).expect("deserializes");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.title, None);
    }
}
