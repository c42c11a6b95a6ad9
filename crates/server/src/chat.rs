//! Chat endpoint: one POST runs the workflow once.
//!
//! Handler-level failures arrive as JSON error objects inside
//! `chat_message`, on the same channel as success payloads; the HTTP layer
//! only returns non-200 when the request itself holds no user message.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shopfront_agent::Workflow;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
}

/// One role-tagged chat message. Clients tag the author as either `source`
/// or `role`; both are accepted.
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl IncomingMessage {
    fn author(&self) -> Option<&str> {
        self.source.as_deref().or(self.role.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub chat_message: String,
    pub intent: Option<&'static str>,
    pub intent_details: Value,
    pub inner_messages: Vec<Value>,
    pub user_intent: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/agent-assistant", post(agent_assistant)).with_state(state)
}

pub async fn agent_assistant(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<AgentResponse>, (StatusCode, Json<ErrorDetail>)> {
    if request.messages.is_empty() {
        return Err(bad_request("No messages provided"));
    }

    let Some(user_message) = request
        .messages
        .iter()
        .rev()
        .find(|message| message.author() == Some("user"))
        .map(|message| message.content.clone())
    else {
        return Err(bad_request("No user message found"));
    };

    let run = state.workflow.run(&user_message).await;
    info!(
        correlation_id = %run.correlation_id,
        intent = ?run.intent.map(|intent| intent.as_str()),
        "workflow run completed"
    );

    let intent = run.intent.map(|intent| intent.as_str());
    let inner = serde_json::to_value(&run).unwrap_or(Value::Null);

    Ok(Json(AgentResponse {
        chat_message: run.final_response.clone(),
        intent,
        intent_details: run.intent_details.clone(),
        inner_messages: vec![inner],
        user_intent: intent,
    }))
}

fn bad_request(detail: &str) -> (StatusCode, Json<ErrorDetail>) {
    (StatusCode::BAD_REQUEST, Json(ErrorDetail { detail: detail.to_string() }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use shopfront_agent::build_workflow;
    use shopfront_core::config::AppConfig;
    use tower::ServiceExt;

    use super::{router, AppState};

    /// With no LLM key configured the gateway degrades to the keyword
    /// fallback, so the whole stack runs offline.
    fn app() -> axum::Router {
        let workflow = build_workflow(&AppConfig::default()).expect("workflow builds");
        router(AppState { workflow: Arc::new(workflow) })
    }

    async fn post_chat(body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/agent-assistant")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds");

        let response = app().oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let value = serde_json::from_slice(&bytes).expect("body is JSON");
        (status, value)
    }

    #[tokio::test]
    async fn empty_message_list_is_a_bad_request() {
        let (status, body) = post_chat(json!({ "messages": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], json!("No messages provided"));
    }

    #[tokio::test]
    async fn assistant_only_history_is_a_bad_request() {
        let (status, body) = post_chat(json!({
            "messages": [ { "source": "assistant", "content": "hello!" } ],
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], json!("No user message found"));
    }

    #[tokio::test]
    async fn last_user_message_drives_the_workflow() {
        let (status, body) = post_chat(json!({
            "messages": [
                { "source": "user", "content": "What is your return policy?" },
                { "source": "assistant", "content": "Happy to help!" },
                { "source": "user", "content": "Show me floral shirts" },
            ],
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intent"], json!("product_search"));
        assert_eq!(body["user_intent"], json!("product_search"));

        let chat: Value = serde_json::from_str(body["chat_message"].as_str().expect("string"))
            .expect("chat message is JSON");
        assert_eq!(chat["products"].as_array().map(Vec::len), Some(2));
        assert_eq!(chat["user_intent"], json!("product_search"));

        assert_eq!(body["inner_messages"][0]["products"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn role_tag_is_accepted_in_place_of_source() {
        let (status, body) = post_chat(json!({
            "messages": [ { "role": "user", "content": "any offers right now?" } ],
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intent"], json!("info_search"));
        let chat: Value = serde_json::from_str(body["chat_message"].as_str().expect("string"))
            .expect("chat message is JSON");
        assert_eq!(chat["info"]["topic"], json!("current_offers"));
    }
}
