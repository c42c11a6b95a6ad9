//! Workflow graph: classify, route, run exactly one handler, terminate.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use shopfront_commerce::CommerceApi;
use shopfront_core::config::AppConfig;
use shopfront_core::state::{ConversationState, HandlerOutcome};
use shopfront_rag::VectorIndexClient;
use tracing::info;

use crate::classifier::classify;
use crate::handlers::info_search::RagAccess;
use crate::handlers::{info_search, order_creation, order_status, product_search};
use crate::llm::{GeminiClient, LlmClient};
use crate::router::route;
use crate::tools::{JsonRpcToolClient, LocalTools, ToolInvoker};

/// One compiled workflow. Holds the shared collaborators and no run state;
/// each `run` call builds a fresh `ConversationState` and never touches
/// another run's.
pub struct Workflow {
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolInvoker>,
    catalog: Option<JsonRpcToolClient>,
    rag: RagAccess,
    rag_top_k: usize,
    catalog_bypass: bool,
}

impl Workflow {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<dyn ToolInvoker>,
        catalog: Option<JsonRpcToolClient>,
        rag: RagAccess,
        rag_top_k: usize,
        catalog_bypass: bool,
    ) -> Self {
        Self { llm, tools, catalog, rag, rag_top_k, catalog_bypass }
    }

    /// Execute the graph once for one incoming message.
    pub async fn run(&self, user_message: &str) -> ConversationState {
        let mut state = ConversationState::new(user_message);

        let classification = classify(self.llm.as_ref(), user_message).await;
        info!(
            correlation_id = %state.correlation_id,
            intent = %classification.intent,
            "intent classified"
        );
        state.intent = Some(classification.intent);
        state.intent_details = classification.details;

        let outcome = match route(classification.intent) {
            "order_creation" => HandlerOutcome::Order(
                order_creation::run(self.llm.as_ref(), self.tools.as_ref(), user_message).await,
            ),
            "order_status" => HandlerOutcome::OrderStatus(
                order_status::run(self.llm.as_ref(), self.tools.as_ref(), user_message).await,
            ),
            "info_search" => HandlerOutcome::Info(
                info_search::run(self.llm.as_ref(), &self.rag, self.rag_top_k, user_message).await,
            ),
            _ => HandlerOutcome::Products(
                product_search::run(
                    self.llm.as_ref(),
                    self.catalog.as_ref(),
                    self.catalog_bypass,
                    user_message,
                )
                .await,
            ),
        };

        state.final_response =
            serde_json::to_string_pretty(outcome.payload()).unwrap_or_default();
        state.outcome = Some(outcome);
        inject_user_intent(&mut state);

        state
    }
}

/// Stamp the classified intent into the final response when it parses as a
/// JSON object and does not already carry one. Non-JSON responses are left
/// untouched.
fn inject_user_intent(state: &mut ConversationState) {
    let Some(intent) = state.intent else {
        return;
    };
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(&state.final_response)
    else {
        return;
    };

    object
        .entry("user_intent")
        .or_insert_with(|| Value::String(intent.as_str().to_string()));

    if let Ok(serialized) = serde_json::to_string(&Value::Object(object)) {
        state.final_response = serialized;
    }
}

/// Wire a workflow from validated configuration: Gemini gateway, local or
/// remote tool invocation, optional catalog endpoint, and retrieval access
/// (degraded with the missing-credential reason when incomplete).
pub fn build_workflow(config: &AppConfig) -> Result<Workflow> {
    let llm: Arc<dyn LlmClient> = Arc::new(GeminiClient::new(&config.llm));

    let tools: Arc<dyn ToolInvoker> = if config.commerce.local_tools {
        let api = CommerceApi::new(&config.commerce).context("commerce client failed to build")?;
        Arc::new(LocalTools::new(Arc::new(api)))
    } else {
        let endpoint = config
            .commerce
            .tools_url
            .clone()
            .context("commerce.tools_url is required for remote tool calls")?;
        Arc::new(JsonRpcToolClient::new(endpoint))
    };

    let catalog = config.commerce.catalog_url.clone().map(JsonRpcToolClient::new);

    let rag = match (&config.rag.api_key, &config.rag.index_host, &config.rag.index_name) {
        (Some(api_key), Some(index_host), Some(index_name)) if config.llm_key_present() => {
            RagAccess::Ready(Arc::new(VectorIndexClient::new(
                api_key.clone(),
                index_host.clone(),
                index_name.clone(),
            )))
        }
        _ => RagAccess::Unavailable(rag_unavailable_reason(config)),
    };

    Ok(Workflow::new(
        llm,
        tools,
        catalog,
        rag,
        config.rag.top_k,
        config.commerce.catalog_bypass,
    ))
}

fn rag_unavailable_reason(config: &AppConfig) -> String {
    if !config.llm_key_present() {
        "LLM API key not found (SHOPFRONT_LLM_API_KEY)".to_string()
    } else if config.rag.api_key.is_none() {
        "vector-store API key not found (SHOPFRONT_RAG_API_KEY)".to_string()
    } else if config.rag.index_host.is_none() {
        "vector index host not found (SHOPFRONT_RAG_INDEX_HOST)".to_string()
    } else {
        "vector index name not found (SHOPFRONT_RAG_INDEX_NAME)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use shopfront_core::config::AppConfig;

    use super::{build_workflow, rag_unavailable_reason};
    use crate::handlers::info_search::RagAccess;

    #[test]
    fn default_config_builds_a_workflow_with_degraded_rag() {
        let workflow = build_workflow(&AppConfig::default()).expect("workflow builds");
        assert!(matches!(workflow.rag, RagAccess::Unavailable(_)));
        assert!(workflow.catalog.is_none());
        assert!(workflow.catalog_bypass);
    }

    #[test]
    fn unavailable_reason_names_the_first_missing_credential() {
        let mut config = AppConfig::default();
        assert!(rag_unavailable_reason(&config).contains("SHOPFRONT_LLM_API_KEY"));

        config.llm.api_key = Some("llm-key".to_string().into());
        assert!(rag_unavailable_reason(&config).contains("SHOPFRONT_RAG_API_KEY"));

        config.rag.api_key = Some("vector-key".to_string().into());
        assert!(rag_unavailable_reason(&config).contains("SHOPFRONT_RAG_INDEX_HOST"));

        config.rag.index_host = Some("https://index.example.net".to_string());
        assert!(rag_unavailable_reason(&config).contains("SHOPFRONT_RAG_INDEX_NAME"));
    }

    #[test]
    fn local_tools_mode_builds_without_a_tools_url() {
        let mut config = AppConfig::default();
        config.commerce.local_tools = true;
        config.commerce.tools_url = None;
        assert!(build_workflow(&config).is_ok());
    }
}
