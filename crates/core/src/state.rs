use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// The closed set of things a shopper can ask for. Exactly one tag is
/// assigned per workflow run; every fallback path still lands on one of
/// these four.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ProductSearch,
    OrderCreation,
    OrderStatus,
    InfoSearch,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unrecognized intent tag `{0}`")]
pub struct UnknownIntent(String);

impl Intent {
    pub const ALL: [Intent; 4] =
        [Intent::ProductSearch, Intent::OrderCreation, Intent::OrderStatus, Intent::InfoSearch];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::ProductSearch => "product_search",
            Intent::OrderCreation => "order_creation",
            Intent::OrderStatus => "order_status",
            Intent::InfoSearch => "info_search",
        }
    }
}

impl std::str::FromStr for Intent {
    type Err = UnknownIntent;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "product_search" => Ok(Intent::ProductSearch),
            "order_creation" => Ok(Intent::OrderCreation),
            "order_status" => Ok(Intent::OrderStatus),
            "info_search" => Ok(Intent::InfoSearch),
            other => Err(UnknownIntent(other.to_string())),
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result payload produced by exactly one handler per run. One variant per
/// intent, so unrelated payload slots cannot coexist.
#[derive(Clone, Debug, PartialEq)]
pub enum HandlerOutcome {
    Products(Value),
    Order(Value),
    OrderStatus(Value),
    Info(Value),
}

impl HandlerOutcome {
    pub fn intent(&self) -> Intent {
        match self {
            HandlerOutcome::Products(_) => Intent::ProductSearch,
            HandlerOutcome::Order(_) => Intent::OrderCreation,
            HandlerOutcome::OrderStatus(_) => Intent::OrderStatus,
            HandlerOutcome::Info(_) => Intent::InfoSearch,
        }
    }

    /// Key under which the payload appears when the run state is serialized.
    pub fn state_key(&self) -> &'static str {
        match self {
            HandlerOutcome::Products(_) => "products",
            HandlerOutcome::Order(_) => "order_result",
            HandlerOutcome::OrderStatus(_) => "order_status",
            HandlerOutcome::Info(_) => "info_result",
        }
    }

    pub fn payload(&self) -> &Value {
        match self {
            HandlerOutcome::Products(payload)
            | HandlerOutcome::Order(payload)
            | HandlerOutcome::OrderStatus(payload)
            | HandlerOutcome::Info(payload) => payload,
        }
    }
}

/// State accumulated across a single workflow run. Created empty per
/// incoming message, written once by the classifier and once by exactly one
/// handler, discarded after the response goes out.
#[derive(Clone, Debug)]
pub struct ConversationState {
    pub user_message: String,
    pub correlation_id: String,
    pub intent: Option<Intent>,
    pub intent_details: Value,
    pub outcome: Option<HandlerOutcome>,
    pub final_response: String,
}

impl ConversationState {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            correlation_id: Uuid::new_v4().to_string(),
            intent: None,
            intent_details: Value::Object(serde_json::Map::new()),
            outcome: None,
            final_response: String::new(),
        }
    }
}

impl Serialize for ConversationState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("user_message", &self.user_message)?;
        map.serialize_entry("correlation_id", &self.correlation_id)?;
        map.serialize_entry("intent", &self.intent.map(|intent| intent.as_str()))?;
        map.serialize_entry("intent_details", &self.intent_details)?;
        if let Some(outcome) = &self.outcome {
            map.serialize_entry(outcome.state_key(), outcome.payload())?;
        }
        map.serialize_entry("final_response", &self.final_response)?;
        map.end()
    }
}
