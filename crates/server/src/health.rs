use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub checked_at: String,
}

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "shopfront-agent-api",
        checked_at: Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use axum::Json;

    use crate::health::health;

    #[tokio::test]
    async fn health_reports_a_static_healthy_payload() {
        let Json(payload) = health().await;
        assert_eq!(payload.status, "healthy");
        assert_eq!(payload.service, "shopfront-agent-api");
    }
}
