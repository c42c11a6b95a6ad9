use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use shopfront_commerce::CommerceApi;

use crate::{dispatch, RpcRequest, RpcResponse};

#[derive(Clone)]
pub struct ToolsState {
    api: Arc<CommerceApi>,
}

pub fn router(api: Arc<CommerceApi>) -> Router {
    Router::new().route("/", post(rpc)).with_state(ToolsState { api })
}

async fn rpc(
    State(state): State<ToolsState>,
    Json(request): Json<RpcRequest>,
) -> Json<RpcResponse> {
    Json(dispatch(state.api.as_ref(), request).await)
}
