use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rpc::{Dispatcher, JsonRpcRequest, JsonRpcResponse};

/// Application state shared across handlers. Thin by design: HTTP routing
/// and transport concerns live here, everything else in `Dispatcher`.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/rpc", post(handle_rpc))
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn handle_rpc(State(state): State<AppState>, Json(req): Json<JsonRpcRequest>) -> Json<JsonRpcResponse> {
    let id = req.id.clone();
    match state.dispatcher.dispatch(&req.method, req.params).await {
        Ok(result) => {
            let value = serde_json::to_value(result).unwrap_or(Value::Null);
            Json(JsonRpcResponse::success(id, value))
        }
        Err(err) => {
            tracing::warn!(method = %req.method, error = %err, "action dispatch failed");
            Json(JsonRpcResponse::failure(id, &err))
        }
    }
}
