pub mod api;

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{ApiError, RelayJson, RootResponse};
use relay_core::{MemoryRetrieveRequest, MemoryStoreRequest, Relay, TriggerResponse, WebhookTriggerRequest};

pub const ROOT_MESSAGE: &str = "Main backend is running";

// Application State
// Just the relay. It owns the HTTP connection pool and is shared read-only.
#[derive(Clone)]
pub struct AppState {
    relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

// The full route table, ready for `axum::serve` (or `oneshot` in tests)
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/zapier-action", post(zapier_action))
        .route("/memory/store", post(memory_store))
        .route("/memory/retrieve", post(memory_retrieve))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- HANDLERS ---

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

async fn health_check() -> &'static str {
    "Relay Gateway: Operational"
}

async fn zapier_action(
    State(state): State<AppState>,
    RelayJson(payload): RelayJson<WebhookTriggerRequest>,
) -> Result<Json<TriggerResponse>, ApiError> {
    info!("Entity '{}' triggered task '{}'", payload.entity_id, payload.task_type);
    let response = state.relay.trigger_webhook(&payload).await?;
    Ok(Json(response))
}

async fn memory_store(
    State(state): State<AppState>,
    RelayJson(payload): RelayJson<MemoryStoreRequest>,
) -> Result<Json<Value>, ApiError> {
    let body = state.relay.store_memory(&payload).await?;
    Ok(Json(body))
}

async fn memory_retrieve(
    State(state): State<AppState>,
    RelayJson(payload): RelayJson<MemoryRetrieveRequest>,
) -> Result<Json<Value>, ApiError> {
    info!("Entity '{}' recalling top {:?}", payload.entity_id, payload.top_k);
    let body = state.relay.retrieve_memory(&payload).await?;
    Ok(Json(body))
}
