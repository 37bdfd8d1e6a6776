use std::sync::Arc;

use anyhow::Result;
use airdesk_agents::{AirdeskConfig, AirlineAgent};
use airdesk_core::ChatMessage;
use airdesk_observability::{AppMetrics, MetricsSnapshot};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

const MESSAGES_REQUIRED: &str = "Messages array is required";

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<AirlineAgent>,
    pub metrics: Arc<AppMetrics>,
}

impl ApiState {
    pub fn new(agent: Arc<AirlineAgent>) -> Self {
        let metrics = agent.metrics();
        Self { agent, metrics }
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: MetricsSnapshot,
    capabilities: HealthCapabilities,
}

#[derive(Debug, Serialize)]
struct HealthCapabilities {
    flight_search: bool,
    knowledge_preloaded: bool,
}

/// Builds the live agent and starts knowledge preloading.
pub async fn build_app(config: &AirdeskConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let agent = Arc::new(AirlineAgent::from_config(config, metrics)?);
    agent.clone().spawn_preload_task(config.preload_retry_interval);

    Ok(build_router(ApiState::new(agent)))
}

/// Routes are served both at the root and under `/api`.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .merge(routes())
        .nest("/api", routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .with_state(state)
}

fn routes() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/scrape", get(scrape))
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        capabilities: HealthCapabilities {
            flight_search: state.agent.flight_search_enabled(),
            knowledge_preloaded: state.agent.knowledge_preloaded(),
        },
    };
    (StatusCode::OK, Json(payload))
}

async fn chat(
    State(state): State<ApiState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let messages = match payload {
        Ok(Json(ChatRequest {
            messages: Some(messages),
        })) => messages,
        Ok(_) | Err(JsonRejection::JsonDataError(_)) => {
            return error_response(StatusCode::BAD_REQUEST, MESSAGES_REQUIRED);
        }
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };

    match state.agent.handle_chat(&messages).await {
        Ok(reply) => (
            StatusCode::OK,
            Json(ChatResponse {
                response: reply.response,
            }),
        )
            .into_response(),
        Err(err) => {
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                warn!(error = %err, "chat request failed");
            }
            error_response(status, &err.user_message())
        }
    }
}

async fn scrape(State(state): State<ApiState>) -> impl IntoResponse {
    let knowledge = state.agent.prime_knowledge().await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "data": knowledge,
        })),
    )
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
