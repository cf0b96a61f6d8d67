use crate::config::Config;
use crate::service::{AgentService, QueryRequest};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

#[derive(Clone)]
pub struct AppState {
    service: Arc<AgentService>,
}

/// Thin HTTP surface over the pipeline: one query endpoint, one health
/// endpoint. All real behavior lives below the service boundary.
pub fn router(service: Arc<AgentService>, config: &Config) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/query", post(handle_query))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(RequestBodyLimitLayer::new(config.body_limit))
        .layer(CorsLayer::permissive())
        .with_state(AppState { service })
}

/// GET /health: liveness plus the registered tool set.
async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let tools: Vec<String> = state
        .service
        .executor()
        .registry()
        .tool_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(serde_json::json!({
        "status": "ok",
        "tools": tools,
    }))
}

/// POST /query: run the full plan/execute/synthesize pipeline.
async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> impl IntoResponse {
    if request.query.trim().is_empty() {
        let err = serde_json::json!({"error": "query must not be empty"});
        return (StatusCode::BAD_REQUEST, Json(err)).into_response();
    }

    match state.service.handle_query(&request.query).await {
        Ok(response) => Json(response).into_response(),
        // The rule-based planner never emits malformed plans, but a
        // structural error is still a server bug worth a clean 500.
        Err(err) => {
            tracing::error!(error = %err, "planner produced an unexecutable plan");
            let body = serde_json::json!({"error": err.to_string()});
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: &Config, service: Arc<AgentService>) -> anyhow::Result<()> {
    let app = router(service, config);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to install ctrl-c handler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::default_registry;

    #[test]
    fn router_builds_with_default_registry() {
        let service = Arc::new(AgentService::new(Arc::new(default_registry())));
        let _router = router(service, &Config::default());
    }
}
