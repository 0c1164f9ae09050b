use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    clients::health::HealthChecker,
    models::{health::HealthStatus, response::ApiResponse, result::HistoryRecord},
    service::NotificationService,
};

const MAX_HISTORY_LIMIT: usize = 500;

pub struct AppState {
    service: Arc<NotificationService>,
    health_checker: HealthChecker,
}

impl AppState {
    pub fn new(service: Arc<NotificationService>, health_checker: HealthChecker) -> Self {
        Self {
            service,
            health_checker,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<usize>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(queue_stats))
        .route("/history", get(history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(state: Arc<AppState>, port: u16) -> Result<(), Error> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Observability server started");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all();

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn queue_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.service.queue_stats();
    Json(ApiResponse::success(stats, "Queue statistics".to_string()))
}

async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<HistoryRecord>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let limit = query.limit.unwrap_or(50);

    if limit == 0 || limit > MAX_HISTORY_LIMIT {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                format!("limit must be between 1 and {}", MAX_HISTORY_LIMIT),
                "Invalid history query".to_string(),
            )),
        ));
    }

    let records = state.service.recent_history(limit);
    Ok(Json(ApiResponse::success(
        records,
        "Recent deliveries".to_string(),
    )))
}
