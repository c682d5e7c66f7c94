use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use waypoint_core::{GenerateError, PlanService};
use waypoint_db::models::Profile;

/// Header carrying the authenticated user's identifier.
pub const USER_HEADER: &str = "x-waypoint-user";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl From<GenerateError> for AppError {
    fn from(err: GenerateError) -> Self {
        let status = match &err {
            GenerateError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GenerateError::IncompleteProfile(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GenerateError::StoreWriteFailed(_) | GenerateError::StoreReadFailed(_) => {
                tracing::error!(error = %err, "store failure while serving request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(service: Arc<PlanService>) -> Router {
    Router::new()
        .route("/api/plans", get(list_plans).post(create_plan))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(service: Arc<PlanService>, bind: &str, port: u16) -> Result<()> {
    let app = build_router(service);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("waypoint serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("waypoint serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn requesting_user(headers: &HeaderMap) -> Option<&str> {
    headers.get(USER_HEADER).and_then(|v| v.to_str().ok())
}

async fn create_plan(
    State(service): State<Arc<PlanService>>,
    headers: HeaderMap,
    body: Result<Json<Profile>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let owner = requesting_user(&headers);
    if owner.is_none_or(|o| o.trim().is_empty()) {
        return Err(GenerateError::Unauthenticated.into());
    }
    let Json(profile) = body?;

    let record = service.generate_plan(profile, owner).await?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

async fn list_plans(
    State(service): State<Arc<PlanService>>,
    headers: HeaderMap,
) -> Result<axum::response::Response, AppError> {
    let records = service.list_plans(requesting_user(&headers)).await?;
    Ok(Json(records).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
