//! HTTP surface.
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | `GET` | `/` | welcome message |
//! | `POST` | `/predict_route` | [`RouteRequest`] → [`RoutePlan`] |
//!
//! Errors are returned as `{"detail": "<reason>"}` with 404 for an unknown
//! start counter and 400 for any other request problem, including a
//! prediction that aborts. 500 is reserved for a model that cannot serve.

use crate::config::RouterConfig;
use crate::error::{ErrorKind, RerouteError};
use crate::oracle::CostOracle;
use crate::pipeline::RoutePipeline;
use crate::planner::RoutePlan;
use crate::telemetry::RouteRequest;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Greeting served at `/`.
pub const WELCOME_MESSAGE: &str = "Welcome to the GNN Routing API";

#[derive(Debug, Serialize)]
struct MessageBody {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Error response: status plus `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<RerouteError> for ApiError {
    fn from(err: RerouteError) -> Self {
        let status = match err.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Client => StatusCode::BAD_REQUEST,
            ErrorKind::Fatal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody {
            detail: self.detail,
        }))
            .into_response()
    }
}

/// Builds the router around a shared pipeline.
pub fn router<O: CostOracle + 'static>(pipeline: Arc<RoutePipeline<O>>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/predict_route", post(predict_route::<O>))
        .with_state(pipeline)
}

async fn root() -> Json<MessageBody> {
    Json(MessageBody {
        message: WELCOME_MESSAGE,
    })
}

async fn predict_route<O: CostOracle + 'static>(
    State(pipeline): State<Arc<RoutePipeline<O>>>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RoutePlan>, ApiError> {
    let Json(request) = payload?;

    // Encoding and inference are CPU-bound
    let plan = tokio::task::spawn_blocking(move || pipeline.predict_route(&request))
        .await
        .map_err(|e| {
            warn!(error = %e, "prediction task failed");
            ApiError::bad_request(format!("prediction failed: {e}"))
        })?;

    match plan {
        Ok(plan) => Ok(Json(plan)),
        Err(err) => {
            warn!(error = %err, "predict_route rejected");
            Err(err.into())
        }
    }
}

/// Binds `config.bind_addr()` and serves until Ctrl+C.
///
/// # Errors
///
/// `Io` if the address cannot be bound or the server fails.
pub async fn serve<O: CostOracle + 'static>(
    config: &RouterConfig,
    pipeline: Arc<RoutePipeline<O>>,
) -> crate::error::Result<()> {
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "listening");

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
