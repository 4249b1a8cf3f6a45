use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::handlers::AnalyzerGateway;
use crate::models::{AnalysisStatus, ErrorResponse, ExecuteResponse, HealthStatus, RawPayload};

pub struct AppState {
    pub gateway: Arc<AnalyzerGateway>,
}

pub fn create_router(gateway: Arc<AnalyzerGateway>) -> Router {
    let state = Arc::new(AppState { gateway });

    let api = Router::new()
        .route("/execute", post(execute_handler))
        .layer(cors_layer());

    Router::new()
        .route("/", get(root_handler))
        .route("/check", get(check_handler))
        .nest("/api", api)
        .with_state(state)
}

/// Any origin may call `/api/*`, credentials included. Origin, methods and
/// headers are echoed since wildcards are not allowed alongside credentials.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn status_code(status: AnalysisStatus) -> StatusCode {
    match status {
        AnalysisStatus::Success => StatusCode::OK,
        AnalysisStatus::ClientError => StatusCode::BAD_REQUEST,
        AnalysisStatus::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisStatus::UpstreamBlocked | AnalysisStatus::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn execute_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let raw = match &body {
        Ok(bytes) => Some(&bytes[..]),
        Err(rejection) => {
            log::warn!("⚠️ Could not read request body: {}", rejection.body_text());
            None
        }
    };

    let payload = RawPayload {
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        body: raw,
    };

    let result = state.gateway.analyze(payload).await;
    let status = result.status;

    if status == AnalysisStatus::Success {
        (
            StatusCode::OK,
            Json(ExecuteResponse {
                success: true,
                result: result.into_body(),
            }),
        )
            .into_response()
    } else {
        (
            status_code(status),
            Json(ErrorResponse {
                error: result.into_body(),
            }),
        )
            .into_response()
    }
}

async fn check_handler(State(state): State<Arc<AppState>>) -> Response {
    let health = state.gateway.health_check();
    let code = match health.status {
        HealthStatus::Ok => StatusCode::OK,
        HealthStatus::Error => StatusCode::SERVICE_UNAVAILABLE,
    };

    (code, Json(health)).into_response()
}

async fn root_handler() -> &'static str {
    "Food Analyzer Gateway - POST /api/execute with {\"query\": \"<food>\"}, GET /check for health"
}
