use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    utils::{
        error_to_api_response, error_to_api_response_with, is_version_valid, return_codes,
        success_to_api_response,
    },
};

#[derive(Debug, Deserialize)]
pub struct VersionCheckRequest {
    pub app_version: Option<String>,
}

/// Liveness plus a live database round-trip.
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> Response {
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            axum::Json(json!({
                "status": "healthy",
                "service": "nook-backend",
                "database": "connected",
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check database error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({
                    "status": "unhealthy",
                    "service": "nook-backend",
                    "database": "disconnected",
                    "timestamp": Utc::now().to_rfc3339(),
                })),
            )
                .into_response()
        }
    }
}

/// Startup version probe. Unlike the middleware gate this always answers
/// 200 for an outdated build, so the app can render its own update prompt.
#[axum::debug_handler]
pub async fn version_check(
    State(state): State<AppState>,
    Json(req): Json<VersionCheckRequest>,
) -> Response {
    let Some(current) = req.app_version else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::MISSING_APP_VERSION, "App version is required"),
        )
            .into_response();
    };

    let required = &state.config.required_app_version;

    if !is_version_valid(&current, required) {
        return (
            StatusCode::OK,
            error_to_api_response_with(
                return_codes::APP_UPDATE_REQUIRED,
                "Please update your app to continue using this service",
                json!({ "required_version": required, "current_version": current }),
            ),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        success_to_api_response(
            "App version is up to date",
            json!({ "current_version": current, "required_version": required }),
        ),
    )
        .into_response()
}
