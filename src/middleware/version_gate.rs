use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState,
    utils::{error_to_api_response, error_to_api_response_with, is_version_valid, return_codes},
};

/// Gate for mobile-only surfaces: rejects requests from app builds older
/// than the configured minimum version.
pub async fn version_gate(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let current = request
        .headers()
        .get("app-version")
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let Some(current) = current else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::MISSING_APP_VERSION,
                "App version header is required",
            ),
        )
            .into_response();
    };

    if !is_version_valid(&current, &state.config.required_app_version) {
        return (
            StatusCode::UPGRADE_REQUIRED,
            error_to_api_response_with(
                return_codes::APP_UPDATE_REQUIRED,
                "Please update your app to continue using this service",
                json!({
                    "required_version": state.config.required_app_version,
                    "current_version": current,
                }),
            ),
        )
            .into_response();
    }

    next.run(request).await
}
