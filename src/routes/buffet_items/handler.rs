use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState,
    utils::{error_to_api_response, return_codes, success_to_api_response},
};

use super::model::{BuffetItem, BuffetItemsRequest, VALID_BUFFET_TYPES};

#[axum::debug_handler]
pub async fn buffet_items(
    State(state): State<AppState>,
    Json(req): Json<BuffetItemsRequest>,
) -> Response {
    let Some(action) = req.action.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::MISSING_ACTION, "Action parameter is required"),
        )
            .into_response();
    };

    if action != "get_by_buffet_type" {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::INVALID_ACTION,
                "Invalid action. Supported actions: get_by_buffet_type",
            ),
        )
            .into_response();
    }

    let Some(buffet_type) = req.buffet_type.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::MISSING_BUFFET_TYPE,
                "Buffet type is required for get_by_buffet_type action",
            ),
        )
            .into_response();
    };

    if !VALID_BUFFET_TYPES.contains(&buffet_type) {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::INVALID_BUFFET_TYPE,
                "Invalid buffet type. Valid types: Classic, Enhanced, Deluxe",
            ),
        )
            .into_response();
    }

    match BuffetItem::get_by_buffet_type(&state.pool, buffet_type).await {
        Ok(items) => (
            StatusCode::OK,
            success_to_api_response(
                "Buffet items retrieved successfully",
                json!({ "items": items }),
            ),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error in buffet items route: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    return_codes::SERVER_ERROR,
                    "Failed to process buffet items request",
                ),
            )
                .into_response()
        }
    }
}
