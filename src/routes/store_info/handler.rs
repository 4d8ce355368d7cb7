use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState,
    utils::{error_to_api_response, return_codes, success_to_api_response},
};

use super::model::StoreInfo;

#[axum::debug_handler]
pub async fn get_all_store_info(State(state): State<AppState>) -> Response {
    match StoreInfo::get_all(&state.pool).await {
        Ok(entries) => {
            let store_info: BTreeMap<String, String> = entries
                .into_iter()
                .map(|entry| (entry.info_key, entry.info_value))
                .collect();
            (
                StatusCode::OK,
                success_to_api_response(
                    "Store information retrieved successfully",
                    json!({ "store_info": store_info }),
                ),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Error fetching store info: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    return_codes::SERVER_ERROR,
                    "Failed to fetch store information",
                ),
            )
                .into_response()
        }
    }
}

#[axum::debug_handler]
pub async fn get_store_info_by_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Response {
    match StoreInfo::find_by_key(&state.pool, &key).await {
        Ok(Some(entry)) => (
            StatusCode::OK,
            success_to_api_response(
                "Store information retrieved successfully",
                json!({
                    "key": entry.info_key,
                    "value": entry.info_value,
                    "description": entry.description,
                }),
            ),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(
                return_codes::INFO_NOT_FOUND,
                format!("Store information not found for key: {}", key),
            ),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error fetching store info: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    return_codes::SERVER_ERROR,
                    "Failed to fetch store information",
                ),
            )
                .into_response()
        }
    }
}
