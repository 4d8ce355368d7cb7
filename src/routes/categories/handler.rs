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

use super::model::{CategoriesAction, CategoriesRequest, ProductCategory, parse_category_id};

/// Single POST endpoint dispatching on the `action` field, one branch per
/// catalog operation.
#[axum::debug_handler]
pub async fn categories(
    State(state): State<AppState>,
    Json(req): Json<CategoriesRequest>,
) -> Response {
    let Some(action) = req.action.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::MISSING_ACTION, "Action parameter is required"),
        )
            .into_response();
    };

    let Ok(action) = action.parse::<CategoriesAction>() else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::INVALID_ACTION,
                "Invalid action. Supported actions: get_all, get_by_id, get_by_type",
            ),
        )
            .into_response();
    };

    let result = match action {
        CategoriesAction::GetAll => get_all(&state).await,
        CategoriesAction::GetById => get_by_id(&state, &req).await,
        CategoriesAction::GetByType => get_by_type(&state, &req).await,
    };

    result.unwrap_or_else(|e| {
        tracing::error!("Error in categories route: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(
                return_codes::SERVER_ERROR,
                "Failed to process category request",
            ),
        )
            .into_response()
    })
}

async fn get_all(state: &AppState) -> Result<Response, sqlx::Error> {
    let categories = ProductCategory::get_all(&state.pool).await?;
    Ok((
        StatusCode::OK,
        success_to_api_response(
            "Categories retrieved successfully",
            json!({ "categories": categories }),
        ),
    )
        .into_response())
}

async fn get_by_id(state: &AppState, req: &CategoriesRequest) -> Result<Response, sqlx::Error> {
    let Some(raw_id) = req.category_id.as_ref() else {
        return Ok((
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::MISSING_CATEGORY_ID,
                "Category ID is required for get_by_id action",
            ),
        )
            .into_response());
    };

    let Some(category_id) = parse_category_id(raw_id) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::INVALID_CATEGORY_ID, "Invalid category ID"),
        )
            .into_response());
    };

    match ProductCategory::find_by_id(&state.pool, category_id).await? {
        Some(category) => Ok((
            StatusCode::OK,
            success_to_api_response(
                "Category retrieved successfully",
                json!({ "category": category }),
            ),
        )
            .into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            error_to_api_response(return_codes::CATEGORY_NOT_FOUND, "Category not found"),
        )
            .into_response()),
    }
}

async fn get_by_type(state: &AppState, req: &CategoriesRequest) -> Result<Response, sqlx::Error> {
    let category_type = req.category_type.as_deref().unwrap_or("").trim();
    if category_type.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::MISSING_CATEGORY_TYPE,
                "Category type is required for get_by_type action",
            ),
        )
            .into_response());
    }

    let categories = ProductCategory::get_by_type(&state.pool, category_type).await?;
    Ok((
        StatusCode::OK,
        success_to_api_response(
            "Categories retrieved successfully",
            json!({ "categories": categories }),
        ),
    )
        .into_response())
}
