use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState,
    routes::categories::{CategoryValidation, ProductCategory},
    utils::{error_to_api_response, return_codes, success_to_api_response},
};

use super::model::{
    CartAction, CartOrder, CartRequest, NewCartLine, OwnerIdentity, cart_total,
};

/// Single POST endpoint for all cart mutations and reads, dispatching on
/// the `action` field.
#[axum::debug_handler]
pub async fn cart(State(state): State<AppState>, Json(req): Json<CartRequest>) -> Response {
    let Some(action) = req.action.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::MISSING_ACTION, "Action parameter is required"),
        )
            .into_response();
    };

    let Some(owner) = OwnerIdentity::resolve(req.user_id, req.session_id.as_deref()) else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::MISSING_USER_SESSION,
                "Either user_id or session_id is required",
            ),
        )
            .into_response();
    };

    let Ok(action) = action.parse::<CartAction>() else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::INVALID_ACTION,
                "Invalid action. Supported actions: add, get, delete, clear, validation",
            ),
        )
            .into_response();
    };

    let result = match action {
        CartAction::Add => add_item(&state, &owner, req).await,
        CartAction::Get => cart_payload(&state, &owner, "Cart retrieved successfully").await,
        CartAction::Delete => delete_item(&state, &owner, &req).await,
        CartAction::Clear => clear_cart(&state, &owner).await,
        CartAction::Validation => validation_info(&state).await,
    };

    result.unwrap_or_else(|e| {
        tracing::error!("Error in cart route: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_to_api_response(return_codes::SERVER_ERROR, "Failed to process cart request"),
        )
            .into_response()
    })
}

async fn add_item(
    state: &AppState,
    owner: &OwnerIdentity,
    req: CartRequest,
) -> Result<Response, sqlx::Error> {
    let (Some(category_id), Some(quantity), Some(unit_price), Some(included_items)) =
        (req.category_id, req.quantity, req.unit_price, req.included_items)
    else {
        return Ok((
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::MISSING_REQUIRED_FIELDS,
                "category_id, quantity, unit_price, and included_items are required",
            ),
        )
            .into_response());
    };

    if ProductCategory::find_by_id(&state.pool, category_id)
        .await?
        .is_none()
    {
        return Ok((
            StatusCode::NOT_FOUND,
            error_to_api_response(return_codes::CATEGORY_NOT_FOUND, "Category not found"),
        )
            .into_response());
    }

    CartOrder::add_line(
        &state.pool,
        owner,
        NewCartLine {
            category_id,
            quantity,
            unit_price,
            notes: req.notes,
            department_label: req.department_label,
            deluxe_format: req.deluxe_format,
            included_items,
        },
    )
    .await?;

    cart_payload(state, owner, "Item added to cart successfully").await
}

async fn delete_item(
    state: &AppState,
    owner: &OwnerIdentity,
    req: &CartRequest,
) -> Result<Response, sqlx::Error> {
    let Some(order_category_id) = req.order_category_id else {
        return Ok((
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::MISSING_REQUIRED_FIELDS,
                "order_category_id is required",
            ),
        )
            .into_response());
    };

    let Some(cart) = CartOrder::find_for_owner(&state.pool, owner).await? else {
        return Ok((
            StatusCode::NOT_FOUND,
            error_to_api_response(return_codes::CART_EMPTY, "Cart is empty"),
        )
            .into_response());
    };

    if !CartOrder::delete_line(&state.pool, cart.id, order_category_id).await? {
        return Ok((
            StatusCode::NOT_FOUND,
            error_to_api_response(return_codes::ITEM_NOT_FOUND, "Cart item not found"),
        )
            .into_response());
    }

    cart_payload(state, owner, "Item removed from cart successfully").await
}

async fn clear_cart(state: &AppState, owner: &OwnerIdentity) -> Result<Response, sqlx::Error> {
    CartOrder::clear(&state.pool, owner).await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(
            "Cart cleared successfully",
            json!({ "cart_items": [], "total_amount": 0.0 }),
        ),
    )
        .into_response())
}

async fn validation_info(state: &AppState) -> Result<Response, sqlx::Error> {
    let categories = ProductCategory::get_all(&state.pool).await?;
    let validations: Vec<CategoryValidation> =
        categories.iter().map(CategoryValidation::from).collect();

    Ok((
        StatusCode::OK,
        success_to_api_response(
            "Validation info retrieved successfully",
            json!({ "categories": validations }),
        ),
    )
        .into_response())
}

/// The recomputed cart contents and total that every mutating action
/// returns to the client.
async fn cart_payload(
    state: &AppState,
    owner: &OwnerIdentity,
    message: &str,
) -> Result<Response, sqlx::Error> {
    let lines = match CartOrder::find_for_owner(&state.pool, owner).await? {
        Some(cart) => CartOrder::contents(&state.pool, cart.id).await?,
        None => Vec::new(),
    };
    let total_amount = cart_total(&lines);

    Ok((
        StatusCode::OK,
        success_to_api_response(
            message,
            json!({ "cart_items": lines, "total_amount": total_amount }),
        ),
    )
        .into_response())
}
