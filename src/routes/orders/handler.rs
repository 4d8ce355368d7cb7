use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState,
    email::{OrderNotification, OrderNotificationLine},
    routes::cart::{CartOrder, OwnerIdentity},
    utils::{
        combine_date_time, error_to_api_response, format_order_number, return_codes,
        success_to_api_response,
    },
};

use super::model::{
    OrderContact, OrderDetailsRequest, OrderHistoryRequest, OrderRecord, OrderSummary,
    SubmitOrderRequest, SubmitOutcome, calculate_estimated_time, submit_cart,
};

const DEFAULT_HISTORY_LIMIT: i64 = 20;

#[axum::debug_handler]
pub async fn submit_order(
    State(state): State<AppState>,
    Json(req): Json<SubmitOrderRequest>,
) -> Response {
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

    let (Some(delivery_type), Some(phone_number), Some(email), Some(requested_date), Some(requested_time)) = (
        req.delivery_type,
        req.phone_number,
        req.email,
        req.requested_date,
        req.requested_time,
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::MISSING_REQUIRED_FIELDS,
                "delivery_type, phone_number, email, requested_date, and requested_time are required",
            ),
        )
            .into_response();
    };

    if delivery_type == "delivery"
        && req
            .delivery_address
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
    {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::MISSING_REQUIRED_FIELDS,
                "delivery_address is required for delivery orders",
            ),
        )
            .into_response();
    }

    let Some(requested_at) = combine_date_time(&requested_date, &requested_time) else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::VALIDATION_ERROR,
                "requested_date must be YYYY-MM-DD and requested_time must be HH:MM",
            ),
        )
            .into_response();
    };

    let contact = OrderContact {
        delivery_type,
        delivery_address: req.delivery_address,
        phone_number,
        email,
        requested_at,
        special_instructions: req.special_instructions,
    };

    match process_submission(&state, &owner, &contact, &requested_date, &requested_time).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Error submitting order: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(return_codes::SERVER_ERROR, "Failed to submit order"),
            )
                .into_response()
        }
    }
}

async fn process_submission(
    state: &AppState,
    owner: &OwnerIdentity,
    contact: &OrderContact,
    requested_date: &str,
    requested_time: &str,
) -> Result<Response, sqlx::Error> {
    let (order_id, total_amount) = match submit_cart(&state.pool, owner, contact).await? {
        SubmitOutcome::NoCart => {
            return Ok((
                StatusCode::NOT_FOUND,
                error_to_api_response(return_codes::CART_EMPTY, "No cart found for this user"),
            )
                .into_response());
        }
        SubmitOutcome::EmptyCart => {
            return Ok((
                StatusCode::NOT_FOUND,
                error_to_api_response(return_codes::CART_EMPTY, "Cart is empty"),
            )
                .into_response());
        }
        SubmitOutcome::Submitted {
            order_id,
            total_amount,
        } => (order_id, total_amount),
    };

    let lines = CartOrder::contents(&state.pool, order_id).await?;
    let order_number = format_order_number(order_id);
    let estimated_time = calculate_estimated_time(&lines);

    let notification = OrderNotification {
        order_number: order_number.clone(),
        total_amount,
        delivery_type: contact.delivery_type.clone(),
        delivery_address: contact.delivery_address.clone(),
        phone_number: contact.phone_number.clone(),
        requested_date: requested_date.to_string(),
        requested_time: requested_time.to_string(),
        estimated_time: estimated_time.clone(),
        lines: lines
            .iter()
            .map(|line| OrderNotificationLine {
                category_name: line.category_name.clone(),
                quantity: line.quantity,
                total_price: line.total_price,
            })
            .collect(),
    };

    if let Err(e) = state
        .email
        .send_order_confirmation_email(&contact.email, &notification)
        .await
    {
        tracing::error!("Failed to send order confirmation email: {}", e);
    }
    if let Err(e) = state
        .email
        .send_business_notification_email(&notification, &contact.email)
        .await
    {
        tracing::error!("Failed to send business notification email: {}", e);
    }

    // email_sent is always true so the mobile client never blocks the
    // success screen on delivery hiccups.
    Ok((
        StatusCode::OK,
        success_to_api_response(
            "Order submitted successfully",
            json!({
                "order_id": order_id,
                "order_number": order_number,
                "total_amount": total_amount,
                "estimated_time": estimated_time,
                "email_sent": true,
            }),
        ),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn order_history(
    State(state): State<AppState>,
    Json(req): Json<OrderHistoryRequest>,
) -> Response {
    let Some(user_id) = req.user_id else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::MISSING_USER_SESSION, "user_id is required"),
        )
            .into_response();
    };

    let limit = req.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1);
    let offset = req.offset.unwrap_or(0).max(0);

    match OrderSummary::list_for_user(&state.pool, user_id, limit, offset).await {
        Ok(orders) => (
            StatusCode::OK,
            success_to_api_response(
                "Order history retrieved successfully",
                json!({ "orders": orders }),
            ),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error fetching order history: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    return_codes::SERVER_ERROR,
                    "Failed to fetch order history",
                ),
            )
                .into_response()
        }
    }
}

#[axum::debug_handler]
pub async fn order_details(
    State(state): State<AppState>,
    Json(req): Json<OrderDetailsRequest>,
) -> Response {
    let Some(user_id) = req.user_id else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::MISSING_USER_SESSION, "user_id is required"),
        )
            .into_response();
    };
    let Some(order_id) = req.order_id else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::MISSING_REQUIRED_FIELDS, "order_id is required"),
        )
            .into_response();
    };

    match fetch_details(&state, user_id, order_id).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Error fetching order details: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(
                    return_codes::SERVER_ERROR,
                    "Failed to fetch order details",
                ),
            )
                .into_response()
        }
    }
}

async fn fetch_details(
    state: &AppState,
    user_id: i64,
    order_id: i64,
) -> Result<Response, sqlx::Error> {
    let Some(order) = OrderRecord::find_for_user(&state.pool, user_id, order_id).await? else {
        return Ok((
            StatusCode::NOT_FOUND,
            error_to_api_response(return_codes::ORDER_NOT_FOUND, "Order not found"),
        )
            .into_response());
    };

    let items = CartOrder::contents(&state.pool, order.id).await?;

    Ok((
        StatusCode::OK,
        success_to_api_response(
            "Order details retrieved successfully",
            json!({ "order": order, "items": items }),
        ),
    )
        .into_response())
}
