use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::errors::ErrorKind;

use crate::{
    AppState,
    utils::{error_to_api_response, return_codes, verify_session_token},
};

/// Requires a valid bearer session token and exposes its claims to the
/// handler through a request extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(TypedHeader(bearer)) = bearer else {
        return (
            StatusCode::UNAUTHORIZED,
            error_to_api_response(return_codes::NO_TOKEN, "Access token required"),
        )
            .into_response();
    };

    match verify_session_token(bearer.token(), &state.config) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => (
            StatusCode::UNAUTHORIZED,
            error_to_api_response(return_codes::TOKEN_EXPIRED, "Token has expired"),
        )
            .into_response(),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            error_to_api_response(return_codes::INVALID_TOKEN, "Invalid token"),
        )
            .into_response(),
    }
}
