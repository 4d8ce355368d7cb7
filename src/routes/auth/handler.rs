use axum::{
    Extension,
    extract::{Json, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState,
    utils::{
        Claims, TokenPurpose, error_to_api_response, error_to_api_response_with,
        generate_auth_token, generate_session_token, hash_password, is_valid_token_format,
        return_codes, success_message_to_api_response, success_to_api_response, token_expiry,
        verify_password,
    },
};

use super::model::{
    EmailRequest, LoginRequest, NewUser, RegisterRequest, ResetPasswordRequest, TokenQuery,
    UpdateProfileRequest, User,
};
use super::pages;

const VERIFY_TOKEN_HOURS: i64 = 24;
const RESET_TOKEN_HOURS: i64 = 1;

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        error_to_api_response(return_codes::SERVER_ERROR, "Internal server error"),
    )
        .into_response()
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        error_to_api_response(
            return_codes::INVALID_CREDENTIALS,
            "Invalid email or password",
        ),
    )
        .into_response()
}

#[axum::debug_handler]
pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> Response {
    let (Some(email), Some(password), Some(display_name)) =
        (req.email, req.password, req.display_name)
    else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::VALIDATION_ERROR,
                "Email, password, and display name are required",
            ),
        )
            .into_response();
    };

    if password.chars().count() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::VALIDATION_ERROR,
                "Password must be at least 8 characters long",
            ),
        )
            .into_response();
    }

    match register_user(&state, email, req.phone, display_name, &password).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Registration error: {}", e);
            server_error()
        }
    }
}

async fn register_user(
    state: &AppState,
    email: String,
    phone: Option<String>,
    display_name: String,
    password: &str,
) -> Result<Response, sqlx::Error> {
    if User::find_by_email(&state.pool, &email).await?.is_some() {
        return Ok((
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::USER_EXISTS,
                "User with this email already exists",
            ),
        )
            .into_response());
    }

    let password_hash = hash_password(password, state.config.bcrypt_cost)
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to hash password: {}", e)))?;

    let user = User::create(
        &state.pool,
        NewUser {
            email,
            phone,
            display_name,
            password_hash,
        },
    )
    .await?;

    let token = generate_auth_token(TokenPurpose::Verify);
    User::set_auth_token(&state.pool, user.id, &token, token_expiry(VERIFY_TOKEN_HOURS)).await?;

    // Registration succeeds whether or not the verification mail goes out.
    let email_sent = match state.email.send_verification_email(&user.email, &token).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to send verification email: {}", e);
            false
        }
    };

    Ok((
        StatusCode::CREATED,
        success_to_api_response(
            "User registered successfully. Please check your email to verify your account.",
            json!({ "user": user, "email_sent": email_sent }),
        ),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::VALIDATION_ERROR,
                "Email and password are required",
            ),
        )
            .into_response();
    };

    match login_user(&state, &email, &password).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Login error: {}", e);
            server_error()
        }
    }
}

async fn login_user(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<Response, sqlx::Error> {
    let Some(user) = User::find_by_email(&state.pool, email).await? else {
        return Ok(invalid_credentials());
    };

    let password_ok = match user.password_hash.as_deref() {
        Some(hash) => verify_password(password, hash)
            .map_err(|e| sqlx::Error::Protocol(format!("Failed to verify password: {}", e)))?,
        None => false,
    };
    if !password_ok {
        return Ok(invalid_credentials());
    }

    // Guests skip verification; registered accounts must confirm their email
    // first. user_id/email ride along so the client can offer a resend.
    if !user.is_anonymous && !user.email_verified {
        return Ok((
            StatusCode::UNAUTHORIZED,
            error_to_api_response_with(
                return_codes::EMAIL_NOT_VERIFIED,
                "Email not verified. Please check your email or continue as guest.",
                json!({ "user_id": user.id, "email": user.email }),
            ),
        )
            .into_response());
    }

    User::update_last_active(&state.pool, user.id).await?;

    let token = generate_session_token(
        user.id,
        &user.email,
        &user.display_name,
        user.is_anonymous,
        user.email_verified,
        &state.config,
    )
    .map_err(|e| sqlx::Error::Protocol(format!("Failed to sign session token: {}", e)))?;

    Ok((
        StatusCode::OK,
        success_to_api_response("Login successful", json!({ "token": token, "user": user })),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> (StatusCode, Html<String>) {
    let email_name = &state.config.email_name;

    let token = query.token.unwrap_or_default();
    if !is_valid_token_format(&token, TokenPurpose::Verify) {
        return (
            StatusCode::BAD_REQUEST,
            Html(pages::invalid_verification_page(email_name)),
        );
    }

    let user = match User::find_by_auth_token(&state.pool, &token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Email verification error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::verification_error_page(email_name)),
            );
        }
    };

    let Some(user) = user else {
        return (
            StatusCode::BAD_REQUEST,
            Html(pages::expired_verification_page(email_name)),
        );
    };

    let marked = async {
        User::mark_email_verified(&state.pool, user.id).await?;
        User::clear_auth_token(&state.pool, user.id).await
    }
    .await;

    match marked {
        Ok(()) => (
            StatusCode::OK,
            Html(pages::verification_success_page(email_name)),
        ),
        Err(e) => {
            tracing::error!("Email verification error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::verification_error_page(email_name)),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Response {
    let Some(email) = req.email else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::VALIDATION_ERROR, "Email is required"),
        )
            .into_response();
    };

    match issue_verification_token(&state, &email).await {
        // Identical envelope whether or not the address is registered.
        Ok(()) => (
            StatusCode::OK,
            success_message_to_api_response(
                "If this email is registered and not yet verified, a verification email has been sent.",
            ),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Resend verification error: {}", e);
            server_error()
        }
    }
}

async fn issue_verification_token(state: &AppState, email: &str) -> Result<(), sqlx::Error> {
    let Some(user) = User::find_by_email(&state.pool, email).await? else {
        return Ok(());
    };
    if user.email_verified {
        return Ok(());
    }

    let token = generate_auth_token(TokenPurpose::Verify);
    User::set_auth_token(&state.pool, user.id, &token, token_expiry(VERIFY_TOKEN_HOURS)).await?;

    if let Err(e) = state.email.send_verification_email(email, &token).await {
        tracing::error!("Failed to send verification email: {}", e);
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Response {
    let Some(email) = req.email else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::VALIDATION_ERROR, "Email is required"),
        )
            .into_response();
    };

    match issue_reset_token(&state, &email).await {
        // Identical envelope whether or not the address is registered.
        Ok(()) => (
            StatusCode::OK,
            success_message_to_api_response(
                "If this email is registered, a password reset link has been sent.",
            ),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Forgot password error: {}", e);
            server_error()
        }
    }
}

async fn issue_reset_token(state: &AppState, email: &str) -> Result<(), sqlx::Error> {
    let Some(user) = User::find_by_email(&state.pool, email).await? else {
        return Ok(());
    };
    // Guest accounts have no credentials to reset.
    if user.is_anonymous {
        return Ok(());
    }

    let token = generate_auth_token(TokenPurpose::Reset);
    User::set_auth_token(&state.pool, user.id, &token, token_expiry(RESET_TOKEN_HOURS)).await?;

    if let Err(e) = state.email.send_password_reset_email(email, &token).await {
        tracing::error!("Failed to send password reset email: {}", e);
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn reset_password_form(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> (StatusCode, Html<String>) {
    let email_name = &state.config.email_name;

    let token = query.token.unwrap_or_default();
    if !is_valid_token_format(&token, TokenPurpose::Reset) {
        return (
            StatusCode::BAD_REQUEST,
            Html(pages::invalid_reset_page(email_name)),
        );
    }

    match User::find_by_auth_token(&state.pool, &token).await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Html(pages::reset_form_page(email_name, &token)),
        ),
        Ok(None) => (
            StatusCode::BAD_REQUEST,
            Html(pages::expired_reset_page(email_name)),
        ),
        Err(e) => {
            tracing::error!("Password reset form error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::reset_error_page(email_name)),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Response {
    let (Some(token), Some(new_password)) = (req.token, req.new_password) else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::VALIDATION_ERROR,
                "Token and new password are required",
            ),
        )
            .into_response();
    };

    if !is_valid_token_format(&token, TokenPurpose::Reset) {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::INVALID_TOKEN, "Invalid reset token format"),
        )
            .into_response();
    }

    if new_password.chars().count() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                return_codes::VALIDATION_ERROR,
                "Password must be at least 8 characters long",
            ),
        )
            .into_response();
    }

    match apply_password_reset(&state, &token, &new_password).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Password reset error: {}", e);
            server_error()
        }
    }
}

async fn apply_password_reset(
    state: &AppState,
    token: &str,
    new_password: &str,
) -> Result<Response, sqlx::Error> {
    let Some(user) = User::find_by_auth_token(&state.pool, token).await? else {
        return Ok((
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::INVALID_TOKEN, "Invalid or expired reset token"),
        )
            .into_response());
    };

    let password_hash = hash_password(new_password, state.config.bcrypt_cost)
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to hash password: {}", e)))?;
    User::update_password(&state.pool, user.id, &password_hash).await?;

    Ok((
        StatusCode::OK,
        success_message_to_api_response(
            "Password reset successfully. You can now log in with your new password.",
        ),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match User::find_by_id(&state.pool, claims.user_id).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            success_to_api_response("Profile retrieved successfully", json!({ "user": user })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(return_codes::USER_NOT_FOUND, "User not found"),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Profile error: {}", e);
            server_error()
        }
    }
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Response {
    let Some(display_name) = req.display_name else {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(return_codes::VALIDATION_ERROR, "Display name is required"),
        )
            .into_response();
    };

    match User::update_display_name(&state.pool, claims.user_id, &display_name).await {
        Ok(()) => (
            StatusCode::OK,
            success_message_to_api_response("Display name updated successfully"),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Update profile error: {}", e);
            server_error()
        }
    }
}
