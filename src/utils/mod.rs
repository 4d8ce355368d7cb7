use axum::Json;
use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;

/// Uniform response envelope: `{ return_code, message, ...payload }`.
/// Payload fields are flattened to the top level for the mobile client.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub return_code: &'static str,
    pub message: String,
    #[serde(flatten)]
    pub data: Option<T>,
}

pub fn success_to_api_response<T: Serialize>(
    message: impl Into<String>,
    data: T,
) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        return_code: return_codes::SUCCESS,
        message: message.into(),
        data: Some(data),
    })
}

/// Success envelope with no payload fields beyond the code and message.
pub fn success_message_to_api_response(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        return_code: return_codes::SUCCESS,
        message: message.into(),
        data: None,
    })
}

pub fn error_to_api_response(code: &'static str, message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        return_code: code,
        message: message.into(),
        data: None,
    })
}

/// Error envelope carrying extra payload fields (e.g. EMAIL_NOT_VERIFIED
/// returns user_id/email so the client can offer a resend).
pub fn error_to_api_response_with<T: Serialize>(
    code: &'static str,
    message: impl Into<String>,
    data: T,
) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        return_code: code,
        message: message.into(),
        data: Some(data),
    })
}

pub mod return_codes {
    pub const SUCCESS: &str = "SUCCESS";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const USER_EXISTS: &str = "USER_EXISTS";
    pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const EMAIL_NOT_VERIFIED: &str = "EMAIL_NOT_VERIFIED";
    pub const NO_TOKEN: &str = "NO_TOKEN";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const MISSING_ACTION: &str = "MISSING_ACTION";
    pub const INVALID_ACTION: &str = "INVALID_ACTION";
    pub const MISSING_CATEGORY_ID: &str = "MISSING_CATEGORY_ID";
    pub const INVALID_CATEGORY_ID: &str = "INVALID_CATEGORY_ID";
    pub const CATEGORY_NOT_FOUND: &str = "CATEGORY_NOT_FOUND";
    pub const MISSING_CATEGORY_TYPE: &str = "MISSING_CATEGORY_TYPE";
    pub const MISSING_BUFFET_TYPE: &str = "MISSING_BUFFET_TYPE";
    pub const INVALID_BUFFET_TYPE: &str = "INVALID_BUFFET_TYPE";
    pub const MISSING_USER_SESSION: &str = "MISSING_USER_SESSION";
    pub const MISSING_REQUIRED_FIELDS: &str = "MISSING_REQUIRED_FIELDS";
    pub const CART_EMPTY: &str = "CART_EMPTY";
    pub const ITEM_NOT_FOUND: &str = "ITEM_NOT_FOUND";
    pub const ORDER_NOT_FOUND: &str = "ORDER_NOT_FOUND";
    pub const INFO_NOT_FOUND: &str = "INFO_NOT_FOUND";
    pub const MISSING_APP_VERSION: &str = "MISSING_APP_VERSION";
    pub const APP_UPDATE_REQUIRED: &str = "APP_UPDATE_REQUIRED";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password.as_bytes(), hash)
}

/// Session token claims issued at login and checked by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub is_anonymous: bool,
    pub email_verified: bool,
    pub exp: i64,
    pub iat: i64,
}

pub fn generate_session_token(
    user_id: i64,
    email: &str,
    display_name: &str,
    is_anonymous: bool,
    email_verified: bool,
    config: &Config,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(config.jwt_expiration().as_secs() as i64))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        user_id,
        email: email.to_string(),
        display_name: display_name.to_string(),
        is_anonymous,
        email_verified,
        exp: expiration,
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

pub fn verify_session_token(
    token: &str,
    config: &Config,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Purpose of a single-use auth token. The purpose is namespaced into the
/// token value itself so the format can be checked before hitting storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Verify,
    Reset,
}

impl TokenPurpose {
    pub fn prefix(self) -> &'static str {
        match self {
            TokenPurpose::Verify => "verify",
            TokenPurpose::Reset => "reset",
        }
    }
}

/// `<prefix>_` + 64 hex chars (32 bytes of random material).
pub fn generate_auth_token(purpose: TokenPurpose) -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    format!("{}_{}", purpose.prefix(), hex::encode(hasher.finalize()))
}

pub fn is_valid_token_format(token: &str, purpose: TokenPurpose) -> bool {
    let prefix = format!("{}_", purpose.prefix());
    token.starts_with(&prefix) && token.len() > prefix.len()
}

pub fn token_expiry(hours: i64) -> DateTime<Utc> {
    Utc::now() + Duration::hours(hours)
}

/// Component-wise dotted version comparison; missing trailing components
/// count as 0. Returns true when `current >= required`.
pub fn is_version_valid(current: &str, required: &str) -> bool {
    let mut current_parts: Vec<u64> = current
        .split('.')
        .map(|p| p.trim().parse().unwrap_or(0))
        .collect();
    let mut required_parts: Vec<u64> = required
        .split('.')
        .map(|p| p.trim().parse().unwrap_or(0))
        .collect();

    let len = current_parts.len().max(required_parts.len());
    current_parts.resize(len, 0);
    required_parts.resize(len, 0);

    for (cur, req) in current_parts.iter().zip(required_parts.iter()) {
        if cur > req {
            return true;
        }
        if cur < req {
            return false;
        }
    }

    true
}

/// Human-facing order number, derived from the id and never stored.
pub fn format_order_number(order_id: i64) -> String {
    format!("NK{:06}", order_id)
}

/// Combine a `YYYY-MM-DD` date and a `HH:MM[:SS]` time into one timestamp.
pub fn combine_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .ok()?;
    Some(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_comparison_pads_missing_components_with_zero() {
        assert!(is_version_valid("1.2", "1.2.0"));
        assert!(is_version_valid("1.2.0", "1.2"));
        assert!(!is_version_valid("1.1.9", "1.2.0"));
        assert!(is_version_valid("1.2.1", "1.2.0"));
        assert!(is_version_valid("2", "1.9.9"));
        assert!(!is_version_valid("0.9", "1.0.0"));
        assert!(is_version_valid("1.0.0", "1.0.0"));
    }

    #[test]
    fn order_number_is_pure_function_of_id() {
        assert_eq!(format_order_number(123), "NK000123");
        assert_eq!(format_order_number(1), "NK000001");
        assert_eq!(format_order_number(1_234_567), "NK1234567");
        assert_eq!(format_order_number(123), format_order_number(123));
    }

    #[test]
    fn auth_tokens_carry_prefix_and_entropy() {
        let verify = generate_auth_token(TokenPurpose::Verify);
        let reset = generate_auth_token(TokenPurpose::Reset);

        assert!(is_valid_token_format(&verify, TokenPurpose::Verify));
        assert!(!is_valid_token_format(&verify, TokenPurpose::Reset));
        assert!(is_valid_token_format(&reset, TokenPurpose::Reset));
        assert_eq!(verify.len(), "verify_".len() + 64);

        // Two tokens issued back to back must not collide.
        assert_ne!(
            generate_auth_token(TokenPurpose::Verify),
            generate_auth_token(TokenPurpose::Verify)
        );
    }

    #[test]
    fn token_format_check_rejects_bare_prefix() {
        assert!(!is_valid_token_format("verify_", TokenPurpose::Verify));
        assert!(!is_valid_token_format("", TokenPurpose::Verify));
        assert!(!is_valid_token_format("reset_abc", TokenPurpose::Verify));
    }

    #[test]
    fn combine_date_time_accepts_minute_and_second_precision() {
        let ts = combine_date_time("2024-08-03", "12:30").unwrap();
        assert_eq!(ts.to_string(), "2024-08-03 12:30:00");
        let ts = combine_date_time("2024-08-03", "12:30:15").unwrap();
        assert_eq!(ts.to_string(), "2024-08-03 12:30:15");
        assert!(combine_date_time("03/08/2024", "12:30").is_none());
        assert!(combine_date_time("2024-08-03", "noon").is_none());
    }

    #[test]
    fn password_hash_roundtrip() {
        let hashed = hash_password("correct horse", 4).unwrap();
        assert!(verify_password("correct horse", &hashed).unwrap());
        assert!(!verify_password("wrong horse", &hashed).unwrap());
    }

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            server_host: "127.0.0.1".into(),
            server_port: 3000,
            jwt_secret: "test-secret".into(),
            jwt_expiration_secs: 24 * 3600,
            bcrypt_cost: 4,
            required_app_version: "1.0.0".into(),
            resend_api_key: "re_test".into(),
            email_from: "noreply@example.com".into(),
            email_name: "Test Shop".into(),
            business_notification_email: "orders@example.com".into(),
            public_base_url: "http://localhost:3000".into(),
        }
    }

    #[test]
    fn session_token_roundtrip_preserves_claims() {
        let config = test_config();
        let token =
            generate_session_token(42, "a@b.c", "Alice", false, true, &config).unwrap();
        let claims = verify_session_token(&token, &config).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "a@b.c");
        assert_eq!(claims.display_name, "Alice");
        assert!(!claims.is_anonymous);
        assert!(claims.email_verified);
    }

    #[test]
    fn expired_session_token_is_rejected() {
        let config = test_config();
        let now = Utc::now();
        let claims = Claims {
            user_id: 1,
            email: "a@b.c".into(),
            display_name: "Alice".into(),
            is_anonymous: false,
            email_verified: true,
            exp: (now - Duration::hours(1)).timestamp(),
            iat: (now - Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        let err = verify_session_token(&token, &config).unwrap_err();
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn success_envelope_flattens_payload_fields() {
        let resp = success_to_api_response("Login successful", json!({ "token": "abc" }));
        let body = serde_json::to_value(&resp.0).unwrap();
        assert_eq!(
            body,
            json!({
                "return_code": "SUCCESS",
                "message": "Login successful",
                "token": "abc"
            })
        );
    }

    #[test]
    fn error_envelope_has_no_payload_fields() {
        let resp = error_to_api_response(return_codes::CART_EMPTY, "Cart is empty");
        let body = serde_json::to_value(&resp.0).unwrap();
        assert_eq!(
            body,
            json!({ "return_code": "CART_EMPTY", "message": "Cart is empty" })
        );
    }

    #[test]
    fn generic_envelopes_are_byte_identical() {
        // Enumeration resistance: the forgot-password reply must not vary
        // with whether the email exists.
        let message = "If this email is registered, a password reset link has been sent.";
        let known = serde_json::to_string(&success_message_to_api_response(message).0).unwrap();
        let unknown = serde_json::to_string(&success_message_to_api_response(message).0).unwrap();
        assert_eq!(known, unknown);
        assert_eq!(
            known,
            format!("{{\"return_code\":\"SUCCESS\",\"message\":\"{}\"}}", message)
        );
    }
}
