use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub phone: Option<String>,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_anonymous: bool,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    #[serde(skip_serializing)]
    pub auth_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub phone: Option<String>,
    pub display_name: String,
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

impl User {
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM app_user WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM app_user WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, new_user: NewUser) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO app_user (email, phone, display_name, password_hash, is_anonymous, email_verified)
            VALUES ($1, $2, $3, $4, false, false)
            RETURNING *
            "#,
        )
        .bind(new_user.email)
        .bind(new_user.phone)
        .bind(new_user.display_name)
        .bind(new_user.password_hash)
        .fetch_one(pool)
        .await
    }

    pub async fn update_last_active(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE app_user SET last_active_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// One token slot per user: issuing a new token overwrites the old one.
    pub async fn set_auth_token(
        pool: &PgPool,
        id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE app_user SET auth_token = $1, auth_token_expires = $2 WHERE id = $3")
            .bind(token)
            .bind(expires_at)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_auth_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM app_user WHERE auth_token = $1 AND auth_token_expires > NOW()",
        )
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    pub async fn clear_auth_token(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE app_user SET auth_token = NULL, auth_token_expires = NULL WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn mark_email_verified(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE app_user SET email_verified = TRUE WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Replaces the credential hash and consumes the reset token in one
    /// statement, so a used token can never be replayed.
    pub async fn update_password(
        pool: &PgPool,
        id: i64,
        password_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE app_user
            SET password_hash = $1, auth_token = NULL, auth_token_expires = NULL
            WHERE id = $2
            "#,
        )
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn update_display_name(
        pool: &PgPool,
        id: i64,
        display_name: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE app_user SET display_name = $1 WHERE id = $2")
            .bind(display_name)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
