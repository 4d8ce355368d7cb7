use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// Business metadata (hours, address, contact) kept out of the app binary
/// so it can change without a release.
#[derive(Debug, Serialize, FromRow)]
pub struct StoreInfo {
    pub info_key: String,
    pub info_value: String,
    pub description: Option<String>,
}

impl StoreInfo {
    pub async fn get_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, StoreInfo>(
            "SELECT info_key, info_value, description FROM store_info ORDER BY info_key",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, StoreInfo>(
            "SELECT info_key, info_value, description FROM store_info WHERE info_key = $1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }
}
