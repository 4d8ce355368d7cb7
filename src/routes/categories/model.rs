use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

/// Buffet tier reference data. Read-only from the API's perspective;
/// inactive rows are invisible everywhere.
#[derive(Debug, Serialize, FromRow)]
pub struct ProductCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category_type: Option<String>,
    pub is_active: bool,
    pub minimum_quantity: Option<i32>,
}

/// Per-category minimum the client enforces before allowing a cart add.
#[derive(Debug, Serialize)]
pub struct CategoryValidation {
    pub id: i64,
    pub name: String,
    pub minimum_quantity: i32,
}

impl From<&ProductCategory> for CategoryValidation {
    fn from(category: &ProductCategory) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            minimum_quantity: category.minimum_quantity.unwrap_or(1),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoriesRequest {
    pub action: Option<String>,
    pub category_id: Option<Value>,
    pub category_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoriesAction {
    GetAll,
    GetById,
    GetByType,
}

impl std::str::FromStr for CategoriesAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get_all" => Ok(CategoriesAction::GetAll),
            "get_by_id" => Ok(CategoriesAction::GetById),
            "get_by_type" => Ok(CategoriesAction::GetByType),
            _ => Err(()),
        }
    }
}

/// Accepts both JSON numbers and numeric strings; older app builds send the
/// id as a string.
pub fn parse_category_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl ProductCategory {
    pub async fn get_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProductCategory>(
            "SELECT * FROM product_category WHERE is_active = TRUE ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProductCategory>(
            "SELECT * FROM product_category WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn get_by_type(
        pool: &PgPool,
        category_type: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProductCategory>(
            r#"
            SELECT * FROM product_category
            WHERE is_active = TRUE AND category_type ILIKE '%' || $1 || '%'
            ORDER BY id
            "#,
        )
        .bind(category_type)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_id_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_category_id(&json!(3)), Some(3));
        assert_eq!(parse_category_id(&json!("7")), Some(7));
        assert_eq!(parse_category_id(&json!(" 12 ")), Some(12));
        assert_eq!(parse_category_id(&json!("abc")), None);
        assert_eq!(parse_category_id(&json!(2.5)), None);
        assert_eq!(parse_category_id(&json!(null)), None);
    }

    #[test]
    fn actions_parse_exhaustively() {
        assert_eq!("get_all".parse(), Ok(CategoriesAction::GetAll));
        assert_eq!("get_by_id".parse(), Ok(CategoriesAction::GetById));
        assert_eq!("get_by_type".parse(), Ok(CategoriesAction::GetByType));
        assert_eq!("delete_all".parse::<CategoriesAction>(), Err(()));
    }

    #[test]
    fn validation_minimum_defaults_to_one() {
        let category = ProductCategory {
            id: 5,
            name: "Classic Buffet".into(),
            description: None,
            category_type: Some("buffet".into()),
            is_active: true,
            minimum_quantity: None,
        };
        let validation = CategoryValidation::from(&category);
        assert_eq!(validation.minimum_quantity, 1);

        let category = ProductCategory {
            minimum_quantity: Some(10),
            ..category
        };
        assert_eq!(CategoryValidation::from(&category).minimum_quantity, 10);
    }
}
