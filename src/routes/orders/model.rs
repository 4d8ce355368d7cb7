use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::routes::cart::{CartLine, CartOrder, OwnerIdentity};
use crate::utils::format_order_number;

const BASE_PREP_MINUTES: i64 = 30;
const PER_PORTION_MINUTES: i64 = 5;
const MAX_PREP_MINUTES: i64 = 90;

#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub delivery_type: Option<String>,
    pub delivery_address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub requested_date: Option<String>,
    pub requested_time: Option<String>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderHistoryRequest {
    pub user_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct OrderDetailsRequest {
    pub user_id: Option<i64>,
    pub order_id: Option<i64>,
}

/// Contact and fulfilment details frozen onto the order at submission.
#[derive(Debug)]
pub struct OrderContact {
    pub delivery_type: String,
    pub delivery_address: Option<String>,
    pub phone_number: String,
    pub email: String,
    pub requested_at: NaiveDateTime,
    pub special_instructions: Option<String>,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    NoCart,
    EmptyCart,
    Submitted { order_id: i64, total_amount: f64 },
}

/// A past order as listed in the history view.
#[derive(Debug, Serialize, FromRow)]
pub struct OrderSummary {
    pub id: i64,
    pub total_amount: f64,
    pub order_status: String,
    pub delivery_type: String,
    pub requested_at: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub item_count: i64,
    #[sqlx(skip)]
    pub order_number: String,
}

/// One order with every stored column the client may render.
#[derive(Debug, Serialize, FromRow)]
pub struct OrderRecord {
    pub id: i64,
    pub total_amount: f64,
    pub order_status: String,
    pub delivery_type: String,
    pub delivery_address: Option<String>,
    pub delivery_notes: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    pub requested_at: Option<NaiveDateTime>,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub order_number: String,
}

/// The cart -> pending transition. The total is recomputed from the stored
/// lines inside the same transaction that flips the status, so a
/// client-sent total can never leak into the order.
pub async fn submit_cart(
    pool: &PgPool,
    owner: &OwnerIdentity,
    contact: &OrderContact,
) -> Result<SubmitOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(cart) = CartOrder::find_for_owner(&mut *tx, owner).await? else {
        return Ok(SubmitOutcome::NoCart);
    };

    let line_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM order_category WHERE order_id = $1")
            .bind(cart.id)
            .fetch_one(&mut *tx)
            .await?;
    if line_count == 0 {
        return Ok(SubmitOutcome::EmptyCart);
    }

    let total_amount: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_price), 0) FROM order_category WHERE order_id = $1",
    )
    .bind(cart.id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE orders
        SET total_amount = $1,
            order_status = 'pending',
            delivery_type = $2,
            delivery_address = $3,
            guest_phone = $4,
            guest_email = $5,
            requested_at = $6,
            special_instructions = $7,
            confirmed_at = NOW(),
            updated_at = NOW()
        WHERE id = $8
        "#,
    )
    .bind(total_amount)
    .bind(&contact.delivery_type)
    .bind(&contact.delivery_address)
    .bind(&contact.phone_number)
    .bind(&contact.email)
    .bind(contact.requested_at)
    .bind(&contact.special_instructions)
    .bind(cart.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(SubmitOutcome::Submitted {
        order_id: cart.id,
        total_amount,
    })
}

/// Base 30 minutes plus 5 per buffet portion, capped at 90.
pub fn calculate_estimated_time(lines: &[CartLine]) -> String {
    let portions: i64 = lines.iter().map(|line| i64::from(line.quantity)).sum();
    let total_minutes = (BASE_PREP_MINUTES + portions * PER_PORTION_MINUTES).min(MAX_PREP_MINUTES);
    format!("{} minutes", total_minutes)
}

impl OrderSummary {
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.id, o.total_amount, o.order_status, o.delivery_type, o.requested_at,
                   o.created_at, o.confirmed_at,
                   (SELECT COUNT(*) FROM order_category oc WHERE oc.order_id = o.id) AS item_count
            FROM orders o
            WHERE o.app_user_id = $1 AND o.order_status <> 'cart'
            ORDER BY o.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        for order in &mut orders {
            order.order_number = format_order_number(order.id);
        }
        Ok(orders)
    }
}

impl OrderRecord {
    /// Ownership is the WHERE clause: an order belonging to someone else is
    /// indistinguishable from a missing one.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: i64,
        order_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let order = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, total_amount, order_status, delivery_type, delivery_address,
                   delivery_notes, guest_phone, guest_email, requested_at,
                   special_instructions, created_at, confirmed_at, completed_at
            FROM orders
            WHERE id = $1 AND app_user_id = $2 AND order_status <> 'cart'
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(order.map(|mut order| {
            order.order_number = format_order_number(order.id);
            order
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32) -> CartLine {
        CartLine {
            id: 1,
            category_id: 1,
            category_name: "Classic Buffet".into(),
            quantity,
            unit_price: 9.90,
            total_price: f64::from(quantity) * 9.90,
            notes: None,
            department_label: None,
            deluxe_format: None,
            included_items: Vec::new(),
        }
    }

    #[test]
    fn estimated_time_grows_with_portions() {
        assert_eq!(calculate_estimated_time(&[]), "30 minutes");
        assert_eq!(calculate_estimated_time(&[line(4)]), "50 minutes");
        assert_eq!(calculate_estimated_time(&[line(4), line(2)]), "60 minutes");
    }

    #[test]
    fn estimated_time_caps_at_ninety_minutes() {
        assert_eq!(calculate_estimated_time(&[line(12)]), "90 minutes");
        assert_eq!(calculate_estimated_time(&[line(100)]), "90 minutes");
    }
}
