use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

/// Who a cart belongs to: an authenticated user id or an opaque guest
/// session string. Guest identifiers are stored in the guest_email column
/// of orders until checkout fills in the real contact details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerIdentity {
    User(i64),
    Guest(String),
}

impl OwnerIdentity {
    /// A numeric user_id takes precedence; otherwise the session string
    /// identifies a guest. Neither means the request is unattributable.
    pub fn resolve(user_id: Option<i64>, session_id: Option<&str>) -> Option<Self> {
        match (user_id, session_id) {
            (Some(id), _) => Some(OwnerIdentity::User(id)),
            (None, Some(session)) if !session.trim().is_empty() => {
                Some(OwnerIdentity::Guest(session.to_string()))
            }
            _ => None,
        }
    }
}

/// The single mutable order row per owner while it still has
/// order_status = 'cart'.
#[derive(Debug, FromRow)]
pub struct CartOrder {
    pub id: i64,
    pub app_user_id: Option<i64>,
    pub guest_email: Option<String>,
    pub total_amount: f64,
    pub order_status: String,
}

/// One priced buffet line within an order, with the customer's item picks.
#[derive(Debug, Serialize)]
pub struct CartLine {
    pub id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    pub notes: Option<String>,
    pub department_label: Option<String>,
    pub deluxe_format: Option<String>,
    pub included_items: Vec<CartLineItem>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CartLineItem {
    pub id: i64,
    #[serde(skip_serializing)]
    pub order_category_id: i64,
    pub menu_item_id: i64,
    pub name: String,
}

#[derive(Debug, FromRow)]
struct CartLineRow {
    id: i64,
    category_id: i64,
    category_name: String,
    quantity: i32,
    unit_price: f64,
    total_price: f64,
    notes: Option<String>,
    department_label: Option<String>,
    deluxe_format: Option<String>,
}

#[derive(Debug)]
pub struct NewCartLine {
    pub category_id: i64,
    pub quantity: i32,
    pub unit_price: f64,
    pub notes: Option<String>,
    pub department_label: Option<String>,
    pub deluxe_format: Option<String>,
    pub included_items: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CartRequest {
    pub action: Option<String>,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub category_id: Option<i64>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
    pub department_label: Option<String>,
    pub notes: Option<String>,
    pub deluxe_format: Option<String>,
    pub included_items: Option<Vec<i64>>,
    pub order_category_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Add,
    Get,
    Delete,
    Clear,
    Validation,
}

impl std::str::FromStr for CartAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(CartAction::Add),
            "get" => Ok(CartAction::Get),
            "delete" => Ok(CartAction::Delete),
            "clear" => Ok(CartAction::Clear),
            "validation" => Ok(CartAction::Validation),
            _ => Err(()),
        }
    }
}

pub fn line_total(quantity: i32, unit_price: f64) -> f64 {
    quantity as f64 * unit_price
}

pub fn cart_total(lines: &[CartLine]) -> f64 {
    lines.iter().map(|line| line.total_price).sum()
}

const CART_COLUMNS: &str = "id, app_user_id, guest_email, total_amount, order_status";

impl CartOrder {
    pub async fn find_for_owner<'e, E>(
        executor: E,
        owner: &OwnerIdentity,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        match owner {
            OwnerIdentity::User(user_id) => {
                let sql = format!(
                    "SELECT {CART_COLUMNS} FROM orders WHERE app_user_id = $1 AND order_status = 'cart'"
                );
                sqlx::query_as::<_, CartOrder>(&sql)
                    .bind(user_id)
                    .fetch_optional(executor)
                    .await
            }
            OwnerIdentity::Guest(session_id) => {
                let sql = format!(
                    "SELECT {CART_COLUMNS} FROM orders WHERE guest_email = $1 AND app_user_id IS NULL AND order_status = 'cart'"
                );
                sqlx::query_as::<_, CartOrder>(&sql)
                    .bind(session_id)
                    .fetch_optional(executor)
                    .await
            }
        }
    }

    /// Lookup-before-create keeps the one-cart-per-owner invariant; the
    /// caller's transaction makes the pair atomic with the first line
    /// insert. Delivery and date fields are placeholders until submission.
    async fn get_or_create(
        conn: &mut PgConnection,
        owner: &OwnerIdentity,
    ) -> Result<Self, sqlx::Error> {
        if let Some(cart) = Self::find_for_owner(&mut *conn, owner).await? {
            return Ok(cart);
        }

        let (app_user_id, guest_email) = match owner {
            OwnerIdentity::User(user_id) => (Some(*user_id), None),
            OwnerIdentity::Guest(session_id) => (None, Some(session_id.as_str())),
        };

        let sql = format!(
            r#"
            INSERT INTO orders (app_user_id, guest_email, total_amount, order_status, delivery_type, requested_at)
            VALUES ($1, $2, 0, 'cart', 'pending', NOW())
            RETURNING {CART_COLUMNS}
            "#
        );
        sqlx::query_as::<_, CartOrder>(&sql)
            .bind(app_user_id)
            .bind(guest_email)
            .fetch_one(&mut *conn)
            .await
    }

    /// Inserts one priced line plus its menu item selections, creating the
    /// cart order first if the owner has none. The whole sequence is one
    /// transaction, so a failure leaves no partial line behind.
    pub async fn add_line(
        pool: &PgPool,
        owner: &OwnerIdentity,
        line: NewCartLine,
    ) -> Result<i64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let cart = Self::get_or_create(&mut tx, owner).await?;
        let total_price = line_total(line.quantity, line.unit_price);

        let line_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO order_category
                (order_id, category_id, quantity, unit_price, total_price, notes, department_label, deluxe_format)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(cart.id)
        .bind(line.category_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(total_price)
        .bind(&line.notes)
        .bind(&line.department_label)
        .bind(&line.deluxe_format)
        .fetch_one(&mut *tx)
        .await?;

        for menu_item_id in &line.included_items {
            sqlx::query(
                "INSERT INTO order_item (order_id, order_category_id, menu_item_id) VALUES ($1, $2, $3)",
            )
            .bind(cart.id)
            .bind(line_id)
            .bind(menu_item_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(cart.id)
    }

    /// Full line/item tree for one order, grouped in memory from two reads.
    pub async fn contents(pool: &PgPool, order_id: i64) -> Result<Vec<CartLine>, sqlx::Error> {
        let lines = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT oc.id, oc.category_id, pc.name AS category_name, oc.quantity,
                   oc.unit_price, oc.total_price, oc.notes, oc.department_label, oc.deluxe_format
            FROM order_category oc
            JOIN product_category pc ON pc.id = oc.category_id
            WHERE oc.order_id = $1
            ORDER BY oc.id
            "#,
        )
        .bind(order_id)
        .fetch_all(pool)
        .await?;

        let items = sqlx::query_as::<_, CartLineItem>(
            r#"
            SELECT oi.id, oi.order_category_id, oi.menu_item_id, mi.name
            FROM order_item oi
            JOIN menu_item mi ON mi.id = oi.menu_item_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            "#,
        )
        .bind(order_id)
        .fetch_all(pool)
        .await?;

        let mut items_by_line: HashMap<i64, Vec<CartLineItem>> = HashMap::new();
        for item in items {
            items_by_line
                .entry(item.order_category_id)
                .or_default()
                .push(item);
        }

        Ok(lines
            .into_iter()
            .map(|row| CartLine {
                included_items: items_by_line.remove(&row.id).unwrap_or_default(),
                id: row.id,
                category_id: row.category_id,
                category_name: row.category_name,
                quantity: row.quantity,
                unit_price: row.unit_price,
                total_price: row.total_price,
                notes: row.notes,
                department_label: row.department_label,
                deluxe_format: row.deluxe_format,
            })
            .collect())
    }

    /// Removes one line and its items. Returns false (and rolls back)
    /// when the line does not belong to the given order, leaving every
    /// other cart untouched.
    pub async fn delete_line(
        pool: &PgPool,
        order_id: i64,
        line_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM order_item WHERE order_category_id = $1 AND order_id = $2")
            .bind(line_id)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM order_category WHERE id = $1 AND order_id = $2")
            .bind(line_id)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Drops the owner's cart entirely: items, lines, then the order row.
    /// A missing cart is not an error.
    pub async fn clear(pool: &PgPool, owner: &OwnerIdentity) -> Result<(), sqlx::Error> {
        let Some(cart) = Self::find_for_owner(pool, owner).await? else {
            return Ok(());
        };

        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM order_item WHERE order_id = $1")
            .bind(cart.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM order_category WHERE order_id = $1")
            .bind(cart.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(cart.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, quantity: i32, unit_price: f64) -> CartLine {
        CartLine {
            id,
            category_id: 1,
            category_name: "Classic Buffet".into(),
            quantity,
            unit_price,
            total_price: line_total(quantity, unit_price),
            notes: None,
            department_label: None,
            deluxe_format: None,
            included_items: Vec::new(),
        }
    }

    #[test]
    fn owner_resolution_prefers_user_id() {
        assert_eq!(
            OwnerIdentity::resolve(Some(7), Some("abc")),
            Some(OwnerIdentity::User(7))
        );
        assert_eq!(
            OwnerIdentity::resolve(None, Some("abc")),
            Some(OwnerIdentity::Guest("abc".into()))
        );
        assert_eq!(OwnerIdentity::resolve(None, None), None);
        assert_eq!(OwnerIdentity::resolve(None, Some("   ")), None);
    }

    #[test]
    fn line_total_is_quantity_times_unit_price() {
        assert_eq!(line_total(4, 2.25), 9.0);
        assert_eq!(line_total(0, 9.90), 0.0);
        assert_eq!(line_total(3, 0.0), 0.0);
        assert!((line_total(5, 9.90) - 49.5).abs() < 1e-9);
    }

    #[test]
    fn cart_total_sums_line_totals() {
        let lines = vec![line(1, 4, 2.25), line(2, 2, 12.50)];
        assert_eq!(cart_total(&lines), 9.0 + 25.0);
        assert_eq!(cart_total(&[]), 0.0);
    }

    #[test]
    fn cart_actions_parse_exhaustively() {
        assert_eq!("add".parse(), Ok(CartAction::Add));
        assert_eq!("get".parse(), Ok(CartAction::Get));
        assert_eq!("delete".parse(), Ok(CartAction::Delete));
        assert_eq!("clear".parse(), Ok(CartAction::Clear));
        assert_eq!("validation".parse(), Ok(CartAction::Validation));
        assert_eq!("checkout".parse::<CartAction>(), Err(()));
        assert_eq!("ADD".parse::<CartAction>(), Err(()));
    }
}
