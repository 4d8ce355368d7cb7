use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

pub const VALID_BUFFET_TYPES: [&str; 3] = ["Classic", "Enhanced", "Deluxe"];

/// One selectable item within a buffet tier, with its pre-selection flag.
#[derive(Debug, Clone, Serialize)]
pub struct BuffetItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_default: bool,
}

#[derive(Debug, FromRow)]
struct BuffetItemRow {
    id: i64,
    name: String,
    description: Option<String>,
    is_default_included: bool,
}

#[derive(Debug, Deserialize)]
pub struct BuffetItemsRequest {
    pub action: Option<String>,
    pub buffet_type: Option<String>,
}

// Served whenever the catalog join comes back empty, so the app always has a
// menu to show. Availability over correctness; the lists are cumulative by
// tier.
const BASE_ITEMS: [(i64, &str, &str); 8] = [
    (1, "Sandwiches", "Mixed sandwich selection"),
    (2, "Quiche", "Freshly baked quiche"),
    (3, "Cocktail Sausages", "Mini cocktail sausages"),
    (4, "Sausage Rolls", "Homemade sausage rolls"),
    (5, "Pork Pies", "Traditional pork pies"),
    (6, "Scotch Eggs", "Fresh scotch eggs"),
    (7, "Tortillas/Dips", "Tortilla chips with dips"),
    (8, "Cakes", "Assorted cakes and desserts"),
];

const ENHANCED_ITEMS: [(i64, &str, &str); 5] = [
    (9, "Vegetable Sticks & Dips", "Fresh vegetable sticks with dips"),
    (10, "Cheese/Pineapple/Grapes", "Cheese and fruit platter"),
    (11, "Bread Sticks", "Crispy bread sticks"),
    (12, "Pickles", "Assorted pickles"),
    (13, "Coleslaw", "Fresh coleslaw"),
];

const DELUXE_ITEMS: [(i64, &str, &str); 5] = [
    (14, "Greek Salad", "Traditional Greek salad"),
    (15, "Potato Salad", "Creamy potato salad"),
    (16, "Tomato & Mozzarella Skewers", "Caprese skewers"),
    (17, "Fresh Vegetables", "Seasonal fresh vegetables"),
    (18, "Premium Dips", "Selection of premium dips"),
];

impl BuffetItem {
    /// Items for one buffet tier, joined with the default-inclusion flag.
    /// An empty join (e.g. seed data missing) falls back to the hardcoded
    /// catalog rather than returning an empty menu.
    pub async fn get_by_buffet_type(
        pool: &PgPool,
        buffet_type: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BuffetItemRow>(
            r#"
            SELECT mi.id, mi.name, mi.description, cmi.is_default_included
            FROM menu_item mi
            JOIN category_menu_item cmi ON cmi.menu_item_id = mi.id
            JOIN product_category pc ON pc.id = cmi.category_id
            WHERE pc.name ILIKE $1 AND pc.is_active = TRUE AND mi.is_active = TRUE
            ORDER BY mi.id
            "#,
        )
        .bind(buffet_type)
        .fetch_all(pool)
        .await?;

        if rows.is_empty() {
            return Ok(Self::fallback_items(buffet_type));
        }

        Ok(rows
            .into_iter()
            .map(|row| BuffetItem {
                id: row.id,
                name: row.name,
                description: row.description.unwrap_or_default(),
                is_default: row.is_default_included,
            })
            .collect())
    }

    pub fn fallback_items(buffet_type: &str) -> Vec<Self> {
        let mut entries: Vec<(i64, &str, &str)> = BASE_ITEMS.to_vec();
        if matches!(buffet_type, "Enhanced" | "Deluxe") {
            entries.extend_from_slice(&ENHANCED_ITEMS);
        }
        if buffet_type == "Deluxe" {
            entries.extend_from_slice(&DELUXE_ITEMS);
        }

        entries
            .into_iter()
            .map(|(id, name, description)| BuffetItem {
                id,
                name: name.to_string(),
                description: description.to_string(),
                is_default: true,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(items: &[BuffetItem]) -> HashSet<i64> {
        items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn fallback_tiers_are_cumulative() {
        let classic = BuffetItem::fallback_items("Classic");
        let enhanced = BuffetItem::fallback_items("Enhanced");
        let deluxe = BuffetItem::fallback_items("Deluxe");

        assert_eq!(classic.len(), 8);
        assert_eq!(enhanced.len(), 13);
        assert_eq!(deluxe.len(), 18);

        // Each tier is a strict superset of the one below.
        assert!(ids(&classic).is_subset(&ids(&enhanced)));
        assert!(enhanced.len() > classic.len());
        assert!(ids(&enhanced).is_subset(&ids(&deluxe)));
        assert!(deluxe.len() > enhanced.len());
    }

    #[test]
    fn fallback_items_are_all_preselected_with_unique_ids() {
        let deluxe = BuffetItem::fallback_items("Deluxe");
        assert!(deluxe.iter().all(|item| item.is_default));
        assert_eq!(ids(&deluxe).len(), deluxe.len());
    }

    #[test]
    fn fallback_preserves_original_catalog_entries() {
        let classic = BuffetItem::fallback_items("Classic");
        assert_eq!(classic[0].name, "Sandwiches");
        assert_eq!(classic[0].description, "Mixed sandwich selection");
        assert_eq!(classic[7].name, "Cakes");

        let deluxe = BuffetItem::fallback_items("Deluxe");
        assert_eq!(deluxe[13].name, "Greek Salad");
        assert_eq!(deluxe[17].name, "Premium Dips");
    }

    #[test]
    fn unknown_tier_falls_back_to_base_items() {
        assert_eq!(BuffetItem::fallback_items("Mystery").len(), 8);
    }
}
