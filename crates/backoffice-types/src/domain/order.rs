use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An order with its line items embedded. The relational backend keeps the
/// items in their own table; reads always return them together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderDraft {
    pub customer_id: i64,
    pub items: Vec<OrderItemDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderItemDraft {
    pub product_id: i64,
    pub quantity: i64,
}

impl OrderDraft {
    /// Quantities must be positive; referenced ids are left to the store's
    /// constraints.
    pub fn validate(&self) -> anyhow::Result<()> {
        for item in &self.items {
            if item.quantity <= 0 {
                anyhow::bail!("item quantity must be > 0");
            }
        }
        Ok(())
    }
}
