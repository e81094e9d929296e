use super::catalog::Product;
use super::{OrderId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    New,
}

/// Order row written once at commit time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct OrderHeader {
    pub user_id: UserId,
    /// Transport handle of the user (e.g. `@username`), if any.
    pub user_handle: Option<String>,
    pub phone: String,
    pub address: String,
    pub total: u64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Point-in-time copy of a product inside an order.
///
/// Name and price are captured at commit so later menu edits never rewrite history.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: u64,
    pub quantity: u32,
}

impl OrderLine {
    pub fn capture(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
        }
    }

    pub fn subtotal(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}

/// A committed order with its line items.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Order {
    pub id: OrderId,
    #[serde(flatten)]
    pub header: OrderHeader,
    pub items: Vec<OrderLine>,
}

impl Order {
    pub fn items_total(&self) -> u64 {
        self.items
            .iter()
            .map(OrderLine::subtotal)
            .fold(0, u64::saturating_add)
    }
}
