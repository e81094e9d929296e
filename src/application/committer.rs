use crate::domain::cart::CartSnapshot;
use crate::domain::catalog::Catalog;
use crate::domain::order::{Order, OrderHeader, OrderLine, OrderStatus};
use crate::domain::ports::OrderStoreBox;
use crate::domain::{OrderId, UserId};
use crate::error::{BotError, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

/// Everything needed to turn a cart into an order.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub user: UserId,
    pub handle: Option<String>,
    pub cart: CartSnapshot,
    pub phone: String,
    pub address: String,
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub total: u64,
    pub lines: Vec<OrderLine>,
}

/// Writes finalized carts as orders.
///
/// Header and line items go through one [`crate::domain::ports::OrderUnit`]: if any
/// step fails the unit is dropped and nothing of the order is persisted, so the
/// caller can simply retry.
pub struct OrderCommitter {
    catalog: Arc<Catalog>,
    store: OrderStoreBox,
}

impl OrderCommitter {
    pub fn new(catalog: Arc<Catalog>, store: OrderStoreBox) -> Self {
        Self { catalog, store }
    }

    pub async fn commit(&self, request: CommitRequest) -> Result<PlacedOrder> {
        if request.cart.is_empty() {
            return Err(BotError::EmptyCart);
        }

        let lines = request
            .cart
            .iter()
            .map(|(product_id, quantity)| {
                self.catalog
                    .lookup(product_id)
                    .map(|product| OrderLine::capture(product, quantity))
            })
            .collect::<Result<Vec<_>>>()?;
        let total = lines
            .iter()
            .map(OrderLine::subtotal)
            .fold(0, u64::saturating_add);

        let header = OrderHeader {
            user_id: request.user,
            user_handle: request.handle,
            phone: request.phone,
            address: request.address,
            total,
            status: OrderStatus::New,
            created_at: Utc::now(),
        };

        let id = self.write(header, lines.clone()).await.map_err(|e| {
            error!(user = request.user, "order write failed: {}", e);
            match e {
                BotError::StorageError(_) => e,
                other => BotError::storage(other),
            }
        })?;

        info!(order_id = id, user = request.user, total, "order committed");
        Ok(PlacedOrder { id, total, lines })
    }

    async fn write(&self, header: OrderHeader, lines: Vec<OrderLine>) -> Result<OrderId> {
        let mut unit = self.store.begin().await?;
        let id = unit.append_order(header).await?;
        unit.append_line_items(id, lines).await?;
        unit.commit().await?;
        Ok(id)
    }

    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.store.all_orders().await
    }
}
