use super::OrderId;
use super::event::{Location, Proof};
use super::order::{Order, OrderHeader, OrderLine};
use crate::error::Result;
use async_trait::async_trait;

/// One atomic order write.
///
/// Nothing appended to a unit is visible to readers until [`OrderUnit::commit`]
/// succeeds. Dropping a unit without committing discards everything it staged.
#[async_trait]
pub trait OrderUnit: Send {
    /// Stages the order header and returns the identifier reserved for it.
    async fn append_order(&mut self, header: OrderHeader) -> Result<OrderId>;
    /// Stages the line items of the order staged by this unit.
    async fn append_line_items(&mut self, order_id: OrderId, items: Vec<OrderLine>) -> Result<()>;
    /// Makes every staged row durable at once.
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Durable order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Opens a write unit. Units are serialized so identifiers never collide.
    async fn begin(&self) -> Result<Box<dyn OrderUnit>>;
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;
    /// Every committed order, by ascending identifier.
    async fn all_orders(&self) -> Result<Vec<Order>>;
}

/// Operator-facing notification channel. Best effort: callers never roll back on failure.
#[async_trait]
pub trait OperatorChannel: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
    async fn send_location(&self, location: Location) -> Result<()>;
    async fn send_proof(&self, proof: &Proof, caption: &str) -> Result<()>;
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type OperatorChannelBox = Box<dyn OperatorChannel>;
