use crate::domain::OrderId;
use crate::domain::event::{Location, Proof};
use crate::domain::order::{Order, OrderHeader, OrderLine};
use crate::domain::ports::{OperatorChannel, OrderStore, OrderUnit};
use crate::error::{BotError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

#[derive(Debug, Default)]
struct Ledger {
    last_id: OrderId,
    orders: BTreeMap<OrderId, Order>,
}

/// A thread-safe in-memory order store.
///
/// The whole ledger sits behind one `Arc<Mutex<_>>`. A write unit owns the lock
/// until it commits or is dropped, which serializes identifier assignment and keeps
/// half-written orders invisible to readers.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    ledger: Arc<Mutex<Ledger>>,
}

impl InMemoryOrderStore {
    /// Creates a new, empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderUnit>> {
        let ledger = self.ledger.clone().lock_owned().await;
        Ok(Box::new(InMemoryOrderUnit {
            ledger,
            staged: None,
        }))
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.orders.get(&order_id).cloned())
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.orders.values().cloned().collect())
    }
}

/// Write unit holding the ledger lock and the rows staged so far.
pub struct InMemoryOrderUnit {
    ledger: OwnedMutexGuard<Ledger>,
    staged: Option<Order>,
}

#[async_trait]
impl OrderUnit for InMemoryOrderUnit {
    async fn append_order(&mut self, header: OrderHeader) -> Result<OrderId> {
        if self.staged.is_some() {
            return Err(BotError::storage("order header already staged in this unit"));
        }
        let id = self.ledger.last_id + 1;
        self.staged = Some(Order {
            id,
            header,
            items: Vec::new(),
        });
        Ok(id)
    }

    async fn append_line_items(&mut self, order_id: OrderId, items: Vec<OrderLine>) -> Result<()> {
        match self.staged.as_mut() {
            Some(order) if order.id == order_id => {
                order.items.extend(items);
                Ok(())
            }
            _ => Err(BotError::storage(format!(
                "order {} is not staged in this unit",
                order_id
            ))),
        }
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        let order = self
            .staged
            .take()
            .ok_or_else(|| BotError::storage("nothing staged to commit"))?;
        self.ledger.last_id = order.id;
        self.ledger.orders.insert(order.id, order);
        Ok(())
    }
}

/// Message delivered to an [`InMemoryOperatorChannel`].
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorMessage {
    Text(String),
    Location(Location),
    Proof { proof: Proof, caption: String },
}

/// Operator channel that records every delivery. Clones share the same log.
#[derive(Default, Clone)]
pub struct InMemoryOperatorChannel {
    messages: Arc<RwLock<Vec<OperatorMessage>>>,
}

impl InMemoryOperatorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<OperatorMessage> {
        self.messages.read().await.clone()
    }
}

#[async_trait]
impl OperatorChannel for InMemoryOperatorChannel {
    async fn send(&self, message: &str) -> Result<()> {
        let mut messages = self.messages.write().await;
        messages.push(OperatorMessage::Text(message.to_string()));
        Ok(())
    }

    async fn send_location(&self, location: Location) -> Result<()> {
        let mut messages = self.messages.write().await;
        messages.push(OperatorMessage::Location(location));
        Ok(())
    }

    async fn send_proof(&self, proof: &Proof, caption: &str) -> Result<()> {
        let mut messages = self.messages.write().await;
        messages.push(OperatorMessage::Proof {
            proof: proof.clone(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use chrono::Utc;

    fn header(user_id: i64, total: u64) -> OrderHeader {
        OrderHeader {
            user_id,
            user_handle: None,
            phone: "+998901234567".to_string(),
            address: "Tashkent".to_string(),
            total,
            status: OrderStatus::New,
            created_at: Utc::now(),
        }
    }

    fn line(product_id: u32, quantity: u32) -> OrderLine {
        OrderLine {
            product_id,
            name: format!("item-{}", product_id),
            price: 1000,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_commit_makes_order_visible() {
        let store = InMemoryOrderStore::new();

        let mut unit = store.begin().await.unwrap();
        let id = unit.append_order(header(1, 2000)).await.unwrap();
        unit.append_line_items(id, vec![line(1, 2)]).await.unwrap();
        unit.commit().await.unwrap();

        let order = store.get(id).await.unwrap().unwrap();
        assert_eq!(order.id, 1);
        assert_eq!(order.items, vec![line(1, 2)]);
        assert!(store.get(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dropped_unit_leaves_nothing() {
        let store = InMemoryOrderStore::new();

        let mut unit = store.begin().await.unwrap();
        let id = unit.append_order(header(1, 2000)).await.unwrap();
        drop(unit);

        assert!(store.get(id).await.unwrap().is_none());
        assert!(store.all_orders().await.unwrap().is_empty());

        // The reserved identifier is reused once the unit is abandoned.
        let mut unit = store.begin().await.unwrap();
        assert_eq!(unit.append_order(header(2, 1000)).await.unwrap(), id);
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = InMemoryOrderStore::new();
        for expected in 1..=3 {
            let mut unit = store.begin().await.unwrap();
            let id = unit.append_order(header(expected as i64, 0)).await.unwrap();
            unit.commit().await.unwrap();
            assert_eq!(id, expected);
        }
        let ids: Vec<_> = store
            .all_orders()
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_unit_rejects_foreign_order_id() {
        let store = InMemoryOrderStore::new();
        let mut unit = store.begin().await.unwrap();

        assert!(matches!(
            unit.append_line_items(5, vec![line(1, 1)]).await,
            Err(BotError::StorageError(_))
        ));
        let id = unit.append_order(header(1, 0)).await.unwrap();
        assert!(unit.append_order(header(1, 0)).await.is_err());
        assert!(unit.append_line_items(id + 1, vec![]).await.is_err());
    }

    #[tokio::test]
    async fn test_operator_channel_records_messages() {
        let channel = InMemoryOperatorChannel::new();
        channel.send("new order").await.unwrap();
        channel
            .send_location(Location::new(41.3, 69.2))
            .await
            .unwrap();
        channel
            .send_proof(&Proof::Photo("file-1".to_string()), "receipt")
            .await
            .unwrap();

        let messages = channel.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], OperatorMessage::Text("new order".to_string()));
        assert_eq!(
            messages[1],
            OperatorMessage::Location(Location::new(41.3, 69.2))
        );
    }
}
