use crate::domain::OrderId;
use crate::domain::order::{Order, OrderHeader, OrderLine};
use crate::domain::ports::{OrderStore, OrderUnit};
use crate::error::{BotError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Column Family for order headers, keyed by big-endian order id.
pub const CF_ORDERS: &str = "orders";
/// Column Family for line items, keyed by order id followed by the line index.
pub const CF_ORDER_ITEMS: &str = "order_items";
/// Column Family for store bookkeeping (the order sequence).
pub const CF_META: &str = "meta";

const LAST_ORDER_ID_KEY: &[u8] = b"last_order_id";

fn column<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| BotError::storage(format!("{} column family not found", name)))
}

fn item_key(order_id: OrderId, index: u32) -> [u8; 12] {
    let mut key = [0u8; 12];
    key[..8].copy_from_slice(&order_id.to_be_bytes());
    key[8..].copy_from_slice(&index.to_be_bytes());
    key
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| BotError::storage(format!("Serialization error: {}", e)))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| BotError::storage(format!("Deserialization error: {}", e)))
}

/// A persistent order store using RocksDB.
///
/// Headers, line items and the order sequence live in separate Column Families.
/// A write unit stages everything in one `WriteBatch`, so an order is written
/// whole or not at all. The async mutex around the last assigned id serializes
/// units across users.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    last_id: Arc<Mutex<OrderId>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path and recovers the
    /// order sequence from it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_ORDERS, CF_ORDER_ITEMS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        let last_id = match db.get_cf(column(&db, CF_META)?, LAST_ORDER_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| BotError::storage("corrupt order sequence"))?;
                OrderId::from_be_bytes(raw)
            }
            None => 0,
        };

        Ok(Self {
            db: Arc::new(db),
            last_id: Arc::new(Mutex::new(last_id)),
        })
    }

    fn load_items(&self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        let cf = column(&self.db, CF_ORDER_ITEMS)?;
        let prefix = order_id.to_be_bytes();
        let mut items = Vec::new();

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            items.push(decode(&value)?);
        }
        Ok(items)
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn begin(&self) -> Result<Box<dyn OrderUnit>> {
        let last_id = self.last_id.clone().lock_owned().await;
        Ok(Box::new(RocksDBOrderUnit {
            db: self.db.clone(),
            last_id,
            batch: WriteBatch::default(),
            staged: None,
        }))
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        let cf = column(&self.db, CF_ORDERS)?;
        let Some(bytes) = self.db.get_cf(cf, order_id.to_be_bytes())? else {
            return Ok(None);
        };
        let header: OrderHeader = decode(&bytes)?;
        let items = self.load_items(order_id)?;
        Ok(Some(Order {
            id: order_id,
            header,
            items,
        }))
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let cf = column(&self.db, CF_ORDERS)?;
        let mut orders = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let raw: [u8; 8] = key
                .as_ref()
                .try_into()
                .map_err(|_| BotError::storage("corrupt order key"))?;
            let id = OrderId::from_be_bytes(raw);
            orders.push(Order {
                id,
                header: decode(&value)?,
                items: self.load_items(id)?,
            });
        }

        Ok(orders)
    }
}

/// Write unit staging one order into a `WriteBatch`.
pub struct RocksDBOrderUnit {
    db: Arc<DB>,
    last_id: OwnedMutexGuard<OrderId>,
    batch: WriteBatch,
    staged: Option<(OrderId, u32)>,
}

#[async_trait]
impl OrderUnit for RocksDBOrderUnit {
    async fn append_order(&mut self, header: OrderHeader) -> Result<OrderId> {
        if self.staged.is_some() {
            return Err(BotError::storage("order header already staged in this unit"));
        }
        let id = *self.last_id + 1;
        let cf = column(&self.db, CF_ORDERS)?;
        self.batch.put_cf(cf, id.to_be_bytes(), encode(&header)?);
        self.batch
            .put_cf(column(&self.db, CF_META)?, LAST_ORDER_ID_KEY, id.to_be_bytes());
        self.staged = Some((id, 0));
        Ok(id)
    }

    async fn append_line_items(&mut self, order_id: OrderId, items: Vec<OrderLine>) -> Result<()> {
        let Some((staged_id, next_index)) = self.staged.as_mut() else {
            return Err(BotError::storage(format!(
                "order {} is not staged in this unit",
                order_id
            )));
        };
        if *staged_id != order_id {
            return Err(BotError::storage(format!(
                "order {} is not staged in this unit",
                order_id
            )));
        }

        let cf = column(&self.db, CF_ORDER_ITEMS)?;
        for line in &items {
            self.batch
                .put_cf(cf, item_key(order_id, *next_index), encode(line)?);
            *next_index += 1;
        }
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        let (id, _) = self
            .staged
            .ok_or_else(|| BotError::storage("nothing staged to commit"))?;
        let batch = std::mem::take(&mut self.batch);
        self.db.write(batch)?;
        *self.last_id = id;
        Ok(())
    }
}
