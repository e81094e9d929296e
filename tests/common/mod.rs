#![allow(dead_code)]

use async_trait::async_trait;
use checkout_bot::application::bot::{BotSettings, OrderBot};
use checkout_bot::domain::OrderId;
use checkout_bot::domain::catalog::{Catalog, Product};
use checkout_bot::domain::event::{Action, InboundEvent, Location, Proof, Render};
use checkout_bot::domain::order::{Order, OrderHeader, OrderLine};
use checkout_bot::domain::ports::{OperatorChannel, OrderStore, OrderUnit};
use checkout_bot::domain::UserId;
use checkout_bot::error::{BotError, Result};
use checkout_bot::infrastructure::in_memory::{InMemoryOperatorChannel, InMemoryOrderStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const PHONE: &str = "+998901234567";
pub const ADDRESS: &str = "Tashkent, street 1";

/// Two products: A (id 1) at 10 000 and B (id 2) at 5 000.
pub fn sample_catalog() -> Catalog {
    Catalog::from_products(vec![
        Product {
            id: 1,
            name: "A".to_string(),
            description: "First".to_string(),
            price: 10000,
            image: None,
        },
        Product {
            id: 2,
            name: "B".to_string(),
            description: "Second".to_string(),
            price: 5000,
            image: None,
        },
    ])
}

pub fn build_bot(
    store: impl OrderStore + 'static,
    channel: impl OperatorChannel + 'static,
) -> OrderBot {
    OrderBot::new(
        Arc::new(sample_catalog()),
        Box::new(store),
        Box::new(channel),
        BotSettings::default(),
    )
}

/// A bot backed by in-memory adapters, with handles to inspect them.
pub fn in_memory_bot() -> (OrderBot, InMemoryOrderStore, InMemoryOperatorChannel) {
    let store = InMemoryOrderStore::new();
    let channel = InMemoryOperatorChannel::new();
    let bot = build_bot(store.clone(), channel.clone());
    (bot, store, channel)
}

/// Fills the cart with 2 x A and 1 x B (total 25 000).
pub async fn fill_cart(bot: &OrderBot, user: UserId) {
    bot.handle(InboundEvent::button(user, Action::Add(1))).await;
    bot.handle(InboundEvent::button(user, Action::Increase(1)))
        .await;
    bot.handle(InboundEvent::button(user, Action::Add(2))).await;
}

/// Drives the dialogue from an idle session up to the confirmation prompt.
pub async fn reach_confirmation(bot: &OrderBot, user: UserId) {
    bot.handle(InboundEvent::text(user, "/checkout")).await;
    bot.handle(InboundEvent::text(user, PHONE)).await;
    bot.handle(InboundEvent::text(user, ADDRESS)).await;
}

pub async fn confirm(bot: &OrderBot, user: UserId) -> Vec<Render> {
    bot.handle(InboundEvent::button(user, Action::ConfirmOrder).with_handle("tester"))
        .await
}

pub fn captions(renders: &[Render]) -> Vec<String> {
    renders
        .iter()
        .filter_map(Render::caption)
        .map(str::to_string)
        .collect()
}

/// Order store whose write units fail on line items a fixed number of times,
/// after the header has already been staged and an id reserved.
#[derive(Clone)]
pub struct FlakyOrderStore {
    inner: InMemoryOrderStore,
    failures_left: Arc<AtomicUsize>,
}

impl FlakyOrderStore {
    pub fn new(failures: usize) -> Self {
        Self {
            inner: InMemoryOrderStore::new(),
            failures_left: Arc::new(AtomicUsize::new(failures)),
        }
    }

    pub fn inner(&self) -> &InMemoryOrderStore {
        &self.inner
    }
}

#[async_trait]
impl OrderStore for FlakyOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderUnit>> {
        let fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        Ok(Box::new(FlakyUnit {
            inner: self.inner.begin().await?,
            fail,
        }))
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        self.inner.get(order_id).await
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        self.inner.all_orders().await
    }
}

struct FlakyUnit {
    inner: Box<dyn OrderUnit>,
    fail: bool,
}

#[async_trait]
impl OrderUnit for FlakyUnit {
    async fn append_order(&mut self, header: OrderHeader) -> Result<OrderId> {
        self.inner.append_order(header).await
    }

    async fn append_line_items(&mut self, order_id: OrderId, items: Vec<OrderLine>) -> Result<()> {
        if self.fail {
            return Err(BotError::storage("disk full"));
        }
        self.inner.append_line_items(order_id, items).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.inner.commit().await
    }
}

/// Operator channel that rejects every delivery.
#[derive(Clone, Default)]
pub struct UnreachableChannel {
    attempts: Arc<AtomicUsize>,
}

impl UnreachableChannel {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn refuse(&self) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(BotError::NotificationError("chat not found".to_string()))
    }
}

#[async_trait]
impl OperatorChannel for UnreachableChannel {
    async fn send(&self, _message: &str) -> Result<()> {
        self.refuse()
    }

    async fn send_location(&self, _location: Location) -> Result<()> {
        self.refuse()
    }

    async fn send_proof(&self, _proof: &Proof, _caption: &str) -> Result<()> {
        self.refuse()
    }
}
