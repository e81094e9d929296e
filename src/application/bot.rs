use super::cart_store::CartStore;
use super::committer::{CommitRequest, OrderCommitter};
use super::relay::NotificationRelay;
use super::render;
use super::session_store::SessionStore;
use crate::domain::catalog::Catalog;
use crate::domain::event::{
    Action, AlbumItem, Command, EventKind, InboundEvent, Keyboard, Location, Proof, Render,
};
use crate::domain::order::Order;
use crate::domain::ports::{OperatorChannelBox, OrderStoreBox};
use crate::domain::session::{Session, Stage};
use crate::domain::{ProductId, UserId};
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Card number shown when none is configured.
pub const DEFAULT_PAYMENT_CARD: &str = "0000 0000 0000 0000";

#[derive(Debug, Clone)]
pub struct BotSettings {
    /// Card number users are asked to pay to.
    pub payment_card: String,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            payment_card: DEFAULT_PAYMENT_CARD.to_string(),
        }
    }
}

/// The order-taking dialogue.
///
/// Every event is handled while holding the sender's session guard, so one
/// user's events are applied strictly one after another (cart mutations and
/// the commit included) while other users proceed in parallel.
pub struct OrderBot {
    catalog: Arc<Catalog>,
    carts: CartStore,
    sessions: SessionStore,
    committer: OrderCommitter,
    relay: NotificationRelay,
    settings: BotSettings,
}

/// Renders produced while handling a single event.
struct Reply {
    user: UserId,
    renders: Vec<Render>,
}

impl Reply {
    fn new(user: UserId) -> Self {
        Self {
            user,
            renders: Vec::new(),
        }
    }

    fn text(&mut self, text: impl Into<String>) {
        self.renders.push(Render::text(self.user, text));
    }

    fn text_with(&mut self, text: impl Into<String>, keyboard: Keyboard) {
        self.renders
            .push(Render::text(self.user, text).with_keyboard(keyboard));
    }

    fn push(&mut self, render: Render) {
        self.renders.push(render);
    }
}

impl OrderBot {
    pub fn new(
        catalog: Arc<Catalog>,
        store: OrderStoreBox,
        channel: OperatorChannelBox,
        settings: BotSettings,
    ) -> Self {
        Self {
            carts: CartStore::new(catalog.clone()),
            sessions: SessionStore::new(),
            committer: OrderCommitter::new(catalog.clone(), store),
            relay: NotificationRelay::new(channel),
            catalog,
            settings,
        }
    }

    pub fn carts(&self) -> &CartStore {
        &self.carts
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Every committed order.
    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.committer.orders().await
    }

    /// Applies one inbound event and returns what should be sent back.
    pub async fn handle(&self, event: InboundEvent) -> Vec<Render> {
        let mut session = self.sessions.acquire(event.user).await;
        let mut reply = Reply::new(event.user);

        match &event.kind {
            EventKind::Text(text) => match Command::parse(text) {
                Some(command) => self.on_command(&mut session, command, &mut reply).await,
                None => self.on_text(&mut session, text, &mut reply).await,
            },
            EventKind::Location(location) => {
                self.on_location(&mut session, *location, &mut reply).await
            }
            EventKind::Photo { file_id } => {
                self.on_proof(&mut session, Proof::Photo(file_id.clone()), &mut reply)
                    .await
            }
            EventKind::Document { file_id } => {
                self.on_proof(&mut session, Proof::Document(file_id.clone()), &mut reply)
                    .await
            }
            EventKind::Button(action) => {
                self.on_action(&mut session, &event, *action, &mut reply)
                    .await
            }
        }

        reply.renders
    }

    async fn on_command(&self, session: &mut Session, command: Command, reply: &mut Reply) {
        match command {
            Command::Start if session.stage.in_checkout() => {
                self.out_of_turn(session, "start", reply)
            }
            Command::Start => {
                advance(reply.user, session, Stage::AwaitingDisplayName);
                reply.text(render::GREETING);
            }
            Command::Menu => self.show_menu(reply).await,
            Command::Cart => self.show_cart(reply).await,
            Command::Clear => {
                self.carts.clear(reply.user).await;
                reply.text(render::CART_CLEARED);
            }
            Command::Checkout => self.begin_checkout(session, reply).await,
            Command::Cancel => self.cancel(session, reply),
            Command::Help => reply.text(render::HELP),
        }
    }

    async fn on_text(&self, session: &mut Session, text: &str, reply: &mut Reply) {
        let value = text.trim().to_string();
        match session.stage {
            Stage::AwaitingDisplayName => {
                reply.text_with(render::welcome(&value), Keyboard::RequestLocation);
                session.fields.display_name = Some(value);
                advance(reply.user, session, Stage::AwaitingStartLocation);
            }
            Stage::AwaitingPhone => {
                session.fields.phone = Some(value);
                advance(reply.user, session, Stage::AwaitingAddress);
                reply.text_with(render::ADDRESS_PROMPT, Keyboard::RequestLocation);
            }
            Stage::AwaitingAddress => {
                session.fields.address = Some(value);
                self.ask_confirmation(session, reply).await;
            }
            _ => acknowledge(session, "text", reply),
        }
    }

    async fn on_location(&self, session: &mut Session, location: Location, reply: &mut Reply) {
        match session.stage {
            Stage::AwaitingStartLocation => {
                session.fields.start_location = Some(location.to_string());
                advance(reply.user, session, Stage::Idle);
                reply.text_with(render::LOCATION_THANKS, Keyboard::MainMenu);
            }
            Stage::AwaitingAddress => {
                session.fields.address = Some(location.to_address());
                self.ask_confirmation(session, reply).await;
            }
            Stage::Idle => reply.text_with(render::LOCATION_THANKS, Keyboard::MainMenu),
            _ => acknowledge(session, "location", reply),
        }
    }

    async fn on_proof(&self, session: &mut Session, proof: Proof, reply: &mut Reply) {
        if session.stage != Stage::AwaitingPaymentProof {
            acknowledge(session, "proof", reply);
            return;
        }

        self.relay.forward_proof(session.last_order, &proof).await;
        self.carts.clear(reply.user).await;
        info!(user = reply.user, order_id = ?session.last_order, "payment proof received");
        session.finish_checkout();

        reply.text_with(render::PROOF_RECEIVED, Keyboard::Remove);
        reply.text_with(render::MAIN_MENU, Keyboard::MainMenu);
    }

    async fn on_action(
        &self,
        session: &mut Session,
        event: &InboundEvent,
        action: Action,
        reply: &mut Reply,
    ) {
        match action {
            Action::Add(id) | Action::MenuIncrease(id) => {
                match self.carts.increment(reply.user, id).await {
                    Ok(_) => self.show_product(id, reply).await,
                    Err(e) => reply.text(render::error_text(&e)),
                }
            }
            Action::MenuDecrease(id) => {
                self.carts.decrement(reply.user, id).await;
                self.show_product(id, reply).await;
            }
            Action::Increase(id) => {
                if let Err(e) = self.carts.increment(reply.user, id).await {
                    reply.text(render::error_text(&e));
                }
                self.show_cart(reply).await;
            }
            Action::Decrease(id) => {
                self.carts.decrement(reply.user, id).await;
                self.show_cart(reply).await;
            }
            Action::OpenCart => self.show_cart(reply).await,
            Action::ClearCart => {
                self.carts.clear(reply.user).await;
                reply.text(render::CART_CLEARED);
                self.show_cart(reply).await;
            }
            Action::ShowCartImages => self.show_cart_images(reply).await,
            Action::Checkout => self.begin_checkout(session, reply).await,
            Action::ConfirmOrder if session.stage == Stage::AwaitingConfirmation => {
                self.confirm(session, event, reply).await
            }
            Action::CancelOrder => self.cancel(session, reply),
            Action::PayNow if session.stage == Stage::AwaitingPaymentProof => {
                if let Some(order_id) = session.last_order {
                    reply.text_with(
                        render::payment_text(order_id, &self.settings.payment_card),
                        render::payment_keyboard(),
                    );
                }
            }
            Action::SendProof if session.stage == Stage::AwaitingPaymentProof => {
                reply.text(render::PROOF_PROMPT);
            }
            Action::Noop => {}
            Action::ConfirmOrder | Action::PayNow | Action::SendProof => {
                acknowledge(session, "button", reply)
            }
        }
    }

    async fn begin_checkout(&self, session: &mut Session, reply: &mut Reply) {
        if session.stage != Stage::Idle {
            self.out_of_turn(session, "checkout", reply);
            return;
        }
        if self.carts.snapshot(reply.user).await.is_empty() {
            reply.text(render::error_text(&crate::error::BotError::EmptyCart));
            return;
        }
        advance(reply.user, session, Stage::AwaitingPhone);
        reply.text(render::PHONE_PROMPT);
    }

    async fn ask_confirmation(&self, session: &mut Session, reply: &mut Reply) {
        let cart = self.carts.snapshot(reply.user).await;
        let text = render::confirmation_text(
            &cart,
            &self.catalog,
            session.fields.phone.as_deref().unwrap_or_default(),
            session.fields.address.as_deref().unwrap_or_default(),
        );
        advance(reply.user, session, Stage::AwaitingConfirmation);
        reply.text_with(text, render::confirmation_keyboard());
    }

    /// Commits first, notifies second: a failed notification never undoes an order.
    async fn confirm(&self, session: &mut Session, event: &InboundEvent, reply: &mut Reply) {
        let phone = session.fields.phone.clone().unwrap_or_default();
        let address = session.fields.address.clone().unwrap_or_default();
        let request = CommitRequest {
            user: reply.user,
            handle: event.handle.clone(),
            cart: self.carts.snapshot(reply.user).await,
            phone: phone.clone(),
            address: address.clone(),
        };

        let placed = match self.committer.commit(request).await {
            Ok(placed) => placed,
            Err(e) => {
                warn!(user = reply.user, "checkout not committed: {}", e);
                reply.text(render::error_text(&e));
                return;
            }
        };

        self.carts.clear(reply.user).await;
        session.last_order = Some(placed.id);
        advance(reply.user, session, Stage::AwaitingPaymentProof);

        let summary =
            render::operator_summary(&placed, event.handle.as_deref(), &phone, &address);
        self.relay
            .notify(&summary, Location::from_address(&address))
            .await;

        reply.text_with(
            render::payment_text(placed.id, &self.settings.payment_card),
            render::payment_keyboard(),
        );
    }

    /// A request that would abandon the current stage. While a payment proof is
    /// pending the payment instructions are shown again.
    fn out_of_turn(&self, session: &Session, input: &str, reply: &mut Reply) {
        match (session.stage, session.last_order) {
            (Stage::AwaitingPaymentProof, Some(order_id)) => reply.text_with(
                render::payment_text(order_id, &self.settings.payment_card),
                render::payment_keyboard(),
            ),
            _ => acknowledge(session, input, reply),
        }
    }

    fn cancel(&self, session: &mut Session, reply: &mut Reply) {
        if session.stage.is_cancellable() {
            advance(reply.user, session, Stage::Idle);
            reply.text_with(render::ORDER_CANCELLED, Keyboard::MainMenu);
        } else {
            reply.text(render::NOTHING_TO_CANCEL);
        }
    }

    async fn show_menu(&self, reply: &mut Reply) {
        if self.catalog.is_empty() {
            reply.text(render::MENU_EMPTY);
            return;
        }
        let cart = self.carts.snapshot(reply.user).await;
        for product in self.catalog.products() {
            let in_cart = cart.quantity(product.id);
            let caption = render::product_caption(product, in_cart);
            let keyboard = render::product_keyboard(product, in_cart);
            match self.catalog.image_path(product) {
                Some(path) => {
                    reply.push(Render::photo(reply.user, path, caption).with_keyboard(keyboard))
                }
                None => {
                    reply.text(caption);
                    reply.text_with(render::CHOOSE, keyboard);
                }
            }
        }
    }

    /// Re-renders a single menu card with the live cart count.
    async fn show_product(&self, product_id: ProductId, reply: &mut Reply) {
        let product = match self.catalog.lookup(product_id) {
            Ok(product) => product,
            Err(e) => {
                reply.text(render::error_text(&e));
                return;
            }
        };
        let in_cart = self.carts.quantity(reply.user, product_id).await;
        reply.text_with(
            render::product_caption(product, in_cart),
            render::product_keyboard(product, in_cart),
        );
    }

    async fn show_cart(&self, reply: &mut Reply) {
        let cart = self.carts.snapshot(reply.user).await;
        reply.text_with(
            render::cart_text(&cart, &self.catalog),
            render::cart_keyboard(&cart, &self.catalog),
        );
    }

    async fn show_cart_images(&self, reply: &mut Reply) {
        let cart = self.carts.snapshot(reply.user).await;
        let items: Vec<AlbumItem> = cart
            .iter()
            .filter_map(|(id, quantity)| {
                let product = self.catalog.lookup(id).ok()?;
                let path = self.catalog.image_path(product)?;
                Some(AlbumItem {
                    path,
                    caption: format!("{} x{}", product.name, quantity),
                })
            })
            .collect();

        if items.is_empty() {
            reply.text(render::NO_PICTURES);
        } else {
            reply.push(Render::album(reply.user, items));
        }
    }
}

fn advance(user: UserId, session: &mut Session, next: Stage) {
    let previous = session.advance(next);
    debug!(user, ?previous, ?next, "stage transition");
}

fn acknowledge(session: &Session, input: &str, reply: &mut Reply) {
    debug!(user = reply.user, stage = ?session.stage, input, "unexpected input ignored");
    reply.text(render::ACKNOWLEDGE);
}
