//! Inbound user events and outbound renders exchanged with the chat transport.

use super::{ProductId, UserId};
use crate::error::BotError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Prefix marking an address that was captured from a shared location.
pub const LOCATION_PREFIX: &str = "Location:";

pub const MENU_LABEL: &str = "🍞 Menu";
pub const CART_LABEL: &str = "🛒 Cart";
pub const ORDER_LABEL: &str = "📦 Order";
pub const HELP_LABEL: &str = "❓ Help";
pub const SEND_LOCATION_LABEL: &str = "📍 Send location";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Formats the location as a checkout address.
    pub fn to_address(&self) -> String {
        format!("{} {}", LOCATION_PREFIX, self)
    }

    /// Recovers coordinates from an address produced by [`Location::to_address`].
    pub fn from_address(address: &str) -> Option<Self> {
        address.strip_prefix(LOCATION_PREFIX)?.trim().parse().ok()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

impl FromStr for Location {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BotError::InvalidEvent(format!("invalid location: {s:?}"));
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let lat = lat.trim().parse().map_err(|_| invalid())?;
        let lon = lon.trim().parse().map_err(|_| invalid())?;
        Ok(Self { lat, lon })
    }
}

/// Payment proof submitted by a user, referenced by the transport's file id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proof {
    Photo(String),
    Document(String),
}

impl Proof {
    pub fn file_id(&self) -> &str {
        match self {
            Proof::Photo(id) | Proof::Document(id) => id,
        }
    }
}

/// Inline button payloads.
///
/// The string form is the callback data carried by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add(ProductId),
    Increase(ProductId),
    Decrease(ProductId),
    MenuIncrease(ProductId),
    MenuDecrease(ProductId),
    OpenCart,
    ClearCart,
    Checkout,
    ConfirmOrder,
    CancelOrder,
    PayNow,
    SendProof,
    ShowCartImages,
    Noop,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Add(id) => write!(f, "add_{id}"),
            Action::Increase(id) => write!(f, "inc|{id}"),
            Action::Decrease(id) => write!(f, "dec|{id}"),
            Action::MenuIncrease(id) => write!(f, "incmenu|{id}"),
            Action::MenuDecrease(id) => write!(f, "decmenu|{id}"),
            Action::OpenCart => f.write_str("cart"),
            Action::ClearCart => f.write_str("clear_cart"),
            Action::Checkout => f.write_str("go_checkout"),
            Action::ConfirmOrder => f.write_str("confirm_order"),
            Action::CancelOrder => f.write_str("cancel_order"),
            Action::PayNow => f.write_str("pay_now"),
            Action::SendProof => f.write_str("send_check"),
            Action::ShowCartImages => f.write_str("show_cart_images"),
            Action::Noop => f.write_str("noop"),
        }
    }
}

impl FromStr for Action {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let product = |raw: &str| {
            raw.parse::<ProductId>()
                .map_err(|_| BotError::InvalidEvent(format!("invalid product id in {s:?}")))
        };

        if let Some(id) = s.strip_prefix("add_") {
            return Ok(Action::Add(product(id)?));
        }
        if let Some((verb, id)) = s.split_once('|') {
            let id = product(id)?;
            return match verb {
                "inc" => Ok(Action::Increase(id)),
                "dec" => Ok(Action::Decrease(id)),
                "incmenu" => Ok(Action::MenuIncrease(id)),
                "decmenu" => Ok(Action::MenuDecrease(id)),
                _ => Err(BotError::InvalidEvent(format!("unknown action: {s:?}"))),
            };
        }

        match s {
            "cart" => Ok(Action::OpenCart),
            "clear_cart" => Ok(Action::ClearCart),
            "go_checkout" => Ok(Action::Checkout),
            "confirm_order" => Ok(Action::ConfirmOrder),
            "cancel_order" => Ok(Action::CancelOrder),
            "pay_now" => Ok(Action::PayNow),
            "send_check" => Ok(Action::SendProof),
            "show_cart_images" => Ok(Action::ShowCartImages),
            "noop" | "none" => Ok(Action::Noop),
            _ => Err(BotError::InvalidEvent(format!("unknown action: {s:?}"))),
        }
    }
}

/// Slash commands and their reply-keyboard equivalents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Menu,
    Cart,
    Clear,
    Checkout,
    Cancel,
    Help,
}

impl Command {
    /// Recognizes `/command`, `/command@botname` and reply-keyboard labels.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        match text {
            MENU_LABEL => return Some(Command::Menu),
            CART_LABEL => return Some(Command::Cart),
            ORDER_LABEL => return Some(Command::Checkout),
            HELP_LABEL => return Some(Command::Help),
            _ => {}
        }

        let name = text.strip_prefix('/')?;
        let name = name.split_whitespace().next()?;
        let name = name.split('@').next()?;
        match name {
            "start" => Some(Command::Start),
            "menu" => Some(Command::Menu),
            "cart" => Some(Command::Cart),
            "clear" => Some(Command::Clear),
            "checkout" => Some(Command::Checkout),
            "cancel" => Some(Command::Cancel),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Text(String),
    Location(Location),
    Photo { file_id: String },
    Document { file_id: String },
    Button(Action),
}

/// Something a user did, as reported by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub user: UserId,
    pub handle: Option<String>,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn new(user: UserId, kind: EventKind) -> Self {
        Self {
            user,
            handle: None,
            kind,
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn text(user: UserId, text: impl Into<String>) -> Self {
        Self::new(user, EventKind::Text(text.into()))
    }

    pub fn button(user: UserId, action: Action) -> Self {
        Self::new(user, EventKind::Button(action))
    }

    pub fn location(user: UserId, lat: f64, lon: f64) -> Self {
        Self::new(user, EventKind::Location(Location::new(lat, lon)))
    }

    pub fn photo(user: UserId, file_id: impl Into<String>) -> Self {
        Self::new(
            user,
            EventKind::Photo {
                file_id: file_id.into(),
            },
        )
    }

    pub fn document(user: UserId, file_id: impl Into<String>) -> Self {
        Self::new(
            user,
            EventKind::Document {
                file_id: file_id.into(),
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub action: Action,
}

impl Choice {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Buttons attached to the message.
    Inline(Vec<Vec<Choice>>),
    /// Persistent reply keyboard with the main menu labels.
    MainMenu,
    /// One-time reply keyboard asking for the user's location.
    RequestLocation,
    /// Hides the reply keyboard.
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumItem {
    pub path: PathBuf,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderBody {
    Text(String),
    Photo { path: PathBuf, caption: String },
    Album(Vec<AlbumItem>),
}

/// Outbound message for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Render {
    pub user: UserId,
    pub body: RenderBody,
    pub keyboard: Option<Keyboard>,
}

impl Render {
    pub fn text(user: UserId, text: impl Into<String>) -> Self {
        Self {
            user,
            body: RenderBody::Text(text.into()),
            keyboard: None,
        }
    }

    pub fn photo(user: UserId, path: PathBuf, caption: impl Into<String>) -> Self {
        Self {
            user,
            body: RenderBody::Photo {
                path,
                caption: caption.into(),
            },
            keyboard: None,
        }
    }

    pub fn album(user: UserId, items: Vec<AlbumItem>) -> Self {
        Self {
            user,
            body: RenderBody::Album(items),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Message text or photo caption.
    pub fn caption(&self) -> Option<&str> {
        match &self.body {
            RenderBody::Text(text) => Some(text),
            RenderBody::Photo { caption, .. } => Some(caption),
            RenderBody::Album(_) => None,
        }
    }
}
