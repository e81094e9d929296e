//! Deterministic rendering of user and operator messages.

use super::committer::PlacedOrder;
use crate::domain::cart::CartSnapshot;
use crate::domain::catalog::{Catalog, Product};
use crate::domain::event::{Action, Choice, Keyboard};
use crate::error::BotError;

pub const CURRENCY: &str = "UZS";

pub const GREETING: &str = "👋 Hello!\n\nPlease enter your name:";
pub const LOCATION_THANKS: &str =
    "Thank you! Your location has been received ✅\n\nYou can now choose from the menu 👇";
pub const PHONE_PROMPT: &str = "📞 Enter your phone number:";
pub const ADDRESS_PROMPT: &str = "📍 Enter your address or share your location:";
pub const ORDER_CANCELLED: &str = "❌ Order cancelled. Your cart is still saved.";
pub const NOTHING_TO_CANCEL: &str = "There is nothing to cancel.";
pub const CART_CLEARED: &str = "🗑️ Cart cleared.";
pub const MENU_EMPTY: &str = "The menu is not available right now.";
pub const CHOOSE: &str = "Choose:";
pub const PROOF_PROMPT: &str = "📤 Send the payment receipt (as a photo or a document).";
pub const PROOF_RECEIVED: &str =
    "✅ Receipt received!\n👤 Our operators will check it.\n😊 Thank you for your order!";
pub const MAIN_MENU: &str = "🏠 Main menu:";
pub const NO_PICTURES: &str = "No pictures found.";
pub const ACKNOWLEDGE: &str = "🙂 Got it. Use the menu below to continue.";
pub const HELP: &str = "/menu — menu\n\
                        /cart — cart\n\
                        /clear — clear the cart\n\
                        /checkout — place an order\n\
                        /cancel — cancel the order";

/// Formats an amount with space-separated thousands, e.g. `25 000 UZS`.
pub fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{} {}", grouped, CURRENCY)
}

pub fn cart_text(cart: &CartSnapshot, catalog: &Catalog) -> String {
    if cart.is_empty() {
        return "Your cart is empty 🛒".to_string();
    }
    let mut lines = vec!["🛒 Your cart:\n".to_string()];
    for (id, quantity) in cart.iter() {
        if let Ok(product) = catalog.lookup(id) {
            lines.push(format!(
                "• {} x{} — {}",
                product.name,
                quantity,
                format_price(product.price.saturating_mul(u64::from(quantity)))
            ));
        }
    }
    lines.push(format!("\nTotal: {}", format_price(cart.total(catalog))));
    lines.join("\n")
}

/// Caption of a menu card, always showing how many units are in the cart.
pub fn product_caption(product: &Product, in_cart: u32) -> String {
    format!(
        "*{}*\n{}\n\nPrice: {}\nIn cart: {} pcs",
        product.name,
        product.description,
        format_price(product.price),
        in_cart
    )
}

pub fn product_keyboard(product: &Product, in_cart: u32) -> Keyboard {
    let middle = if in_cart == 0 {
        Choice::new("Add", Action::Add(product.id))
    } else {
        Choice::new(format!("{} pcs", in_cart), Action::Noop)
    };
    Keyboard::Inline(vec![vec![
        Choice::new("➖", Action::MenuDecrease(product.id)),
        middle,
        Choice::new("➕", Action::MenuIncrease(product.id)),
    ]])
}

pub fn cart_keyboard(cart: &CartSnapshot, catalog: &Catalog) -> Keyboard {
    let mut rows: Vec<Vec<Choice>> = cart
        .iter()
        .filter_map(|(id, quantity)| {
            let product = catalog.lookup(id).ok()?;
            Some(vec![
                Choice::new("➖", Action::Decrease(id)),
                Choice::new(format!("{} — {}", product.name, quantity), Action::Noop),
                Choice::new("➕", Action::Increase(id)),
            ])
        })
        .collect();
    rows.push(vec![
        Choice::new("🗑️ Clear", Action::ClearCart),
        Choice::new("✅ Order", Action::Checkout),
    ]);
    rows.push(vec![Choice::new("🖼 Pictures", Action::ShowCartImages)]);
    Keyboard::Inline(rows)
}

pub fn confirmation_text(
    cart: &CartSnapshot,
    catalog: &Catalog,
    phone: &str,
    address: &str,
) -> String {
    format!(
        "📦 *Order details:*\n\n{}\n\n📞 {}\n📍 {}\n\nDo you confirm?",
        cart_text(cart, catalog),
        phone,
        address
    )
}

pub fn confirmation_keyboard() -> Keyboard {
    Keyboard::Inline(vec![vec![
        Choice::new("Confirm ✅", Action::ConfirmOrder),
        Choice::new("Cancel ❌", Action::CancelOrder),
    ]])
}

pub fn payment_text(order_id: u64, card: &str) -> String {
    format!(
        "✅ Your order has been accepted!\n\n🆔 Order number: #{}\n\n\
         💳 Card number for payment:\n{}\n\n\
         After paying, send the receipt.\nPress the button below:",
        order_id, card
    )
}

pub fn payment_keyboard() -> Keyboard {
    Keyboard::Inline(vec![vec![Choice::new(
        "📤 Send receipt",
        Action::SendProof,
    )]])
}

pub fn operator_summary(
    order: &PlacedOrder,
    handle: Option<&str>,
    phone: &str,
    address: &str,
) -> String {
    let mut lines = vec![
        format!("🆔 Order number: #{}", order.id),
        "📦 New order!\n".to_string(),
    ];
    for line in &order.lines {
        lines.push(format!(
            "• {} x{} — {}",
            line.name,
            line.quantity,
            format_price(line.subtotal())
        ));
    }
    lines.push(format!("\n💰 Total: {}", format_price(order.total)));
    lines.push(format!("📞 {}", phone));
    lines.push(format!("📍 {}", address));
    lines.push(format!("👤 @{}", handle.unwrap_or("unknown")));
    lines.join("\n")
}

pub fn welcome(name: &str) -> String {
    format!("😊 Welcome, {}!\n\n📍 Now share your location:", name)
}

/// User-facing text for an error surfaced by the cart or the committer.
pub fn error_text(err: &BotError) -> &'static str {
    match err {
        BotError::UnknownProduct(_) => "Sorry, this item is unavailable.",
        BotError::EmptyCart => "Your cart is empty!",
        BotError::StorageError(_) => {
            "⚠️ We could not save your order. Please press Confirm again."
        }
        _ => "⚠️ Something went wrong. Please try again.",
    }
}
