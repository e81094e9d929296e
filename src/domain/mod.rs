//! Domain model: catalog, carts, dialogue sessions, orders and the ports
//! the application layer talks to.

pub mod cart;
pub mod catalog;
pub mod event;
pub mod order;
pub mod ports;
pub mod session;

/// Transport-provided identity of a chat user.
pub type UserId = i64;
/// Catalog identifier of a product.
pub type ProductId = u32;
/// Sequential identifier assigned to an order at commit time.
pub type OrderId = u64;
