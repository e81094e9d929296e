//! Application layer: the per-user dialogue and the services it drives.
//!
//! `OrderBot` is the entry point. It routes each inbound event through the
//! user's session, mutates the `CartStore`, commits finished checkouts through
//! the `OrderCommitter` and hands operator notifications to the
//! `NotificationRelay`.

pub mod bot;
pub mod cart_store;
pub mod committer;
pub mod registry;
pub mod relay;
pub mod render;
pub mod session_store;
