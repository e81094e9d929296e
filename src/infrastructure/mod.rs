//! Adapters implementing the domain ports.

pub mod in_memory;
pub mod operator_log;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
