use crate::domain::ProductId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Notification error: {0}")]
    NotificationError(String),
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl BotError {
    /// Wraps any failure raised while writing an order unit.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageError(err.to_string())
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BotError {
    fn from(err: rocksdb::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
