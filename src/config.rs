use crate::application::bot::{BotSettings, DEFAULT_PAYMENT_CARD};
use crate::domain::catalog::Catalog;
use crate::domain::ports::OrderStoreBox;
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryOrderStore;
use clap::Parser;
use std::path::PathBuf;

/// Runtime configuration. Options marked with an env name can also be supplied
/// through the environment.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct BotConfig {
    /// CSV file of inbound events to replay (user,handle,kind,payload)
    pub input: PathBuf,

    /// JSON menu file
    #[arg(long, env = "MENU_FILE", default_value = "menu.json")]
    pub menu: PathBuf,

    /// Directory holding product pictures
    #[arg(long, env = "IMAGES_DIR")]
    pub images_dir: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Chat id of the operator channel
    #[arg(long, env = "ADMIN_CHAT_ID")]
    pub operator_chat: Option<i64>,

    /// Card number shown in payment instructions
    #[arg(long, env = "PAYMENT_CARD", default_value = DEFAULT_PAYMENT_CARD)]
    pub payment_card: String,

    /// Write committed orders as CSV to this file when the replay ends
    #[arg(long)]
    pub orders_out: Option<PathBuf>,
}

impl BotConfig {
    pub fn settings(&self) -> BotSettings {
        BotSettings {
            payment_card: self.payment_card.clone(),
        }
    }

    /// Loads the menu; a missing or malformed file yields an empty catalog.
    pub fn catalog(&self) -> Catalog {
        let catalog = Catalog::load(&self.menu);
        match &self.images_dir {
            Some(dir) => catalog.with_images_dir(dir),
            None => catalog,
        }
    }

    /// Opens the order store: RocksDB when `--db-path` is given and the
    /// `storage-rocksdb` feature is enabled, in-memory otherwise.
    pub fn order_store(&self) -> Result<OrderStoreBox> {
        match &self.db_path {
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => Ok(Box::new(
                crate::infrastructure::rocksdb::RocksDBStore::open(path)?,
            )),
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
                );
                Ok(Box::new(InMemoryOrderStore::new()))
            }
            None => Ok(Box::new(InMemoryOrderStore::new())),
        }
    }
}
