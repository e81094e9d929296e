use crate::domain::event::{Location, Proof};
use crate::domain::ports::OperatorChannel;
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Operator channel that writes every notification to the `operator` log target.
///
/// Used when no chat transport is attached; the configured operator chat id is
/// carried along so log lines can be routed by whoever tails them.
#[derive(Debug, Default, Clone)]
pub struct LogOperatorChannel {
    chat_id: Option<i64>,
}

impl LogOperatorChannel {
    pub fn new(chat_id: Option<i64>) -> Self {
        Self { chat_id }
    }
}

#[async_trait]
impl OperatorChannel for LogOperatorChannel {
    async fn send(&self, message: &str) -> Result<()> {
        info!(target: "operator", chat_id = ?self.chat_id, "{}", message);
        Ok(())
    }

    async fn send_location(&self, location: Location) -> Result<()> {
        info!(
            target: "operator",
            chat_id = ?self.chat_id,
            lat = location.lat,
            lon = location.lon,
            "location"
        );
        Ok(())
    }

    async fn send_proof(&self, proof: &Proof, caption: &str) -> Result<()> {
        let kind = match proof {
            Proof::Photo(_) => "photo",
            Proof::Document(_) => "document",
        };
        info!(
            target: "operator",
            chat_id = ?self.chat_id,
            kind,
            file_id = proof.file_id(),
            "{}",
            caption
        );
        Ok(())
    }
}
