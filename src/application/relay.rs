use crate::domain::OrderId;
use crate::domain::event::{Location, Proof};
use crate::domain::ports::OperatorChannelBox;
use crate::error::{BotError, Result};
use tracing::warn;

/// Best-effort forwarding to the operator channel.
///
/// Runs after an order is already durable, so failures are logged and swallowed.
pub struct NotificationRelay {
    channel: OperatorChannelBox,
}

impl NotificationRelay {
    pub fn new(channel: OperatorChannelBox) -> Self {
        Self { channel }
    }

    /// Sends an order summary, followed by the delivery point when one was shared.
    /// Returns whether everything was delivered.
    pub async fn notify(&self, summary: &str, location: Option<Location>) -> bool {
        match self.deliver_summary(summary, location).await {
            Ok(()) => true,
            Err(e) => {
                warn!("operator notification failed: {}", e);
                false
            }
        }
    }

    /// Forwards a payment proof tagged with the order it pays for.
    pub async fn forward_proof(&self, order_id: Option<OrderId>, proof: &Proof) -> bool {
        let caption = match order_id {
            Some(id) => format!("📥 New payment receipt for order #{}", id),
            None => "📥 New payment receipt".to_string(),
        };
        match self
            .channel
            .send_proof(proof, &caption)
            .await
            .map_err(Self::notification_error)
        {
            Ok(()) => true,
            Err(e) => {
                warn!(?order_id, "payment proof forwarding failed: {}", e);
                false
            }
        }
    }

    async fn deliver_summary(&self, summary: &str, location: Option<Location>) -> Result<()> {
        self.channel
            .send(summary)
            .await
            .map_err(Self::notification_error)?;
        if let Some(location) = location {
            self.channel
                .send_location(location)
                .await
                .map_err(Self::notification_error)?;
        }
        Ok(())
    }

    fn notification_error(err: BotError) -> BotError {
        match err {
            BotError::NotificationError(_) => err,
            other => BotError::NotificationError(other.to_string()),
        }
    }
}
