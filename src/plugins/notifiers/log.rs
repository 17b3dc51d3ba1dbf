use crate::plugins::traits::{Notifier, NotificationEvent, NotificationResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Writes alerts to the log instead of sending them. Used when no Telegram
/// credentials are configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        LogNotifier
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn plugin_type(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult> {
        info!(kind = ?event.kind, url = %event.product.url, "Alert (not sent):\n{}", event.message());
        Ok(NotificationResult {
            success: true,
            message_id: None,
            error: None,
        })
    }
}
