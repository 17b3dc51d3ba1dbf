use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::AlertKind;
use crate::utils::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub kind: AlertKind,
    pub product: ProductInfo,
    /// Indicator that triggered a stock alert, if any.
    pub matched: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl NotificationEvent {
    pub fn new(kind: AlertKind, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            product: ProductInfo {
                name: name.into(),
                url: url.into(),
            },
            matched: None,
        }
    }

    pub fn with_matched(mut self, matched: Option<String>) -> Self {
        self.matched = matched;
        self
    }

    /// Plain-text message body.
    pub fn message(&self) -> String {
        let ProductInfo { name, url } = &self.product;
        match self.kind {
            AlertKind::DeliveryUnavailable => format!(
                "🚚 DELIVERY NOT AVAILABLE\n\n📦 Product: {}\n❌ Delivery Not Available for your pincode\n🔗 {}\n\n⏳ Monitoring... Will notify when delivery becomes available!",
                name, url
            ),
            AlertKind::DeliveryRestored => format!(
                "✅ DELIVERY NOW AVAILABLE!\n\n📦 Product: {}\n🚚 Delivery is now available for your pincode\n🔗 {}\n\n✨ You can now purchase this product!",
                name, url
            ),
            AlertKind::InStock => format!(
                "✅ STOCK ALERT: {}\n🎉 Product is in stock!\n{}",
                name, url
            ),
        }
    }
}

/// Delivery channel for availability alerts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    fn plugin_type(&self) -> &'static str;

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult>;
}
