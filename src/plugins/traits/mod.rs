pub mod notifier;

pub use notifier::{Notifier, NotificationEvent, NotificationResult, ProductInfo};

#[cfg(test)]
pub use notifier::MockNotifier;
