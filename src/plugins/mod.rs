pub mod traits;
pub mod notifiers;

pub use notifiers::{LogNotifier, TelegramNotifier};
pub use traits::{Notifier, NotificationEvent, NotificationResult};
