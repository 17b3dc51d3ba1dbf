//! Flow behind `get-chat-id`: wait for the user to message the bot, then
//! read the chat back from `getUpdates`.

use crate::add_product::Prompter;
use crate::plugins::notifiers::{ChatInfo, TelegramNotifier};
use crate::utils::error::{AppError, Result};

pub const PAUSE_MESSAGE: &str = "Press Enter after you have sent a message to the bot";

/// Blocks on `prompter` off the async runtime, then asks Telegram for the
/// latest chat. `None` skips the pause.
pub async fn wait_then_lookup<P>(notifier: &TelegramNotifier, prompter: Option<P>) -> Result<Option<ChatInfo>>
where
    P: Prompter + Send + 'static,
{
    if let Some(mut prompter) = prompter {
        tokio::task::spawn_blocking(move || prompter.input(PAUSE_MESSAGE))
            .await
            .map_err(|e| AppError::Internal(format!("Prompt task failed: {}", e)))??;
    }

    notifier.latest_chat().await
}
