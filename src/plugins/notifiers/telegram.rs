use crate::config::TelegramConfig;
use crate::plugins::traits::{Notifier, NotificationEvent, NotificationResult};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const PLUGIN_TYPE: &str = "telegram";

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub channel_post: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
    pub first_name: Option<String>,
}

/// Chat details printed by the chat-id helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    pub id: i64,
    pub chat_type: String,
    pub name: String,
}

impl From<&Chat> for ChatInfo {
    fn from(chat: &Chat) -> Self {
        Self {
            id: chat.id,
            chat_type: chat.kind.clone(),
            name: chat
                .title
                .clone()
                .or_else(|| chat.first_name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub struct TelegramNotifier {
    client: Client,
    api_base_url: String,
    bot_token: String,
    chat_id: Option<String>,
    parse_mode: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let bot_token = config
            .bot_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Missing Telegram bot token".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id: config.chat_id.clone().filter(|c| !c.trim().is_empty()),
            parse_mode: config.parse_mode.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.bot_token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed: ApiResponse<T> = serde_json::from_str(&body).map_err(|_| AppError::Notification {
            notifier: PLUGIN_TYPE.to_string(),
            message: format!("{} returned {}: {}", method, status, body),
        })?;

        if !parsed.ok || !status.is_success() {
            return Err(AppError::Notification {
                notifier: PLUGIN_TYPE.to_string(),
                message: parsed
                    .description
                    .unwrap_or_else(|| format!("{} returned {}", method, status)),
            });
        }

        parsed.result.ok_or_else(|| AppError::Notification {
            notifier: PLUGIN_TYPE.to_string(),
            message: format!("{} returned no result", method),
        })
    }

    /// Sends `text` to the configured chat and returns the Telegram message id.
    pub async fn send_message(&self, text: &str) -> Result<i64> {
        let chat_id = self
            .chat_id
            .as_deref()
            .ok_or_else(|| AppError::Validation("Missing Telegram chat id".to_string()))?;

        let payload = json!({
            "chat_id": chat_id,
            "text": escape_html(text),
            "parse_mode": self.parse_mode,
        });

        let request = self.client.post(self.method_url("sendMessage")).json(&payload);
        let sent: SentMessage = self.call("sendMessage", request).await?;
        debug!(message_id = sent.message_id, "Telegram message sent");
        Ok(sent.message_id)
    }

    pub async fn get_updates(&self) -> Result<Vec<Update>> {
        let request = self.client.get(self.method_url("getUpdates"));
        self.call("getUpdates", request).await
    }

    /// Chat of the most recent update that carries one.
    pub async fn latest_chat(&self) -> Result<Option<ChatInfo>> {
        let updates = self.get_updates().await?;
        Ok(updates
            .iter()
            .rev()
            .find_map(|u| u.message.as_ref().or(u.channel_post.as_ref()))
            .map(|m| ChatInfo::from(&m.chat)))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn plugin_type(&self) -> &'static str {
        PLUGIN_TYPE
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult> {
        let message_id = self.send_message(&event.message()).await?;
        Ok(NotificationResult {
            success: true,
            message_id: Some(message_id.to_string()),
            error: None,
        })
    }
}
