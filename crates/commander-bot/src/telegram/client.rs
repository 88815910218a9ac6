use async_trait::async_trait;
use commander_core::{ConversationId, MessageId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::types::{ApiResponse, BotCommand, Message, Update, User};
use crate::transport::{ChatTransport, ParseMode, Result, TransportError};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Bot API client over plain HTTPS JSON calls.
pub struct TelegramClient {
    client: Client,
    token: String,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            base_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: Value) -> Result<T> {
        log::debug!("Calling Bot API method {}", method);
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;
        let text = response.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&text)?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code,
                description,
                ..
            } => Err(TransportError::Api {
                code: error_code,
                description: description.unwrap_or_else(|| format!("{method} returned no result")),
            }),
        }
    }

    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", json!({})).await
    }

    /// Long-poll for message updates starting at `offset`.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", body).await
    }

    pub async fn send_message(
        &self,
        chat_id: &ConversationId,
        text: &str,
        reply_to: Option<&MessageId>,
        parse_mode: ParseMode,
    ) -> Result<Message> {
        let mut body = json!({
            "chat_id": id_value(chat_id.as_str()),
            "text": text,
        });
        if let Some(mode) = parse_mode.as_api_str() {
            body["parse_mode"] = json!(mode);
        }
        if let Some(reply_to) = reply_to {
            body["reply_parameters"] = json!({
                "message_id": id_value(reply_to.as_str()),
                "allow_sending_without_reply": true,
            });
        }
        self.call("sendMessage", body).await
    }

    pub async fn send_chat_action(&self, chat_id: &ConversationId, action: &str) -> Result<bool> {
        self.call(
            "sendChatAction",
            json!({
                "chat_id": id_value(chat_id.as_str()),
                "action": action,
            }),
        )
        .await
    }

    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<bool> {
        self.call("setMyCommands", json!({ "commands": commands })).await
    }
}

/// Numeric ids go out as integers, anything else (e.g. `@channel`) as text.
fn id_value(id: &str) -> Value {
    match id.parse::<i64>() {
        Ok(n) => json!(n),
        Err(_) => json!(id),
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_reply(
        &self,
        conversation_id: &ConversationId,
        text: &str,
        in_reply_to: &MessageId,
        parse_mode: ParseMode,
    ) -> Result<Option<MessageId>> {
        let sent = self
            .send_message(conversation_id, text, Some(in_reply_to), parse_mode)
            .await?;
        Ok(Some(MessageId::from(sent.message_id)))
    }

    async fn send_typing(&self, conversation_id: &ConversationId) -> Result<()> {
        self.send_chat_action(conversation_id, "typing").await?;
        Ok(())
    }
}
