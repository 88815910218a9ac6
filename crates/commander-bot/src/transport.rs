use async_trait::async_trait;
use commander_core::{ConversationId, MessageId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error ({code:?}): {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// How the platform should render outbound text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
    Markdown,
    Plain,
}

impl ParseMode {
    pub fn as_api_str(&self) -> Option<&'static str> {
        match self {
            ParseMode::Html => Some("HTML"),
            ParseMode::Markdown => Some("MarkdownV2"),
            ParseMode::Plain => None,
        }
    }
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `text` as a reply to `in_reply_to`; returns the id of the sent
    /// message when the platform reports one.
    async fn send_reply(
        &self,
        conversation_id: &ConversationId,
        text: &str,
        in_reply_to: &MessageId,
        parse_mode: ParseMode,
    ) -> Result<Option<MessageId>>;

    /// Show a "typing" indicator in the conversation.
    async fn send_typing(&self, conversation_id: &ConversationId) -> Result<()>;
}
