//! Subset of the Bot API objects the bot reads and writes.

use serde::{Deserialize, Serialize};

use crate::event::{BotIdentity, ConversationKind, InboundMessage, RepliedMessage, Sender};

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    fn into_sender(self) -> Sender {
        Sender::new(self.id, self.first_name)
    }
}

impl From<User> for BotIdentity {
    fn from(user: User) -> Self {
        let identity = BotIdentity::new(user.id, user.first_name);
        match user.username {
            Some(username) => identity.with_username(username),
            None => identity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
}

impl Message {
    /// Messages without an author (channel posts) yield `None`.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let sender = self.from?.into_sender();
        let conversation_kind = if self.chat.kind == "private" {
            ConversationKind::Private
        } else {
            ConversationKind::Group
        };
        let reply_to = self.reply_to_message.map(|replied| RepliedMessage {
            message_id: replied.message_id.into(),
            sender: replied.from.map(User::into_sender),
            text: replied.text,
            caption: replied.caption,
        });

        Some(InboundMessage {
            conversation_id: self.chat.id.into(),
            conversation_kind,
            message_id: self.message_id.into(),
            sender,
            text: self.text,
            caption: self.caption,
            reply_to,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

impl BotCommand {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn group_reply_converts_to_inbound() {
        let message: Message = serde_json::from_value(json!({
            "message_id": 42,
            "from": {"id": 7, "is_bot": false, "first_name": "Jane"},
            "chat": {"id": -100123, "type": "supergroup"},
            "text": "what now?",
            "reply_to_message": {
                "message_id": 41,
                "from": {"id": 99, "is_bot": true, "first_name": "Commander", "username": "cmd_bot"},
                "chat": {"id": -100123, "type": "supergroup"},
                "text": "Report in."
            }
        }))
        .unwrap();

        let inbound = message.into_inbound().unwrap();
        assert_eq!(inbound.conversation_id.as_str(), "-100123");
        assert_eq!(inbound.conversation_kind, ConversationKind::Group);
        assert_eq!(inbound.message_id.as_str(), "42");
        assert_eq!(inbound.sender.display_name, "Jane");
        let replied = inbound.reply_to.unwrap();
        assert_eq!(replied.message_id.as_str(), "41");
        assert_eq!(replied.sender.as_ref().unwrap().id.as_str(), "99");
        assert_eq!(replied.content(), Some("Report in."));
    }

    #[test]
    fn channel_post_without_author_is_dropped() {
        let message: Message = serde_json::from_value(json!({
            "message_id": 1,
            "chat": {"id": -5, "type": "channel"},
            "text": "announcement"
        }))
        .unwrap();
        assert!(message.into_inbound().is_none());
    }

    #[test]
    fn error_envelope_has_no_result() {
        let response: ApiResponse<Vec<Update>> = serde_json::from_value(json!({
            "ok": false,
            "error_code": 409,
            "description": "Conflict: terminated by other getUpdates request"
        }))
        .unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.error_code, Some(409));
    }

    #[test]
    fn bot_user_becomes_identity() {
        let user: User = serde_json::from_value(json!({
            "id": 99, "is_bot": true, "first_name": "Commander", "username": "cmd_bot"
        }))
        .unwrap();
        let identity = BotIdentity::from(user);
        assert_eq!(identity.id.as_str(), "99");
        assert_eq!(identity.display_name, "Commander");
        assert_eq!(identity.username.as_deref(), Some("cmd_bot"));
    }
}
