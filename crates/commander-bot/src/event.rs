//! Transport-neutral view of an inbound chat message.

use commander_core::{ConversationId, MessageId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationKind {
    /// One-to-one chat with the bot
    Private,
    /// Groups, supergroups and channels
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub display_name: String,
}

impl Sender {
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// The bot's own account, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: UserId,
    pub display_name: String,
    pub username: Option<String>,
}

impl BotIdentity {
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// The message an inbound message replies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepliedMessage {
    pub message_id: MessageId,
    pub sender: Option<Sender>,
    pub text: Option<String>,
    pub caption: Option<String>,
}

impl RepliedMessage {
    pub fn content(&self) -> Option<&str> {
        first_non_empty(&self.text, &self.caption)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub conversation_id: ConversationId,
    pub conversation_kind: ConversationKind,
    pub message_id: MessageId,
    pub sender: Sender,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub reply_to: Option<RepliedMessage>,
}

impl InboundMessage {
    /// Text, or the caption when the text is missing or empty.
    pub fn content(&self) -> Option<&str> {
        first_non_empty(&self.text, &self.caption)
    }

    pub fn is_private(&self) -> bool {
        self.conversation_kind == ConversationKind::Private
    }

    pub fn replies_to(&self, user: &UserId) -> bool {
        self.reply_to
            .as_ref()
            .and_then(|replied| replied.sender.as_ref())
            .is_some_and(|sender| &sender.id == user)
    }
}

fn first_non_empty<'a>(text: &'a Option<String>, caption: &'a Option<String>) -> Option<&'a str> {
    text.as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| caption.as_deref().filter(|c| !c.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: Option<&str>, caption: Option<&str>) -> InboundMessage {
        InboundMessage {
            conversation_id: ConversationId::from(1i64),
            conversation_kind: ConversationKind::Group,
            message_id: MessageId::from(10i64),
            sender: Sender::new(5i64, "Jane"),
            text: text.map(str::to_string),
            caption: caption.map(str::to_string),
            reply_to: None,
        }
    }

    #[test]
    fn content_prefers_text_over_caption() {
        assert_eq!(message(Some("t"), Some("c")).content(), Some("t"));
        assert_eq!(message(Some(""), Some("c")).content(), Some("c"));
        assert_eq!(message(None, Some("c")).content(), Some("c"));
        assert_eq!(message(None, None).content(), None);
        assert_eq!(message(Some(""), Some("")).content(), None);
    }

    #[test]
    fn replies_to_checks_replied_sender() {
        let bot = UserId::from(99i64);
        let mut msg = message(Some("hi"), None);
        assert!(!msg.replies_to(&bot));

        msg.reply_to = Some(RepliedMessage {
            message_id: MessageId::from(9i64),
            sender: Some(Sender::new(99i64, "Bot")),
            text: Some("earlier".into()),
            caption: None,
        });
        assert!(msg.replies_to(&bot));
        assert!(!msg.replies_to(&UserId::from(5i64)));
    }
}
