//! ContextNode - one tracked message

use crate::error::{ContextError, Result};
use crate::ids::MessageId;
use crate::message::{sanitize_name, ChatMessage, NodeRecord, Role};

/// Position of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeIndex(pub(crate) usize);

/// One message of a conversation.
///
/// Nodes are immutable once built. The predecessor link is an index into the
/// owning tree's arena, so a node never owns the message it follows and can
/// only point at a node that was inserted before it.
#[derive(Debug, Clone)]
pub struct ContextNode {
    role: Role,
    content: String,
    name: Option<String>,
    message_id: Option<MessageId>,
    prev: Option<NodeIndex>,
    prev_message_id: Option<MessageId>,
    model: Option<String>,
}

impl ContextNode {
    /// Build the synthetic system node seeding a tree.
    pub(crate) fn root(system_prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: system_prompt.into(),
            name: None,
            message_id: None,
            prev: None,
            prev_message_id: None,
            model: Some(model.into()),
        }
    }

    /// Build a message node following `prev`, if any.
    ///
    /// `prev` carries the predecessor's arena index and its own message id
    /// (absent for the root). Empty content is rejected.
    pub(crate) fn linked(
        role: Role,
        content: String,
        message_id: MessageId,
        prev: Option<(NodeIndex, Option<MessageId>)>,
        name: Option<&str>,
    ) -> Result<Self> {
        if content.is_empty() {
            return Err(ContextError::EmptyContent);
        }

        let (prev, prev_message_id) = match prev {
            Some((index, id)) => (Some(index), id),
            None => (None, None),
        };

        Ok(Self {
            role,
            content,
            name: name.and_then(sanitize_name),
            message_id: Some(message_id),
            prev,
            prev_message_id,
            model: None,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Id this node is stored under; `None` only for the root.
    pub fn message_id(&self) -> Option<&MessageId> {
        self.message_id.as_ref()
    }

    /// Id of the predecessor; `None` when the predecessor is the root or missing.
    pub fn prev_message_id(&self) -> Option<&MessageId> {
        self.prev_message_id.as_ref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn has_predecessor(&self) -> bool {
        self.prev.is_some()
    }

    pub(crate) fn prev_index(&self) -> Option<NodeIndex> {
        self.prev
    }

    /// Payload accepted by the completion API.
    pub fn as_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
            name: self.name.clone(),
        }
    }

    /// Full diagnostic payload.
    pub fn as_record(&self) -> NodeRecord {
        NodeRecord {
            role: self.role,
            content: self.content.clone(),
            message_id: self.message_id.clone(),
            prev_message_id: self.prev_message_id.clone(),
            model: self.model.clone(),
            name: self.name.clone(),
        }
    }
}
