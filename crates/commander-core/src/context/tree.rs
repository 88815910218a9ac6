//! ContextTree - the reply forest of one conversation
//!
//! Tracks every message of a conversation and the message it follows, so the
//! history leading up to any message can be rebuilt for a completion request.

use std::collections::HashMap;

use super::node::{ContextNode, NodeIndex};
use crate::config::{DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
use crate::error::Result;
use crate::ids::MessageId;
use crate::message::{ChatMessage, NodeRecord, Role};

/// Default number of ancestors walked when building a context window.
pub const DEFAULT_CONTEXT_LIMIT: usize = 30;

const ROOT: NodeIndex = NodeIndex(0);

/// Values every new tree's root is seeded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSettings {
    pub system_prompt: String,
    pub model: String,
}

impl TreeSettings {
    /// Empty values fall back to the built-in prompt and model.
    pub fn new(system_prompt: impl Into<String>, model: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let model = model.into();
        Self {
            system_prompt: if system_prompt.is_empty() {
                DEFAULT_SYSTEM_PROMPT.to_string()
            } else {
                system_prompt
            },
            model: if model.is_empty() {
                DEFAULT_MODEL.to_string()
            } else {
                model
            },
        }
    }
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT, DEFAULT_MODEL)
    }
}

/// Arguments for inserting a node into a [`ContextTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendNode {
    pub role: Role,
    pub content: String,
    pub message_id: MessageId,
    pub prev_message_id: Option<MessageId>,
    pub name: Option<String>,
}

impl AppendNode {
    pub fn new(role: Role, message_id: impl Into<MessageId>, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            message_id: message_id.into(),
            prev_message_id: None,
            name: None,
        }
    }

    pub fn user(message_id: impl Into<MessageId>, content: impl Into<String>) -> Self {
        Self::new(Role::User, message_id, content)
    }

    pub fn assistant(message_id: impl Into<MessageId>, content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, message_id, content)
    }

    /// Message this node follows; unknown ids fall back to the root on append.
    pub fn with_prev(mut self, prev_message_id: Option<MessageId>) -> Self {
        self.prev_message_id = prev_message_id;
        self
    }

    /// Raw author name; sanitized when the node is built.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Per-conversation forest of messages rooted at a synthetic system prompt.
///
/// Nodes live in an arena and the id map points into it. Re-using a message
/// id re-points the map entry only, so nodes already linked to the earlier
/// entry keep their history.
#[derive(Debug, Clone)]
pub struct ContextTree {
    arena: Vec<ContextNode>,
    index: HashMap<MessageId, NodeIndex>,
}

impl ContextTree {
    pub fn new(system_prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            arena: vec![ContextNode::root(system_prompt, model)],
            index: HashMap::new(),
        }
    }

    pub fn from_settings(settings: &TreeSettings) -> Self {
        Self::new(settings.system_prompt.clone(), settings.model.clone())
    }

    /// The system prompt node. Never reachable through [`lookup`](Self::lookup).
    pub fn root(&self) -> &ContextNode {
        &self.arena[ROOT.0]
    }

    /// Model tag stored on the root.
    pub fn model(&self) -> &str {
        self.root().model().unwrap_or(DEFAULT_MODEL)
    }

    /// Number of message ids tracked, excluding the root.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn lookup(&self, message_id: &MessageId) -> Option<&ContextNode> {
        self.index.get(message_id).map(|index| &self.arena[index.0])
    }

    pub fn exists(&self, message_id: &MessageId) -> bool {
        self.index.contains_key(message_id)
    }

    /// Check using the node's own id; the root is never indexed.
    pub fn node_exists(&self, node: &ContextNode) -> bool {
        node.message_id().is_some_and(|id| self.exists(id))
    }

    pub fn predecessor(&self, node: &ContextNode) -> Option<&ContextNode> {
        node.prev_index().map(|index| &self.arena[index.0])
    }

    /// Insert a node after `prev_message_id`, or after the root when that id
    /// is absent or unknown. An existing entry under the same id is replaced.
    pub fn append(&mut self, node: AppendNode) -> Result<()> {
        let prev = node
            .prev_message_id
            .as_ref()
            .filter(|id| !id.is_empty())
            .and_then(|id| self.index.get(id).copied())
            .unwrap_or(ROOT);

        self.insert(node, Some(prev))
    }

    /// Insert a node that starts an orphan chain: it has no predecessor, not
    /// even the root.
    pub fn append_detached(&mut self, node: AppendNode) -> Result<()> {
        self.insert(node, None)
    }

    fn insert(&mut self, node: AppendNode, prev: Option<NodeIndex>) -> Result<()> {
        let prev = prev.map(|index| {
            let prev_id = self.arena[index.0].message_id().cloned();
            (index, prev_id)
        });

        let built = ContextNode::linked(
            node.role,
            node.content,
            node.message_id.clone(),
            prev,
            node.name.as_deref(),
        )?;

        let index = NodeIndex(self.arena.len());
        self.arena.push(built);
        if self.index.insert(node.message_id.clone(), index).is_some() {
            log::debug!("Message {} re-appended, replacing tracked node", node.message_id);
        }
        Ok(())
    }

    fn ancestors(&self, start: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(start),
        }
    }

    /// Ordered context window ending at `message_id`, oldest first.
    ///
    /// Walks predecessors while fewer than `limit + 1` messages are collected.
    /// When the walk stops short of the root (limit reached or orphan chain)
    /// the root prompt is put in front. Unknown ids yield the root alone.
    pub fn get_context(&self, message_id: &MessageId, limit: usize) -> Vec<ChatMessage> {
        let Some(&start) = self.index.get(message_id) else {
            return vec![self.root().as_message()];
        };

        let mut context: Vec<ChatMessage> = self
            .ancestors(start)
            .take(limit.saturating_add(1))
            .map(ContextNode::as_message)
            .collect();
        context.reverse();

        let root = self.root();
        if context.first().map(|message| message.role) != Some(root.role()) {
            context.insert(0, root.as_message());
        }

        context
    }

    /// Every record from the chain head down to `message_id`, oldest first.
    ///
    /// No limit and no synthetic root: an orphan chain starts at its head.
    pub fn get_raw_context(&self, message_id: Option<&MessageId>) -> Vec<NodeRecord> {
        let Some(&start) = message_id.and_then(|id| self.index.get(id)) else {
            return Vec::new();
        };

        let mut records: Vec<NodeRecord> =
            self.ancestors(start).map(ContextNode::as_record).collect();
        records.reverse();
        records
    }
}

impl Default for ContextTree {
    fn default() -> Self {
        Self::from_settings(&TreeSettings::default())
    }
}

struct Ancestors<'a> {
    tree: &'a ContextTree,
    next: Option<NodeIndex>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ContextNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.tree.arena[self.next?.0];
        self.next = node.prev_index();
        Some(node)
    }
}
