//! commander-core - Conversation context tracking for the commander bot
//!
//! This crate provides the in-memory data structures every other crate builds on:
//! - `context` - ContextNode and ContextTree, the per-conversation reply forest
//! - `registry` - ConversationRegistry mapping conversation ids to trees
//! - `message` - Role, ChatMessage and NodeRecord payloads
//! - `ids` - ConversationId, MessageId and UserId
//! - `config` - environment-sourced configuration

pub mod config;
pub mod context;
pub mod error;
pub mod ids;
pub mod message;
pub mod registry;

// Re-export commonly used types
pub use config::{Config, ConfigError, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
pub use context::{AppendNode, ContextNode, ContextTree, TreeSettings, DEFAULT_CONTEXT_LIMIT};
pub use error::{ContextError, Result};
pub use ids::{ConversationId, MessageId, UserId};
pub use message::{sanitize_name, ChatMessage, NodeRecord, Role};
pub use registry::{Clock, ConversationRegistry, SharedTree, SystemClock};
