//! Context tracking types
//!
//! A conversation is a forest of messages linked to the message they reply to.
//! [`ContextTree`] owns every node of one conversation and rebuilds the
//! linear history that leads up to any message.

mod node;
mod tree;

pub use node::ContextNode;
pub use tree::{AppendNode, ContextTree, TreeSettings, DEFAULT_CONTEXT_LIMIT};
