//! Conversation registry - one context tree per conversation, created on demand

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::context::{ContextTree, TreeSettings};
use crate::error::{ContextError, Result};
use crate::ids::ConversationId;

/// A tree shared between concurrently running turns of one conversation.
pub type SharedTree = Arc<RwLock<ContextTree>>;

/// Source of the current time for idle eviction.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct Entry {
    tree: SharedTree,
    last_used: DateTime<Utc>,
}

/// Process-wide map from conversation id to its context tree.
///
/// Without an idle TTL the registry only grows, which suits session-scoped
/// deployments. With a TTL, trees untouched for longer are dropped whenever
/// a tree is requested.
pub struct ConversationRegistry {
    settings: TreeSettings,
    trees: RwLock<HashMap<ConversationId, Entry>>,
    idle_ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl ConversationRegistry {
    /// Create an unbounded registry
    pub fn new(settings: TreeSettings) -> Self {
        Self {
            settings,
            trees: RwLock::new(HashMap::new()),
            idle_ttl: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a registry that evicts trees idle for longer than `ttl`
    pub fn with_idle_ttl(settings: TreeSettings, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            trees: RwLock::new(HashMap::new()),
            idle_ttl: Some(ttl),
            clock,
        }
    }

    pub fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    /// Get the tree for a conversation, creating it on first access
    pub async fn get_or_create(&self, conversation_id: &ConversationId) -> Result<SharedTree> {
        if conversation_id.is_empty() {
            return Err(ContextError::MissingConversationId);
        }

        if self.idle_ttl.is_some() {
            self.evict_idle().await;
        }

        let now = self.clock.now();
        let mut trees = self.trees.write().await;
        let entry = trees.entry(conversation_id.clone()).or_insert_with(|| {
            log::debug!("Creating context tree for conversation {}", conversation_id);
            Entry {
                tree: Arc::new(RwLock::new(ContextTree::from_settings(&self.settings))),
                last_used: now,
            }
        });
        entry.last_used = now;

        Ok(Arc::clone(&entry.tree))
    }

    /// Mark a conversation as used by a turn that still holds `tree`.
    ///
    /// If the tree was evicted while the turn was running it is put back, so
    /// nodes recorded through `tree` stay reachable. A tree created for the
    /// same id in the meantime is kept and only its timer is refreshed.
    pub async fn touch(&self, conversation_id: &ConversationId, tree: &SharedTree) {
        let now = self.clock.now();
        let mut trees = self.trees.write().await;
        let entry = trees.entry(conversation_id.clone()).or_insert_with(|| {
            log::debug!("Restoring evicted context tree for conversation {}", conversation_id);
            Entry {
                tree: Arc::clone(tree),
                last_used: now,
            }
        });
        entry.last_used = now;
    }

    /// Look up a tree without creating it
    pub async fn get(&self, conversation_id: &ConversationId) -> Option<SharedTree> {
        let trees = self.trees.read().await;
        trees.get(conversation_id).map(|entry| Arc::clone(&entry.tree))
    }

    pub async fn len(&self) -> usize {
        self.trees.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trees.read().await.is_empty()
    }

    /// Drop trees idle for longer than the TTL; returns how many were dropped
    pub async fn evict_idle(&self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };

        let now = self.clock.now();
        let mut trees = self.trees.write().await;
        let before = trees.len();
        trees.retain(|conversation_id, entry| {
            let idle = now
                .signed_duration_since(entry.last_used)
                .to_std()
                .is_ok_and(|idle| idle > ttl);
            if idle {
                log::debug!("Evicting idle context tree for conversation {}", conversation_id);
            }
            !idle
        });
        before - trees.len()
    }
}
