//! Dialogue controller: records inbound messages in the conversation's
//! context tree, asks the completion provider for an answer and posts it
//! back in-thread.

use std::sync::Arc;
use std::time::Duration;

use commander_core::{
    AppendNode, ChatMessage, ContextError, ContextTree, ConversationRegistry, MessageId, Role,
    SharedTree, DEFAULT_CONTEXT_LIMIT,
};
use commander_llm::{CompletionProvider, LLMError};
use thiserror::Error;

use crate::event::{BotIdentity, InboundMessage};
use crate::sampling::SamplingGate;
use crate::transport::{ChatTransport, ParseMode, TransportError};
use crate::typing::{TypingIndicator, TYPING_INTERVAL};

/// Prefix added to command requests so the model reads them as orders.
pub const COMMAND_HONORIFIC: &str = "sir, ";

/// Context window for commands issued in reply to another message.
pub const COMMAND_REPLY_CONTEXT_LIMIT: usize = 2;

#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    #[error("Error while getting completion: {0}")]
    Completion(#[from] LLMError),

    #[error("Failed to respond: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Message written by the bot itself
    OwnMessage,
    /// Neither text nor caption
    NoContent,
    /// Command without any request text
    EmptyCommand,
    /// Group message lost the sampling draw
    SampledOut,
    /// Completion returned no usable candidate
    NoCandidate,
    /// Platform accepted the reply but reported no message id
    NoReplyId,
    /// Not addressed to the bot in any way
    Ignored,
}

#[derive(Debug)]
pub enum TurnOutcome {
    Replied { message_id: MessageId },
    Skipped(SkipReason),
    Failed(TurnError),
}

impl TurnOutcome {
    pub fn is_replied(&self) -> bool {
        matches!(self, TurnOutcome::Replied { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub max_tokens: Option<u32>,
    pub typing_interval: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            max_tokens: None,
            typing_interval: TYPING_INTERVAL,
        }
    }
}

pub struct DialogueController {
    registry: Arc<ConversationRegistry>,
    provider: Arc<dyn CompletionProvider>,
    transport: Arc<dyn ChatTransport>,
    gate: Arc<dyn SamplingGate>,
    bot: BotIdentity,
    settings: ControllerSettings,
}

impl DialogueController {
    pub fn new(
        registry: Arc<ConversationRegistry>,
        provider: Arc<dyn CompletionProvider>,
        transport: Arc<dyn ChatTransport>,
        gate: Arc<dyn SamplingGate>,
        bot: BotIdentity,
    ) -> Self {
        Self {
            registry,
            provider,
            transport,
            gate,
            bot,
            settings: ControllerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn bot(&self) -> &BotIdentity {
        &self.bot
    }

    pub fn registry(&self) -> &Arc<ConversationRegistry> {
        &self.registry
    }

    /// Someone replied to one of the bot's messages.
    ///
    /// A replied-to message the tree has never seen (e.g. sent before a
    /// restart) is recovered as an assistant node rooted at the system prompt.
    pub async fn on_reply_to_bot(&self, event: &InboundMessage) -> TurnOutcome {
        let Some(content) = event.content() else {
            return TurnOutcome::Skipped(SkipReason::NoContent);
        };

        log::info!("Commander will reply");
        let tree = match self.tree_for(event).await {
            Ok(tree) => tree,
            Err(outcome) => return outcome,
        };

        let window = {
            let mut guard = tree.write().await;
            match self.record_reply_to_bot(&mut guard, event, content) {
                Ok(window) => window,
                Err(e) => return Self::context_failure(e),
            }
        };

        self.reply_from_context(event, &tree, window).await
    }

    /// An explicit command; `command_text` is the request without the
    /// command token.
    pub async fn on_command_request(&self, event: &InboundMessage, command_text: &str) -> TurnOutcome {
        if command_text.is_empty() {
            return TurnOutcome::Skipped(SkipReason::EmptyCommand);
        }

        log::info!("Commander will reply");
        let tree = match self.tree_for(event).await {
            Ok(tree) => tree,
            Err(outcome) => return outcome,
        };

        let window = {
            let mut guard = tree.write().await;
            match self.record_command(&mut guard, event, command_text) {
                Ok(window) => window,
                Err(e) => return Self::context_failure(e),
            }
        };

        self.reply_from_context(event, &tree, window).await
    }

    /// Any other message. Private chats are always answered; group chats
    /// only when the sampling gate lets the message through.
    pub async fn on_ambient_message(&self, event: &InboundMessage) -> TurnOutcome {
        if event.sender.id == self.bot.id {
            return TurnOutcome::Skipped(SkipReason::OwnMessage);
        }
        let Some(content) = event.content() else {
            return TurnOutcome::Skipped(SkipReason::NoContent);
        };
        if !event.is_private() && !self.gate.should_answer() {
            return TurnOutcome::Skipped(SkipReason::SampledOut);
        }

        log::info!("Commander will reply");
        let tree = match self.tree_for(event).await {
            Ok(tree) => tree,
            Err(outcome) => return outcome,
        };

        let window = {
            let mut guard = tree.write().await;
            if !guard.exists(&event.message_id) {
                let node = AppendNode::user(event.message_id.clone(), content)
                    .with_name(event.sender.display_name.as_str());
                if let Err(e) = guard.append(node) {
                    return Self::context_failure(e);
                }
            }
            guard.get_context(&event.message_id, DEFAULT_CONTEXT_LIMIT)
        };

        self.reply_from_context(event, &tree, window).await
    }

    fn record_reply_to_bot(
        &self,
        tree: &mut ContextTree,
        event: &InboundMessage,
        content: &str,
    ) -> commander_core::Result<Vec<ChatMessage>> {
        let mut prev = None;
        if let Some(replied) = &event.reply_to {
            prev = Some(replied.message_id.clone());
            if !tree.exists(&replied.message_id) {
                match replied.content() {
                    Some(replied_content) => tree.append(
                        AppendNode::assistant(replied.message_id.clone(), replied_content)
                            .with_name(self.bot.display_name.as_str()),
                    )?,
                    None => prev = None,
                }
            }
        }

        tree.append(
            AppendNode::user(event.message_id.clone(), content)
                .with_prev(prev)
                .with_name(event.sender.display_name.as_str()),
        )?;
        Ok(tree.get_context(&event.message_id, DEFAULT_CONTEXT_LIMIT))
    }

    fn record_command(
        &self,
        tree: &mut ContextTree,
        event: &InboundMessage,
        command_text: &str,
    ) -> commander_core::Result<Vec<ChatMessage>> {
        let mut prev = None;
        if let Some(replied) = &event.reply_to {
            prev = Some(replied.message_id.clone());
            if !tree.exists(&replied.message_id) {
                if let Some(replied_content) = replied.content() {
                    let role = if event.sender.id == self.bot.id {
                        Role::Assistant
                    } else {
                        Role::User
                    };
                    let mut node = AppendNode::new(role, replied.message_id.clone(), replied_content);
                    if let Some(sender) = &replied.sender {
                        node = node.with_name(sender.display_name.as_str());
                    }
                    tree.append(node)?;
                }
            }
        }

        let limit = if prev.is_some() {
            COMMAND_REPLY_CONTEXT_LIMIT
        } else {
            DEFAULT_CONTEXT_LIMIT
        };
        tree.append(
            AppendNode::user(event.message_id.clone(), format!("{COMMAND_HONORIFIC}{command_text}"))
                .with_prev(prev)
                .with_name(event.sender.display_name.as_str()),
        )?;
        Ok(tree.get_context(&event.message_id, limit))
    }

    /// Complete `window`, post the answer in reply to `event` and record it
    /// as an assistant node following the triggering message.
    async fn reply_from_context(
        &self,
        event: &InboundMessage,
        tree: &SharedTree,
        window: Vec<ChatMessage>,
    ) -> TurnOutcome {
        let model = tree.read().await.model().to_string();

        let typing = TypingIndicator::start(
            self.transport.clone(),
            event.conversation_id.clone(),
            self.settings.typing_interval,
        );
        let completion = self
            .provider
            .complete(&model, &window, self.settings.max_tokens)
            .await;
        typing.stop();

        let completion = match completion {
            Ok(completion) => completion,
            Err(e) => {
                log::error!("Error while getting completion: {}", e);
                return TurnOutcome::Failed(TurnError::Completion(e));
            }
        };
        let Some(answer) = completion.first() else {
            log::warn!("Completion for message {} had no usable candidate", event.message_id);
            return TurnOutcome::Skipped(SkipReason::NoCandidate);
        };

        let sent = self
            .transport
            .send_reply(&event.conversation_id, answer, &event.message_id, ParseMode::Html)
            .await;
        let reply_id = match sent {
            Ok(Some(reply_id)) => reply_id,
            Ok(None) => {
                log::warn!("Reply to message {} carried no message id", event.message_id);
                return TurnOutcome::Skipped(SkipReason::NoReplyId);
            }
            Err(e) => {
                log::error!("Failed to respond: {}", e);
                return TurnOutcome::Failed(TurnError::Transport(e));
            }
        };

        let node = AppendNode::assistant(reply_id.clone(), answer)
            .with_prev(Some(event.message_id.clone()))
            .with_name(self.bot.display_name.as_str());
        self.registry.touch(&event.conversation_id, tree).await;
        if let Err(e) = tree.write().await.append(node) {
            return Self::context_failure(e);
        }

        log::debug!(
            "Replied to {} in {} with {}",
            event.message_id,
            event.conversation_id,
            reply_id
        );
        TurnOutcome::Replied { message_id: reply_id }
    }

    async fn tree_for(&self, event: &InboundMessage) -> Result<SharedTree, TurnOutcome> {
        self.registry
            .get_or_create(&event.conversation_id)
            .await
            .map_err(Self::context_failure)
    }

    fn context_failure(e: ContextError) -> TurnOutcome {
        log::error!("Context error: {}", e);
        TurnOutcome::Failed(TurnError::Context(e))
    }
}
