//! Repeats the typing indicator while a completion is pending.

use std::sync::Arc;
use std::time::Duration;

use commander_core::ConversationId;
use tokio_util::sync::CancellationToken;

use crate::transport::ChatTransport;

pub const TYPING_INTERVAL: Duration = Duration::from_secs(5);

/// Background task sending the typing indicator right away and then every
/// `interval` until stopped or dropped.
pub struct TypingIndicator {
    token: CancellationToken,
}

impl TypingIndicator {
    pub fn start(
        transport: Arc<dyn ChatTransport>,
        conversation_id: ConversationId,
        interval: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let interval = interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = transport.send_typing(&conversation_id).await {
                            log::debug!("Typing indicator for {} failed: {}", conversation_id, e);
                        }
                    }
                }
            }
        });

        Self { token }
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for TypingIndicator {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
