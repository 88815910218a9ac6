//! Long-polling update loop.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::controller::{DialogueController, TurnOutcome};
use crate::router::dispatch;
use crate::telegram::{TelegramClient, Update};

pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
pub const RETRY_DELAY: Duration = Duration::from_secs(3);

pub struct PollingBot {
    client: Arc<TelegramClient>,
    controller: Arc<DialogueController>,
    poll_timeout_secs: u64,
    retry_delay: Duration,
}

impl PollingBot {
    pub fn new(client: Arc<TelegramClient>, controller: Arc<DialogueController>) -> Self {
        Self {
            client,
            controller,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Poll until `shutdown` fires. Each update is handled on its own task,
    /// so a slow completion never blocks other conversations.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut offset: Option<i64> = None;
        log::info!("Polling for updates");

        loop {
            let polled = tokio::select! {
                _ = shutdown.cancelled() => break,
                polled = self.client.get_updates(offset, self.poll_timeout_secs) => polled,
            };

            match polled {
                Ok(updates) => {
                    offset = next_offset(offset, &updates);
                    for update in updates {
                        self.spawn_update(update);
                    }
                }
                Err(e) => {
                    log::warn!("Polling failed: {}; retrying in {:?}", e, self.retry_delay);
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }

        log::info!("Polling stopped");
    }

    fn spawn_update(&self, update: Update) {
        let update_id = update.update_id;
        let Some(message) = update.message.and_then(|m| m.into_inbound()) else {
            log::debug!("Skipping update {}", update_id);
            return;
        };

        let controller = self.controller.clone();
        tokio::spawn(async move {
            match dispatch(&controller, &message).await {
                TurnOutcome::Replied { message_id } => {
                    log::debug!("Update {} answered with message {}", update_id, message_id)
                }
                TurnOutcome::Skipped(reason) => {
                    log::debug!("Update {} skipped: {:?}", update_id, reason)
                }
                TurnOutcome::Failed(e) => log::debug!("Update {} failed: {}", update_id, e),
            }
        });
    }
}

/// Offset acknowledging every update in `updates`.
pub fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .max(current)
}
