//! Decides which controller entry point an inbound message goes to.

use crate::controller::{DialogueController, SkipReason, TurnOutcome};
use crate::event::{BotIdentity, InboundMessage};

/// Command users issue to address the bot directly.
pub const ASSIST_COMMAND: &str = "sir";
pub const ASSIST_COMMAND_DESCRIPTION: &str = "request assistance from the commander";

const START_COMMAND: &str = "start";
const START_SUFFIX: &str = " give a greeting";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Command { text: String },
    ReplyToBot,
    Ambient,
    Ignore,
}

/// Route a message. Commands are recognized in the text only, so a caption
/// starting with `/` is handled as a regular message.
pub fn route(message: &InboundMessage, bot: &BotIdentity) -> Route {
    if let Some(text) = message.text.as_deref().filter(|t| t.starts_with('/')) {
        return route_command(text, bot);
    }
    if message.content().is_none() {
        return Route::Ignore;
    }
    if message.replies_to(&bot.id) {
        Route::ReplyToBot
    } else {
        Route::Ambient
    }
}

fn route_command(text: &str, bot: &BotIdentity) -> Route {
    let token = text.split_whitespace().next().unwrap_or_default();
    let token = token.trim_start_matches('/');
    let (name, target) = match token.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (token, None),
    };

    if let Some(target) = target {
        let addressed = bot
            .username
            .as_deref()
            .is_some_and(|username| username.eq_ignore_ascii_case(target));
        if !addressed {
            return Route::Ignore;
        }
    }

    match name {
        START_COMMAND => Route::Command {
            text: command_arguments(&format!("{text}{START_SUFFIX}")),
        },
        ASSIST_COMMAND => Route::Command {
            text: command_arguments(text),
        },
        _ => Route::Ignore,
    }
}

/// Everything after the first space-separated word.
pub fn command_arguments(text: &str) -> String {
    text.split(' ').skip(1).collect::<Vec<_>>().join(" ")
}

pub async fn dispatch(controller: &DialogueController, message: &InboundMessage) -> TurnOutcome {
    match route(message, controller.bot()) {
        Route::Command { text } => controller.on_command_request(message, &text).await,
        Route::ReplyToBot => controller.on_reply_to_bot(message).await,
        Route::Ambient => controller.on_ambient_message(message).await,
        Route::Ignore => TurnOutcome::Skipped(SkipReason::Ignored),
    }
}
