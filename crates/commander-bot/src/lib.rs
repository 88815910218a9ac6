//! commander-bot - Telegram front end of the commander
//!
//! - `event` - transport-neutral inbound messages
//! - `transport` - the outbound `ChatTransport` seam
//! - `telegram` - Bot API client implementing the transport
//! - `controller` - the three dialogue entry points
//! - `router` - command parsing and dispatch
//! - `bot` - long-polling loop

pub mod bot;
pub mod controller;
pub mod event;
pub mod logging;
pub mod router;
pub mod sampling;
pub mod telegram;
pub mod transport;
pub mod typing;

pub use bot::PollingBot;
pub use controller::{ControllerSettings, DialogueController, SkipReason, TurnError, TurnOutcome};
pub use event::{BotIdentity, ConversationKind, InboundMessage, RepliedMessage, Sender};
pub use router::{dispatch, route, Route};
pub use sampling::{FixedGate, RandomGate, SamplingGate};
pub use telegram::TelegramClient;
pub use transport::{ChatTransport, ParseMode, TransportError};
