//! Telegram Bot API transport.

mod client;
mod types;

pub use client::{TelegramClient, DEFAULT_API_URL};
pub use types::{ApiResponse, BotCommand, Chat, Message, Update, User};
