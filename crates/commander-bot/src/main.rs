use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use commander_bot::controller::ControllerSettings;
use commander_bot::logging::init_logging;
use commander_bot::router::{ASSIST_COMMAND, ASSIST_COMMAND_DESCRIPTION};
use commander_bot::telegram::BotCommand;
use commander_bot::{BotIdentity, DialogueController, PollingBot, RandomGate, TelegramClient};
use commander_core::{Config, ConversationRegistry, SystemClock};
use commander_llm::OpenAIProvider;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "commander", about = "Telegram bot answering in-thread with OpenAI completions")]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG")]
    debug: bool,

    /// Long-poll timeout in seconds
    #[arg(long, default_value_t = commander_bot::bot::DEFAULT_POLL_TIMEOUT_SECS)]
    poll_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("No tokens to proceed: {}", e);
            std::process::exit(1);
        }
    };

    let telegram = Arc::new(TelegramClient::new(config.telegram_token.clone()));
    let me = telegram
        .get_me()
        .await
        .context("Failed to fetch bot identity")?;
    let identity = BotIdentity::from(me);
    log::info!(
        "Running as {} (@{})",
        identity.display_name,
        identity.username.as_deref().unwrap_or("unknown")
    );

    if let Err(e) = telegram
        .set_my_commands(&[BotCommand::new(ASSIST_COMMAND, ASSIST_COMMAND_DESCRIPTION)])
        .await
    {
        log::warn!("Failed to register commands: {}", e);
    }

    let registry = match config.idle_ttl() {
        Some(ttl) => {
            ConversationRegistry::with_idle_ttl(config.tree_settings(), ttl, Arc::new(SystemClock))
        }
        None => ConversationRegistry::new(config.tree_settings()),
    };
    let provider = OpenAIProvider::new(config.openai_token.clone())
        .with_base_url(config.api_base.clone())
        .with_organization(config.openai_organization.clone());

    let controller = DialogueController::new(
        Arc::new(registry),
        Arc::new(provider),
        telegram.clone(),
        Arc::new(RandomGate::new(config.probability)),
        identity,
    )
    .with_settings(ControllerSettings {
        max_tokens: config.max_tokens,
        ..ControllerSettings::default()
    });

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Shutdown requested");
            signal.cancel();
        }
    });

    log::info!("Bot started");
    PollingBot::new(telegram, Arc::new(controller))
        .with_poll_timeout(cli.poll_timeout)
        .run(shutdown)
        .await;

    Ok(())
}
