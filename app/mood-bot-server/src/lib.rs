pub mod telegram_api;
pub mod telegram_http_server;
pub mod telegram_polling;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use mood_bot::http::build_client;
use mood_bot::{BotConfig, MoodBot, TransportMode};

use crate::telegram_api::{to_event, TelegramClient, TelegramReplySink, Update};

/// Environment file read before the process environment.
pub const ENV_FILE: &str = "mood_bot.env";
/// Optional path to a JSON config file.
pub const CONFIG_PATH_VAR: &str = "MOOD_BOT_CONFIG";

/// Shared handles every update handler needs.
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<MoodBot>,
    pub telegram: Arc<TelegramClient>,
}

/// Route one update through the bot. Unsupported updates are dropped.
pub async fn handle_update(state: AppState, update: Update) {
    let Some((event, target)) = to_event(&update) else {
        tracing::debug!(update_id = update.update_id, "Ignoring unsupported update");
        return;
    };
    let sink = TelegramReplySink::new(state.telegram.clone(), target);
    state.bot.handle(event, &sink).await;
}

/// Spawn handling of `update` so slow providers never block other users.
pub fn dispatch(state: &AppState, update: Update) {
    let state = state.clone();
    tokio::spawn(async move {
        handle_update(state, update).await;
    });
}

pub fn load_config() -> Result<BotConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
    BotConfig::load(path.as_deref()).context("Invalid bot configuration")
}

pub async fn run() -> Result<()> {
    // Before the subscriber so RUST_LOG can come from the env file.
    let env_file = dotenv::from_filename(ENV_FILE);

    // Initialize tracing subscriber so tracing::info!/debug!/warn!/error! produce output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match env_file {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) => tracing::debug!(error = %e, "No environment file loaded"),
    }

    let config = load_config()?;
    let client = build_client(&config.http).context("Failed to build HTTP client")?;

    let bot = MoodBot::from_config(&config, client.clone()).context("Failed to assemble bot")?;
    let telegram = TelegramClient::new(client, &config.telegram.api_base_url, &config.telegram.token);
    let state = AppState {
        bot: Arc::new(bot),
        telegram: Arc::new(telegram),
    };

    tracing::info!(
        mode = ?config.telegram.mode,
        places = ?config.places.backend,
        fallback = config.fallback_enabled(),
        "🚀 Mood bot starting"
    );

    match config.telegram.mode {
        TransportMode::Polling => telegram_polling::run(state, &config.telegram).await,
        TransportMode::Webhook => telegram_http_server::start_server(state, &config.telegram).await,
    }
}
