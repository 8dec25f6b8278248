use std::path::Path;
use std::sync::Arc;

use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use counselbot::config::Config;
use counselbot::openai;
use counselbot::relay::{Ffmpeg, IncomingMessage, Relay, TelegramClient};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let _guard = init_logging(config.log_dir.as_deref());

    info!("🚀 Starting counselbot...");
    info!(
        "Completion model: {}, transcription model: {}, API: {}",
        config.completion_model, config.transcription_model, config.openai_base_url
    );
    if config.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; every request will fail authentication");
    }

    let openai = match openai::Client::from_config(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);

    let relay = Arc::new(Relay::new(
        Arc::new(TelegramClient::new(bot.clone())),
        openai.clone(),
        openai,
        Arc::new(Ffmpeg::new(config.ffmpeg_path.clone(), config.transcode_timeout)),
    ));

    let handler = Update::filter_message()
        .branch(dptree::filter_map(IncomingMessage::from_telegram).endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![relay])
        .default_handler(|update| async move {
            debug!("Ignoring update: {:?}", update.kind);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("Error while handling an update"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Every failure is answered inside the relay, so this never returns an error.
async fn handle_message(msg: IncomingMessage, relay: Arc<Relay>) -> ResponseResult<()> {
    relay.handle(msg).await;
    Ok(())
}

/// Stdout logging, plus a daily log file when `log_dir` is set.
fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).ok();
            let appender = tracing_appender::rolling::daily(dir, "counselbot.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(env_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(env_filter()),
        )
        .with(file_layer)
        .init();

    guard
}

fn env_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
}
