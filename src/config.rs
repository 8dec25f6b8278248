use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TRANSCRIPTION_MODEL: &str = "gpt-4o-mini-transcribe";
const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is not set.
    Missing(&'static str),
    /// A variable is set but its value is unusable.
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "environment variable {key} is required"),
            Self::Invalid { key, reason } => write!(f, "invalid {key}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub telegram_bot_token: String,
    /// May be empty; requests then fail with an authentication error.
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub completion_model: String,
    pub transcription_model: String,
    pub ffmpeg_path: PathBuf,
    /// Applied to every OpenAI request when set.
    pub http_timeout: Option<Duration>,
    /// ffmpeg is killed after this long when set.
    pub transcode_timeout: Option<Duration>,
    /// Directory for the rolling log file. Stdout only when unset.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_bot_token = get("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Invalid {
                key: "BOT_TOKEN",
                reason: "expected format 123456789:ABCdefGHI...".into(),
            });
        }

        Ok(Self {
            telegram_bot_token,
            openai_api_key: get("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: get("OPENAI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            completion_model: get("COMPLETION_MODEL").unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            transcription_model: get("TRANSCRIPTION_MODEL")
                .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_MODEL.to_string()),
            ffmpeg_path: PathBuf::from(get("FFMPEG_PATH").unwrap_or_else(|| DEFAULT_FFMPEG.to_string())),
            http_timeout: parse_secs("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"))?,
            transcode_timeout: parse_secs("TRANSCODE_TIMEOUT_SECS", get("TRANSCODE_TIMEOUT_SECS"))?,
            log_dir: get("LOG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_secs(key: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid { key, reason: "must be greater than zero".into() }),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
        Err(e) => Err(ConfigError::Invalid { key, reason: format!("{value:?}: {e}") }),
    }
}
