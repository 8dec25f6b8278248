//! Telegram client using teloxide.

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tracing::{info, warn};

use crate::relay::backend::Messenger;

/// Telegram rejects longer text messages. Counted in UTF-16 code units.
const MAX_MESSAGE_UNITS: usize = 4096;

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, String> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(|e| format!("Failed to get file info: {e}"))?;

        let mut data = Vec::new();
        self.bot
            .download_file(&file.path, &mut data)
            .await
            .map_err(|e| format!("Failed to download file: {e}"))?;

        info!("📥 Downloaded {} ({} bytes)", file.path, data.len());
        Ok(data)
    }

    /// Sent as plain text: model output is not valid markup.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), String> {
        let text = fit_message(text);

        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|_| ())
            .map_err(|e| {
                let msg = format!("Failed to send: {e}");
                warn!("{}", msg);
                msg
            })
    }
}

/// Cut `text` down to Telegram's message limit at a char boundary.
fn fit_message(text: &str) -> &str {
    let mut units = 0;
    for (idx, c) in text.char_indices() {
        units += c.len_utf16();
        if units > MAX_MESSAGE_UNITS {
            warn!("Reply truncated from {} UTF-16 units", text.encode_utf16().count());
            return &text[..idx];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_untouched() {
        assert_eq!(fit_message("hello"), "hello");
        let exact = "a".repeat(MAX_MESSAGE_UNITS);
        assert_eq!(fit_message(&exact), exact);
    }

    #[test]
    fn test_long_message_truncated_on_char_boundary() {
        let long = "ж".repeat(MAX_MESSAGE_UNITS + 10);
        let fitted = fit_message(&long);
        assert_eq!(fitted.chars().count(), MAX_MESSAGE_UNITS);
        assert!(fitted.chars().all(|c| c == 'ж'));
    }

    #[test]
    fn test_emoji_counted_as_two_units() {
        // Each emoji outside the BMP is a surrogate pair
        let long = "🙂".repeat(MAX_MESSAGE_UNITS + 10);
        let fitted = fit_message(&long);
        assert_eq!(fitted.encode_utf16().count(), MAX_MESSAGE_UNITS);
        assert_eq!(fitted.chars().count(), MAX_MESSAGE_UNITS / 2);
    }

    #[test]
    fn test_surrogate_pair_not_split_at_limit() {
        // One unit short of the limit, then a two-unit emoji
        let text = format!("{}🙂", "a".repeat(MAX_MESSAGE_UNITS - 1));
        let fitted = fit_message(&text);
        assert_eq!(fitted, "a".repeat(MAX_MESSAGE_UNITS - 1));
    }
}
