//! Seams between the relay and the services it talks to.

use std::path::Path;

use async_trait::async_trait;

use crate::openai::{self, Message};
use crate::relay::transcode::TranscodeError;

/// Chat platform: fetches voice clips and delivers replies.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, String>;

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), String>;
}

/// Generates one reply for an ordered list of role-tagged messages.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<Option<String>, openai::Error>;
}

#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, wav_data: Vec<u8>) -> Result<String, openai::Error>;
}

/// Converts a compressed clip at `input` into linear PCM at `output`.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}

#[async_trait]
impl ChatModel for openai::Client {
    async fn complete(&self, messages: &[Message]) -> Result<Option<String>, openai::Error> {
        self.chat(messages).await
    }
}

#[async_trait]
impl SpeechToText for openai::Client {
    async fn transcribe(&self, wav_data: Vec<u8>) -> Result<String, openai::Error> {
        openai::Client::transcribe(self, wav_data).await
    }
}
