//! Relay engine - turns one inbound message into exactly one reply.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::openai::{self, Message};
use crate::relay::backend::{ChatModel, Messenger, SpeechToText, Transcoder};
use crate::relay::message::{Content, IncomingMessage};
use crate::relay::prompt::{
    EMPTY_TRANSCRIPT, Replies, SYSTEM_PROMPT, TEXT_REPLIES, TRANSCODE_FAILED, TRANSCODER_MISSING, VOICE_REPLIES,
};
use crate::relay::transcode::TranscodeError;

/// Why a handler could not produce a model answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Authentication(String),
    RateLimited(String),
    /// Transport problems and any other API-side error.
    Connectivity(String),
    TranscoderMissing(String),
    TranscodeFailed(String),
    Unexpected(String),
}

impl Failure {
    /// The message sent to the user for this failure.
    pub fn reply(&self, replies: &Replies) -> String {
        match self {
            Self::Authentication(_) => replies.authentication.to_string(),
            Self::RateLimited(_) => replies.rate_limited.to_string(),
            Self::Connectivity(_) => replies.connectivity.to_string(),
            Self::TranscoderMissing(_) => TRANSCODER_MISSING.to_string(),
            Self::TranscodeFailed(_) => TRANSCODE_FAILED.to_string(),
            Self::Unexpected(e) => format!("{}{}", replies.unexpected_prefix, e),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication(e) => write!(f, "authentication: {e}"),
            Self::RateLimited(e) => write!(f, "rate limited: {e}"),
            Self::Connectivity(e) => write!(f, "connectivity: {e}"),
            Self::TranscoderMissing(e) => write!(f, "transcoder missing: {e}"),
            Self::TranscodeFailed(e) => write!(f, "transcoding: {e}"),
            Self::Unexpected(e) => write!(f, "unexpected: {e}"),
        }
    }
}

impl From<openai::Error> for Failure {
    fn from(e: openai::Error) -> Self {
        match e {
            openai::Error::Authentication(_) => Self::Authentication(e.to_string()),
            openai::Error::RateLimited(_) => Self::RateLimited(e.to_string()),
            openai::Error::Connection(_) | openai::Error::Api { .. } | openai::Error::Parse(_) => {
                Self::Connectivity(e.to_string())
            }
        }
    }
}

impl From<TranscodeError> for Failure {
    fn from(e: TranscodeError) -> Self {
        match e {
            TranscodeError::NotInstalled(_) => Self::TranscoderMissing(e.to_string()),
            TranscodeError::Failed(_) | TranscodeError::TimedOut(_) => Self::TranscodeFailed(e.to_string()),
            TranscodeError::Spawn(_) => Self::Unexpected(e.to_string()),
        }
    }
}

/// The relay.
pub struct Relay {
    messenger: Arc<dyn Messenger>,
    model: Arc<dyn ChatModel>,
    speech: Arc<dyn SpeechToText>,
    transcoder: Arc<dyn Transcoder>,
    /// Parent for per-clip scratch directories. System temp dir when unset.
    scratch_root: Option<PathBuf>,
}

impl Relay {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        model: Arc<dyn ChatModel>,
        speech: Arc<dyn SpeechToText>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            messenger,
            model,
            speech,
            transcoder,
            scratch_root: None,
        }
    }

    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Route a message to its handler.
    pub async fn handle(&self, msg: IncomingMessage) {
        info!("📨 {} message in chat {}", msg.kind(), msg.chat_id);
        match msg.content {
            Content::Text(ref text) => self.handle_text(msg.chat_id, text).await,
            Content::Voice { ref file_id } => self.handle_voice(msg.chat_id, file_id).await,
        }
    }

    pub async fn handle_text(&self, chat_id: i64, text: &str) {
        let preview: String = text.chars().take(100).collect();
        info!("Text: \"{preview}\"");

        let reply = match self.complete(text).await {
            Ok(answer) if answer.is_empty() => TEXT_REPLIES.empty_reply.to_string(),
            Ok(answer) => answer,
            Err(e) => {
                let failure = Failure::from(e);
                warn!("Text reply failed in chat {chat_id}: {failure}");
                failure.reply(&TEXT_REPLIES)
            }
        };

        self.deliver(chat_id, &reply).await;
    }

    pub async fn handle_voice(&self, chat_id: i64, file_id: &str) {
        let reply = match self.voice_reply(file_id).await {
            Ok(reply) => reply,
            Err(failure) => {
                warn!("Voice reply failed in chat {chat_id}: {failure}");
                failure.reply(&VOICE_REPLIES)
            }
        };

        self.deliver(chat_id, &reply).await;
    }

    async fn voice_reply(&self, file_id: &str) -> Result<String, Failure> {
        let audio = self.messenger.download_file(file_id).await.map_err(Failure::Unexpected)?;

        let transcript = self.transcribe_clip(&audio).await?;
        if transcript.is_empty() {
            info!("Empty transcript");
            return Ok(EMPTY_TRANSCRIPT.to_string());
        }
        let preview: String = transcript.chars().take(100).collect();
        info!("Transcribed: \"{preview}\"");

        let answer = self.complete(&transcript).await?;
        if answer.is_empty() {
            return Ok(VOICE_REPLIES.empty_reply.to_string());
        }
        Ok(answer)
    }

    /// Write the clip to a fresh scratch directory, convert it and transcribe it.
    /// The directory is gone when this returns, whatever the outcome.
    async fn transcribe_clip(&self, audio: &[u8]) -> Result<String, Failure> {
        let scratch = self.scratch_dir()?;
        let result = self.transcribe_in(&scratch, audio).await;

        let path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!("Failed to remove scratch dir {:?}: {e}", path);
        }
        result
    }

    async fn transcribe_in(&self, scratch: &TempDir, audio: &[u8]) -> Result<String, Failure> {
        let ogg_path = scratch.path().join("voice.ogg");
        let wav_path = scratch.path().join("voice.wav");

        tokio::fs::write(&ogg_path, audio)
            .await
            .map_err(|e| Failure::Unexpected(format!("failed to write clip: {e}")))?;
        debug!("Wrote {} bytes to {:?}", audio.len(), ogg_path);

        self.transcoder.transcode(&ogg_path, &wav_path).await?;

        let wav_data = tokio::fs::read(&wav_path)
            .await
            .map_err(|e| Failure::Unexpected(format!("failed to read converted clip: {e}")))?;

        let text = self.speech.transcribe(wav_data).await?;
        Ok(text.trim().to_string())
    }

    fn scratch_dir(&self) -> Result<TempDir, Failure> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("voice-");
        let dir = match self.scratch_root {
            Some(ref root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|e| Failure::Unexpected(format!("failed to create scratch dir: {e}")))
    }

    /// System prompt plus the user's text; the trimmed first answer, or "" when there is none.
    async fn complete(&self, text: &str) -> Result<String, openai::Error> {
        let messages = [Message::system(SYSTEM_PROMPT), Message::user(text)];
        let content = self.model.complete(&messages).await?;
        Ok(content.map(|c| c.trim().to_string()).unwrap_or_default())
    }

    async fn deliver(&self, chat_id: i64, text: &str) {
        match self.messenger.send_text(chat_id, text).await {
            Ok(()) => debug!("Replied in chat {chat_id} ({} chars)", text.chars().count()),
            Err(e) => warn!("Reply to chat {chat_id} was not delivered: {e}"),
        }
    }
}
