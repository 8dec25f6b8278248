//! Relay module - answers Telegram text and voice messages through OpenAI.

pub mod backend;
pub mod engine;
pub mod message;
pub mod prompt;
pub mod telegram;
pub mod transcode;


pub use backend::{ChatModel, Messenger, SpeechToText, Transcoder};
pub use engine::{Failure, Relay};
pub use message::{Content, IncomingMessage};
pub use telegram::TelegramClient;
pub use transcode::{Ffmpeg, TranscodeError};
