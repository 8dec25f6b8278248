//! Inbound message types.

use teloxide::types::Message;

/// What the user sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    /// Voice note, referenced by its Telegram file id.
    Voice { file_id: String },
}

/// A message routed to one of the handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Chat ID where the reply goes (negative = group, positive = DM).
    pub chat_id: i64,
    pub content: Content,
}

impl IncomingMessage {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, content: Content::Text(text.into()) }
    }

    pub fn voice(chat_id: i64, file_id: impl Into<String>) -> Self {
        Self { chat_id, content: Content::Voice { file_id: file_id.into() } }
    }

    /// Extract a relayable message. Anything other than text or voice is `None`.
    pub fn from_telegram(msg: Message) -> Option<Self> {
        let chat_id = msg.chat.id.0;
        if let Some(text) = msg.text() {
            return Some(Self::text(chat_id, text));
        }
        msg.voice().map(|voice| Self::voice(chat_id, voice.file.id.0.clone()))
    }

    pub fn kind(&self) -> &'static str {
        match self.content {
            Content::Text(_) => "text",
            Content::Voice { .. } => "voice",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let msg = IncomingMessage::text(42, "hello");
        assert_eq!(msg.content, Content::Text("hello".to_string()));
        assert_eq!(msg.kind(), "text");

        let msg = IncomingMessage::voice(-100123, "AwACAgIAAxkBAAI");
        assert_eq!(msg.chat_id, -100123);
        assert_eq!(msg.kind(), "voice");
        assert!(matches!(msg.content, Content::Voice { ref file_id } if file_id == "AwACAgIAAxkBAAI"));
    }

    #[test]
    fn test_from_telegram_text() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "message_id": 7,
            "date": 1700000000,
            "chat": {"id": 555, "type": "private", "first_name": "Ann"},
            "from": {"id": 555, "is_bot": false, "first_name": "Ann"},
            "text": "I feel like giving in tonight"
        }))
        .unwrap();

        assert_eq!(
            IncomingMessage::from_telegram(msg),
            Some(IncomingMessage::text(555, "I feel like giving in tonight"))
        );
    }

    #[test]
    fn test_from_telegram_voice() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "message_id": 8,
            "date": 1700000000,
            "chat": {"id": 555, "type": "private", "first_name": "Ann"},
            "from": {"id": 555, "is_bot": false, "first_name": "Ann"},
            "voice": {
                "file_id": "voice-file-id",
                "file_unique_id": "uniq",
                "file_size": 2048,
                "duration": 3,
                "mime_type": "audio/ogg"
            }
        }))
        .unwrap();

        assert_eq!(IncomingMessage::from_telegram(msg), Some(IncomingMessage::voice(555, "voice-file-id")));
    }

    #[test]
    fn test_from_telegram_ignores_other_content() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "message_id": 9,
            "date": 1700000000,
            "chat": {"id": 555, "type": "private", "first_name": "Ann"},
            "from": {"id": 555, "is_bot": false, "first_name": "Ann"},
            "location": {"latitude": 55.75, "longitude": 37.61}
        }))
        .unwrap();

        assert_eq!(IncomingMessage::from_telegram(msg), None);
    }
}
