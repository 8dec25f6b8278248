//! OpenAI REST client: chat completions and audio transcriptions.

use reqwest::StatusCode;
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

pub struct Client {
    api_key: String,
    base_url: String,
    completion_model: String,
    transcription_model: String,
    http: reqwest::Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl Client {
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            completion_model: config.completion_model.clone(),
            transcription_model: config.transcription_model.clone(),
            http: builder.build()?,
        })
    }

    /// Request one non-streaming completion. Returns the first choice's
    /// content, or `None` when the model produced nothing.
    pub async fn chat(&self, messages: &[Message]) -> Result<Option<String>, Error> {
        let request = ChatRequest {
            model: &self.completion_model,
            messages,
        };

        debug!(model = %self.completion_model, "Sending chat completion request");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let body = read_body(response).await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))?;

        Ok(first_choice_content(parsed))
    }

    /// Transcribe a WAV clip.
    pub async fn transcribe(&self, wav_data: Vec<u8>) -> Result<String, Error> {
        let file_part = multipart::Part::bytes(wav_data)
            .file_name("voice.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Parse(format!("mime: {e}")))?;

        let form = multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .part("file", file_part);

        debug!(model = %self.transcription_model, "Sending audio for transcription");

        let response = self
            .http
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let body = read_body(response).await?;
        let parsed: TranscriptionResponse =
            serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))?;

        Ok(parsed.text)
    }
}

/// Read the body of a response, turning non-2xx statuses into errors.
async fn read_body(response: reqwest::Response) -> Result<String, Error> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Connection(format!("failed to read response: {e}")))?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(error_for_status(status, &body))
    }
}

fn error_for_status(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED => Error::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(message),
        _ => Error::Api { status: status.as_u16(), message },
    }
}

fn first_choice_content(response: ChatResponse) -> Option<String> {
    response.choices.into_iter().next().and_then(|c| c.message.content)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Key rejected (401).
    Authentication(String),
    /// Rate limit or exhausted quota (429).
    RateLimited(String),
    /// Transport failure, including timeouts.
    Connection(String),
    /// Any other non-2xx answer.
    Api { status: u16, message: String },
    Parse(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Authentication(e) => write!(f, "authentication failed: {e}"),
            Error::RateLimited(e) => write!(f, "rate limited: {e}"),
            Error::Connection(e) => write!(f, "connection error: {e}"),
            Error::Api { status, message } => write!(f, "API error {status}: {message}"),
            Error::Parse(e) => write!(f, "parse error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_shape() {
        let messages = [Message::system("be strict"), Message::user("hi")];
        let request = ChatRequest { model: "gpt-4o-mini", messages: &messages };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "be strict"},
                    {"role": "user", "content": "hi"}
                ]
            })
        );
    }

    #[test]
    fn test_first_choice_content() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(parsed), Some("first".to_string()));
    }

    #[test]
    fn test_missing_content_is_none() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#)
                .unwrap();
        assert_eq!(first_choice_content(parsed), None);

        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(first_choice_content(parsed), None);

        let parsed: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(first_choice_content(parsed), None);
    }

    #[test]
    fn test_transcription_response() {
        let parsed: TranscriptionResponse = serde_json::from_str(r#"{"text": " hello "}"#).unwrap();
        assert_eq!(parsed.text, " hello ");

        let parsed: TranscriptionResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.text.is_empty());
    }

    #[test]
    fn test_error_classification() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(
            error_for_status(StatusCode::UNAUTHORIZED, body),
            Error::Authentication("Incorrect API key provided".to_string())
        );

        let body = r#"{"error": {"message": "You exceeded your current quota", "code": "insufficient_quota"}}"#;
        assert_eq!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, body),
            Error::RateLimited("You exceeded your current quota".to_string())
        );

        assert_eq!(
            error_for_status(StatusCode::BAD_GATEWAY, "upstream down\n"),
            Error::Api { status: 502, message: "upstream down".to_string() }
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::Api { status: 500, message: "boom".to_string() };
        assert_eq!(err.to_string(), "API error 500: boom");
        assert_eq!(Error::Connection("refused".into()).to_string(), "connection error: refused");
    }
}
