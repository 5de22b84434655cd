//! The one seam between the doubt client and whichever LLM API is configured.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::gemini::GeminiBackend;
use super::openai::OpenAiBackend;
use super::types::{Completion, PromptTurn};
use crate::error::ChatError;
use crate::storage::{ChatConfig, ChatProvider};

/// A single-shot chat completion API.
///
/// Implementations issue exactly one request per call: no retries, no
/// streaming.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Identifier used in logs (e.g. "gemini").
    fn name(&self) -> &str;

    async fn send_chat_completion(
        &self,
        system_prompt: &str,
        turns: &[PromptTurn],
    ) -> Result<Completion, ChatError>;
}

/// Build the backend selected by `chat.provider`.
pub fn from_config(config: &ChatConfig) -> Arc<dyn ChatBackend> {
    let api_key = config.resolve_api_key();
    debug!(
        provider = ?config.provider,
        model = %config.model,
        endpoint = %config.base_url(),
        has_key = api_key.is_some(),
        "building chat backend"
    );
    match config.provider {
        ChatProvider::Gemini => Arc::new(GeminiBackend::new(
            config.base_url(),
            &config.model,
            api_key,
            &config.api_key_env,
        )),
        ChatProvider::OpenAi => Arc::new(OpenAiBackend::new(
            config.base_url(),
            &config.model,
            api_key,
            &config.api_key_env,
        )),
    }
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Pass 2xx responses through; map everything else onto the chat taxonomy.
pub(crate) async fn check_status(response: Response) -> Result<Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(map_http_error(status, &body))
}

pub(crate) fn map_http_error(status: StatusCode, body: &str) -> ChatError {
    let (message, api_status) = match serde_json::from_str::<ErrorWrapper>(body) {
        Ok(wrapper) => (
            wrapper.error.message.unwrap_or_else(|| body.to_string()),
            wrapper.error.status.unwrap_or_default(),
        ),
        Err(_) => (body.to_string(), String::new()),
    };

    if status == StatusCode::TOO_MANY_REQUESTS || api_status == "RESOURCE_EXHAUSTED" {
        return ChatError::RateLimited(message);
    }
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || (status == StatusCode::BAD_REQUEST && message.contains("API key"))
    {
        return ChatError::InvalidCredentials {
            status: status.as_u16(),
        };
    }
    ChatError::Transport {
        status: Some(status.as_u16()),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_rate_limited() {
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, ChatError::RateLimited(m) if m == "slow down"));
    }

    #[test]
    fn resource_exhausted_body_is_rate_limited() {
        let body = r#"{"error":{"code":400,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, ChatError::RateLimited(m) if m == "Quota exceeded"));
    }

    #[test]
    fn rejected_key_is_invalid_credentials() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            map_http_error(StatusCode::BAD_REQUEST, body),
            ChatError::InvalidCredentials { status: 400 }
        ));
        assert!(matches!(
            map_http_error(StatusCode::UNAUTHORIZED, ""),
            ChatError::InvalidCredentials { status: 401 }
        ));
    }

    #[test]
    fn server_error_is_transport() {
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>");
        assert!(matches!(
            err,
            ChatError::Transport { status: Some(503), ref message } if message == "<html>down</html>"
        ));
    }

    #[test]
    fn from_config_picks_provider() {
        let mut config = ChatConfig::default();
        assert_eq!(from_config(&config).name(), "gemini");
        config.provider = ChatProvider::OpenAi;
        assert_eq!(from_config(&config).name(), "openai");
    }
}
