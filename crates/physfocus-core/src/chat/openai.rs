//! OpenAI-compatible `/chat/completions` backend.
//!
//! Also covers search-augmented providers that return citations next to
//! `choices`, either as bare URLs or as `search_results` entries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::backend::{check_status, ChatBackend};
use super::types::{Completion, PromptTurn, Role, Source};
use crate::error::ChatError;

pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl OpenAiBackend {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        api_key_env: &str,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            api_key_env: api_key_env.to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn send_chat_completion(
        &self,
        system_prompt: &str,
        turns: &[PromptTurn],
    ) -> Result<Completion, ChatError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ChatError::MissingApiKey {
            env_var: self.api_key_env.clone(),
        })?;

        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(Message {
            role: "system",
            content: system_prompt.to_string(),
        });
        messages.extend(turns.iter().map(|turn| Message {
            role: match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: turn.text.clone(),
        }));

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        let parsed: ChatCompletionResponse = check_status(response).await?.json().await?;
        Ok(parsed.into_completion())
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    citations: Vec<String>,
    #[serde(default)]
    search_results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct SearchResult {
    title: Option<String>,
    url: String,
}

impl ChatCompletionResponse {
    fn into_completion(self) -> Completion {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let citations = if self.search_results.is_empty() {
            self.citations
                .into_iter()
                .map(|uri| Source {
                    title: uri.clone(),
                    uri,
                })
                .collect()
        } else {
            self.search_results
                .into_iter()
                .map(|r| Source {
                    title: r.title.unwrap_or_else(|| r.url.clone()),
                    uri: r.url,
                })
                .collect()
        };

        Completion { text, citations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_completion_has_no_citations() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"τ = r × F"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let completion = parsed.into_completion();
        assert_eq!(completion.text, "τ = r × F");
        assert!(completion.citations.is_empty());
    }

    #[test]
    fn bare_citation_urls_become_sources() {
        let body = r#"{"choices":[{"message":{"content":"x"}}],"citations":["https://a.example"]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let completion = parsed.into_completion();
        assert_eq!(completion.citations[0].title, "https://a.example");
    }

    #[test]
    fn search_results_take_precedence() {
        let body = r#"{
            "choices":[{"message":{"content":"x"}}],
            "citations":["https://a.example"],
            "search_results":[{"title":"Hyperphysics","url":"https://b.example"}]
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let completion = parsed.into_completion();
        assert_eq!(
            completion.citations,
            vec![Source {
                title: "Hyperphysics".into(),
                uri: "https://b.example".into()
            }]
        );
    }

    #[test]
    fn null_content_is_empty_text() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.into_completion().text.is_empty());
    }
}
