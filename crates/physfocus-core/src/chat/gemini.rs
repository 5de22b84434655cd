//! Gemini REST backend (`models/{model}:generateContent`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::backend::{check_status, ChatBackend};
use super::types::{Completion, PromptTurn, Role, Source};
use crate::error::ChatError;

pub struct GeminiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiBackend {
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

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn send_chat_completion(
        &self,
        system_prompt: &str,
        turns: &[PromptTurn],
    ) -> Result<Completion, ChatError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ChatError::MissingApiKey {
            env_var: self.api_key_env.clone(),
        })?;

        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
            contents: merge_turns(turns),
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;
        let parsed: GenerateContentResponse = check_status(response).await?.json().await?;
        Ok(parsed.into_completion())
    }
}

/// Gemini wants alternating roles starting with the user; leading model
/// turns (a greeting) are dropped and adjacent turns from the same side are
/// folded into one content block.
fn merge_turns(turns: &[PromptTurn]) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::new();
    let first_user = turns
        .iter()
        .position(|t| t.role == Role::User)
        .unwrap_or(turns.len());
    for turn in &turns[first_user..] {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "model",
        };
        let part = Part {
            text: turn.text.clone(),
        };
        match contents.last_mut() {
            Some(last) if last.role.as_deref() == Some(role) => last.parts.push(part),
            _ => contents.push(Content {
                role: Some(role.to_string()),
                parts: vec![part],
            }),
        }
    }
    contents
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

impl GenerateContentResponse {
    /// First candidate's text parts joined; citations from its web
    /// grounding chunks that carry both a title and a URI.
    fn into_completion(self) -> Completion {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Completion::default();
        };

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let citations = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| {
                let web = chunk.web?;
                Some(Source {
                    title: web.title?,
                    uri: web.uri?,
                })
            })
            .collect();

        Completion { text, citations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_and_model_role() {
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "sys".into() }],
            },
            contents: merge_turns(&[
                PromptTurn::user("a"),
                PromptTurn::assistant("b"),
                PromptTurn::user("c"),
            ]),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn adjacent_same_role_turns_are_merged() {
        let contents = merge_turns(&[
            PromptTurn::user("q1"),
            PromptTurn::user("q2"),
            PromptTurn::assistant("a"),
        ]);
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].parts.len(), 2);
    }

    #[test]
    fn leading_model_turns_are_dropped() {
        let contents = merge_turns(&[
            PromptTurn::assistant("welcome"),
            PromptTurn::assistant("ask away"),
            PromptTurn::user("q1"),
        ]);
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role.as_deref(), Some("user"));
        assert_eq!(contents[0].parts[0].text, "q1");
    }

    #[test]
    fn completion_extracts_text_and_grounding() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "L = "}, {"text": "r × p"}]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://a.example", "title": "A"}},
                    {"web": {"uri": "https://b.example"}},
                    {"retrievedContext": {}}
                ]}
            }]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let completion = parsed.into_completion();
        assert_eq!(completion.text, "L = r × p");
        assert_eq!(
            completion.citations,
            vec![Source {
                title: "A".into(),
                uri: "https://a.example".into()
            }]
        );
    }

    #[test]
    fn no_candidates_yields_empty_completion() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert_eq!(parsed.into_completion(), Completion::default());
    }
}
