//! Completion API client.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. The API key
//! is supplied per call because each dashboard user brings their own.

use crate::config::LlmConfig;
use crate::error::AnalysisError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// A backend that turns a prompt into completion text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, AnalysisError>;
}

/// Message in the chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completion API.
pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_url: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout_seconds: u64,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        info!("Using model {} at {}", config.model, config.api_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client for LLM API")?;

        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_seconds: config.timeout_seconds,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, AnalysisError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Sending completion request ({} prompt bytes)", prompt.len());

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Transport(format!(
                        "request timed out after {}s",
                        self.timeout_seconds
                    ))
                } else if e.is_connect() {
                    AnalysisError::Transport(format!("cannot connect to {}", self.api_url))
                } else {
                    AnalysisError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api { status, body });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| AnalysisError::InvalidResponse("no completion choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn_llm(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/", addr)
    }

    fn client_for(api_url: String) -> OpenAiClient {
        OpenAiClient::new(&LlmConfig {
            api_url,
            max_tokens: Some(64),
            ..LlmConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_sends_key_and_trims_text() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], "gpt-4o-mini");
                assert_eq!(body["max_tokens"], 64);
                assert_eq!(body["messages"][0]["content"], "hello");
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "\n  Hi there.  \n"}}]
                }))
            }),
        );
        let client = client_for(spawn_llm(app).await);

        let text = client.complete("sk-test", "hello").await.unwrap();
        assert_eq!(text, "Hi there.");
    }

    #[tokio::test]
    async fn test_complete_maps_error_status() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let client = client_for(spawn_llm(app).await);

        let err = client.complete("sk-wrong", "hello").await.unwrap_err();
        match err {
            AnalysisError::Api { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_choices() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let client = client_for(spawn_llm(app).await);

        let err = client.complete("sk-test", "hello").await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidResponse(_)));
    }
}
