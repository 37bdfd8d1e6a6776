use airdesk_core::ChatMessage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::OpenAiRuntimeConfig;

pub const EMPTY_COMPLETION_REPLY: &str = "Sorry, I could not generate a response.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("completion rate limit exceeded")]
    RateLimited,
    #[error("completion credentials rejected")]
    InvalidAuth,
    #[error("completion service unavailable")]
    Unavailable,
    #[error("{0}")]
    Other(String),
}

impl CompletionError {
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited => "Rate limit exceeded. You have exceeded your OpenAI API quota. Please check your billing and plan details at https://platform.openai.com/account/billing".to_string(),
            Self::InvalidAuth => "Invalid API key. Please check your API key in the .env file.".to_string(),
            Self::Unavailable => "OpenAI service is temporarily unavailable. Please try again later.".to_string(),
            Self::Other(message) if message.trim().is_empty() => {
                "Error communicating with OpenAI API. Please try again later.".to_string()
            }
            Self::Other(message) => message.clone(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::RateLimited => 429,
            Self::InvalidAuth => 401,
            Self::Unavailable | Self::Other(_) => 500,
        }
    }

    fn from_status(status: StatusCode, body: &str) -> Self {
        match status.as_u16() {
            429 => Self::RateLimited,
            401 => Self::InvalidAuth,
            500..=599 => Self::Unavailable,
            code if body.contains("insufficient_quota") => {
                debug!(status = code, "quota error reported without 429");
                Self::RateLimited
            }
            code => Self::Other(format!(
                "completion request failed with status {code}: {body}"
            )),
        }
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError>;
}

/// Client for any OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompletionClient {
    client: Client,
    runtime: OpenAiRuntimeConfig,
}

impl OpenAiCompletionClient {
    pub fn new(runtime: OpenAiRuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(runtime.request_timeout)
            .build()
            .context("failed to build completion client")?;
        Ok(Self { client, runtime })
    }

    pub fn model(&self) -> &str {
        &self.runtime.model
    }

    /// Sends a tiny request to confirm the credentials are accepted.
    pub async fn probe(&self) -> Result<(), CompletionError> {
        self.generate(
            "Reply with the single word OK.",
            &[ChatMessage::user("ping")],
        )
        .await
        .map(|_| ())
    }

    fn payload(&self, system_prompt: &str, messages: &[ChatMessage]) -> Value {
        let mut conversation = vec![json!({ "role": "system", "content": system_prompt })];
        conversation.extend(
            messages
                .iter()
                .map(|message| json!({ "role": message.role, "content": message.content })),
        );

        json!({
            "model": self.runtime.model,
            "messages": conversation,
            "temperature": self.runtime.temperature,
            "max_tokens": self.runtime.max_tokens,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    #[instrument(skip_all, fields(model = %self.runtime.model, messages = messages.len()))]
    async fn generate(
        &self,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.runtime.base_url))
            .bearer_auth(self.runtime.api_key.as_str())
            .json(&self.payload(system_prompt, messages))
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() || err.is_timeout() {
                    CompletionError::Unavailable
                } else {
                    CompletionError::Other(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::from_status(status, &body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| CompletionError::Other(format!("completion parse failed: {err}")))?;

        Ok(extract_completion_text(&body).unwrap_or_else(|| EMPTY_COMPLETION_REPLY.to_string()))
    }
}

fn extract_completion_text(payload: &Value) -> Option<String> {
    payload
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
        .filter(|text| !text.trim().is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::{Json, Router};
    use parking_lot::Mutex;

    use super::*;

    struct MockCompletions {
        status: AxumStatus,
        body: Value,
        seen: Mutex<Vec<Value>>,
    }

    async fn completions(
        State(mock): State<Arc<MockCompletions>>,
        Json(payload): Json<Value>,
    ) -> (AxumStatus, Json<Value>) {
        mock.seen.lock().push(payload);
        (mock.status, Json(mock.body.clone()))
    }

    async fn client_for(status: AxumStatus, body: Value) -> (OpenAiCompletionClient, Arc<MockCompletions>) {
        let mock = Arc::new(MockCompletions {
            status,
            body,
            seen: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(mock.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let runtime = OpenAiRuntimeConfig::new("sk-test", format!("http://{addr}"));
        (OpenAiCompletionClient::new(runtime).unwrap(), mock)
    }

    #[tokio::test]
    async fn system_prompt_precedes_conversation() {
        let (client, mock) = client_for(
            AxumStatus::OK,
            json!({ "choices": [{ "message": { "role": "assistant", "content": "Hello!" } }] }),
        )
        .await;

        let reply = client
            .generate("SYSTEM", &[ChatMessage::user("hi"), ChatMessage::assistant("hey"), ChatMessage::user("bags?")])
            .await
            .unwrap();
        assert_eq!(reply, "Hello!");

        let payload = mock.seen.lock()[0].clone();
        assert_eq!(payload["model"], "gpt-3.5-turbo");
        assert_eq!(payload["max_tokens"], 1000);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][0]["content"], "SYSTEM");
        assert_eq!(payload["messages"][3]["content"], "bags?");
    }

    #[tokio::test]
    async fn empty_choices_fall_back_to_apology() {
        let (client, _) = client_for(AxumStatus::OK, json!({ "choices": [] })).await;
        let reply = client.generate("SYSTEM", &[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(reply, EMPTY_COMPLETION_REPLY);
    }

    #[tokio::test]
    async fn upstream_statuses_map_to_error_classes() {
        let cases = [
            (AxumStatus::TOO_MANY_REQUESTS, CompletionError::RateLimited),
            (AxumStatus::UNAUTHORIZED, CompletionError::InvalidAuth),
            (AxumStatus::BAD_GATEWAY, CompletionError::Unavailable),
        ];
        for (status, expected) in cases {
            let (client, _) = client_for(status, json!({ "error": { "message": "nope" } })).await;
            let err = client.generate("SYSTEM", &[ChatMessage::user("hi")]).await.unwrap_err();
            assert_eq!(err, expected);
        }

        let (client, _) = client_for(AxumStatus::BAD_REQUEST, json!({ "error": "bad" })).await;
        let err = client.generate("SYSTEM", &[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, CompletionError::Other(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn user_messages_are_distinct_per_class() {
        assert!(CompletionError::RateLimited.user_message().starts_with("Rate limit exceeded"));
        assert!(CompletionError::InvalidAuth.user_message().starts_with("Invalid API key"));
        assert!(CompletionError::Unavailable.user_message().contains("temporarily unavailable"));
        assert_eq!(CompletionError::Other("boom".into()).user_message(), "boom");
        assert_eq!(CompletionError::RateLimited.status_code(), 429);
        assert_eq!(CompletionError::InvalidAuth.status_code(), 401);
    }
}
