//! OpenAI-compatible HTTP provider for chat completions and embeddings.
//!
//! Works against api.openai.com or any local server speaking the same
//! protocol (LM Studio, llama.cpp server, vLLM). The base URL, model ids
//! and timeout come from `AppConfig`; the bearer key is optional because
//! local servers usually ignore it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::AppConfig;
use crate::core::errors::{EmbedError, GenerationError};

use super::provider::{Embedder, Generator};
use super::types::ChatMessage;

const SYSTEM_PROMPT: &str =
    "You are Mentora, a helpful educational assistant. Provide clear, accurate, and educational responses.";
const TEMPERATURE: f64 = 0.7;

#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: Option<String>,
    chat_model: String,
    embedding_model: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        OpenAiProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            client,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }
}

#[async_trait]
impl Generator for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, GenerationError> {
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
        let body = json!({
            "model": self.chat_model,
            "messages": messages,
            "temperature": TEMPERATURE,
            "max_tokens": max_tokens,
            "stream": false,
        });

        let res = self.post("/v1/chat/completions").json(&body).send().await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(GenerationError::Provider(format!(
                "chat completion returned {}: {}",
                status, text
            )));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                GenerationError::Malformed("response carries no message content".to_string())
            })
    }
}

#[async_trait]
impl Embedder for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let body = json!({
            "model": self.embedding_model,
            "input": [text],
        });

        let res = self.post("/v1/embeddings").json(&body).send().await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(EmbedError::Provider(format!(
                "embeddings endpoint returned {}: {}",
                status, text
            )));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| EmbedError::Malformed(e.to_string()))?;

        let values = payload["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| EmbedError::Malformed("response carries no embedding".to_string()))?;

        let vector: Vec<f32> = values
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();

        if vector.len() != values.len() || vector.is_empty() {
            return Err(EmbedError::Malformed(
                "embedding contains non-numeric entries".to_string(),
            ));
        }

        Ok(vector)
    }
}
