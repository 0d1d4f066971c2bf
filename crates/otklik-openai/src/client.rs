// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI chat completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use otklik_core::traits::ResponseGenerator;
use otklik_core::OtklikError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

const API_BASE_URL: &str = "https://api.openai.com";
const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Reply generator backed by OpenAI chat completions.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(api_key: &str, model: &str) -> Result<Self, OtklikError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| OtklikError::Config(format!("invalid OpenAI API key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("Authorization", auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| OtklikError::Generation {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            model: model.to_string(),
        })
    }

    /// Overrides the base URL (for wiremock tests).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl ResponseGenerator for OpenAiGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, OtklikError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OtklikError::Generation {
                message: format!("OpenAI request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| OtklikError::Generation {
            message: format!("failed to read OpenAI response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        if !status.is_success() {
            return Err(OtklikError::Generation {
                message: format!("OpenAI API returned {status}: {text}"),
                source: None,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| OtklikError::Generation {
                message: format!("failed to parse OpenAI response: {e}"),
                source: Some(Box::new(e)),
            })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(OtklikError::Generation {
                message: "OpenAI returned an empty completion".to_string(),
                source: None,
            });
        }
        debug!(model = %self.model, chars = content.len(), "generated reply draft");
        Ok(content)
    }
}
