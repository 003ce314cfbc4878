// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! Chat-completion API client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::CompletionConfig;
use crate::{Result, TidyDriveError};

/// Seam over the completion service so AI-backed features can be
/// exercised without the network
#[async_trait]
pub trait Completer: Send + Sync {
    /// Run one non-streaming completion over a full message history
    async fn complete_messages(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<String>;

    /// Convenience wrapper for a single system + user exchange
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let messages = vec![
            ChatMessage { role: "system".to_string(), content: system.to_string() },
            ChatMessage { role: "user".to_string(), content: user.to_string() },
        ];
        self.complete_messages(messages, temperature).await
    }
}

/// Chat-completion service client
pub struct CompletionClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
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

impl CompletionClient {
    /// Create a client if an API key is configured; `None` disables
    /// every AI-backed feature
    pub fn from_config(config: &CompletionConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Some(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Quick reachability probe against the completion endpoint
    pub async fn health_check(&self) -> Result<()> {
        self.client
            .get(&self.api_url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                TidyDriveError::Completion(format!(
                    "Cannot reach completion service at {}: {}",
                    self.api_url, e
                ))
            })?;

        Ok(())
    }
}

#[async_trait]
impl Completer for CompletionClient {
    async fn complete_messages(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature,
            stream: false,
        };

        debug!("Sending completion request: model={}", self.model);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TidyDriveError::Completion(format!(
                "Completion service returned status {}",
                response.status()
            )));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_api_key_disables_client() {
        let config = CompletionConfig::default();
        assert!(config.api_key.is_none());
        assert!(CompletionClient::from_config(&config).is_none());
    }

    #[test]
    fn api_key_enables_client() {
        let config = CompletionConfig {
            api_key: Some("sk-test".to_string()),
            ..CompletionConfig::default()
        };
        assert!(CompletionClient::from_config(&config).is_some());
    }
}
