use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use abc_core::config::AgentConfig;

use crate::prompt::coherence_from_prompt;

/// Text-completion collaborator: prompt in, free text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Coherence under which the offline client asks for more entanglement.
const LOW_COHERENCE: f64 = 0.3;

/// Offline client that answers from the metrics embedded in the prompt.
pub struct HeuristicClient;

#[async_trait]
impl CompletionClient for HeuristicClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let persona = prompt.split_whitespace().next().unwrap_or("IA");
        let text = match coherence_from_prompt(prompt) {
            Some(c) if c < LOW_COHERENCE => format!(
                "{persona}: coherence {c:.4} is low. REINFORCE_ENTANGLEMENT and reduce rigidity."
            ),
            Some(c) => format!("{persona}: coherence {c:.4} holds. MAINTAIN_EQUILIBRIUM."),
            None => format!("{persona}: no coherence reading. Operation completed."),
        };
        Ok(text)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    text: Option<String>,
}

const DEFAULT_RESPONSE: &str = "Operation completed.";

/// JSON-over-HTTP completion endpoint.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpCompletionClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        }
    }

    /// Builds a client from configuration, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No completion endpoint configured"))?;
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(var = %config.api_key_env, "Completion API key not set");
        }
        Ok(Self::new(endpoint, config.model.clone(), api_key))
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        const REQUEST_TIMEOUT_SECS: u64 = 30;

        if prompt.is_empty() {
            return Err(anyhow::anyhow!("Prompt cannot be empty"));
        }

        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&CompletionRequest {
                model: &self.model,
                prompt,
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Completion request failed: {}", e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("Completion server returned error: {}", status));
        }

        let body: CompletionResponse = resp.json().await?;
        Ok(body
            .text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RESPONSE.to_string()))
    }
}
