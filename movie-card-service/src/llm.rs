use async_trait::async_trait;
use rig::completion::Prompt;
use rig::prelude::*;
use rig::providers::openrouter;
use tracing::debug;

use crate::config::LlmConfig;

pub const PROVIDER_NAME: &str = "OpenRouter";

/// Anything that can turn a system + user prompt into raw answer text.
///
/// The recommender only depends on this trait, so tests can swap in a
/// canned implementation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String>;

    /// Human-readable provider name for health reporting
    fn provider(&self) -> &str {
        PROVIDER_NAME
    }
}

/// Chat completion through OpenRouter
pub struct OpenRouterClient {
    client: openrouter::Client,
    config: LlmConfig,
}

impl OpenRouterClient {
    pub fn new(config: LlmConfig) -> Self {
        let client = openrouter::Client::new(&config.api_key);
        Self { client, config }
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        debug!(model = %self.config.model, "Sending completion request");

        let agent = self
            .client
            .agent(&self.config.model)
            .preamble(system_prompt)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .build();

        let response = agent.prompt(user_prompt).await?;
        Ok(response)
    }
}
