use movie_card_parser::{MovieCard, ParseOptions, PipelineError, parse_recommendations};
use std::num::NonZeroUsize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::llm::LlmClient;
use crate::prompt::{SYSTEM_PROMPT, user_prompt};

/// Characters of the raw answer echoed into the logs
const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("LLM completion failed: {0}")]
    Completion(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Prompts the model and runs its answer through the card pipeline
pub struct Recommender {
    client: Arc<dyn LlmClient>,
    options: ParseOptions,
}

impl Recommender {
    pub fn new(client: Arc<dyn LlmClient>, options: ParseOptions) -> Self {
        Self { client, options }
    }

    pub fn provider(&self) -> &str {
        self.client.provider()
    }

    pub async fn recommend(
        &self,
        user_input: &str,
        count: NonZeroUsize,
    ) -> Result<Vec<MovieCard>, RecommendError> {
        info!(count = count.get(), "Generating recommendations for: {}", user_input);

        let prompt = user_prompt(user_input, count.get());
        let answer = self
            .client
            .complete(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| {
                error!(error = %e, "LLM completion failed");
                RecommendError::Completion(e.to_string())
            })?;

        info!(preview = %preview(&answer), "LLM answered");

        let cards = parse_recommendations(&answer, count, &self.options).inspect_err(|e| {
            error!(
                error = %e,
                substring = e.substring().unwrap_or_default(),
                "Could not turn LLM answer into cards"
            );
        })?;

        info!(cards = cards.len(), "Generated recommendations");
        Ok(cards)
    }
}

fn preview(answer: &str) -> &str {
    match answer.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => &answer[..cut],
        None => answer,
    }
}
