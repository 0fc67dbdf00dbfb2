use chrono::{DateTime, Utc};
use movie_card_parser::MovieCard;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

pub const MIN_INPUT_CHARS: usize = 2;
pub const MAX_INPUT_CHARS: usize = 500;
pub const MAX_RECOMMENDATIONS: usize = 5;
pub const MAX_BATCH_REQUESTS: usize = 10;
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
pub const MAX_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Mood, occasion or taste described by the user
    pub user_input: String,
    #[serde(default = "default_recommendations")]
    pub num_recommendations: usize,
}

fn default_recommendations() -> usize {
    1
}

impl RecommendRequest {
    /// Checks the request bounds and returns the card count to ask for.
    pub fn validate(&self) -> Result<NonZeroUsize, String> {
        let chars = self.user_input.trim().chars().count();
        if !(MIN_INPUT_CHARS..=MAX_INPUT_CHARS).contains(&chars) {
            return Err(format!(
                "user_input must be between {MIN_INPUT_CHARS} and {MAX_INPUT_CHARS} characters"
            ));
        }

        NonZeroUsize::new(self.num_recommendations)
            .filter(|n| n.get() <= MAX_RECOMMENDATIONS)
            .ok_or_else(|| {
                format!("num_recommendations must be between 1 and {MAX_RECOMMENDATIONS}")
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendData {
    pub cards: Vec<MovieCard>,
    pub request_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub success: bool,
    pub data: RecommendData,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RecommendResponse {
    pub fn success(cards: Vec<MovieCard>, request_text: String) -> Self {
        Self {
            success: true,
            data: RecommendData {
                cards,
                request_text,
            },
            error: None,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<MovieCard>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    pub results: Vec<BatchItemResult>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub llm_provider: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}
