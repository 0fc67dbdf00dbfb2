pub mod config;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod recommender;
pub mod service;
pub mod storage;

pub use config::{LlmConfig, LogFormat, Settings};
pub use llm::{LlmClient, OpenRouterClient};
pub use recommender::{RecommendError, Recommender};
pub use service::{AppState, build_router, create_app};
pub use storage::{HistoryItem, HistoryStorage, InMemoryHistoryStorage, SqliteHistoryStorage};
