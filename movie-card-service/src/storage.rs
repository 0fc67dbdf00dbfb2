use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use movie_card_parser::MovieCard;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not encode or decode stored cards: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// One past recommendation request and the cards it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: i64,
    pub query: String,
    pub cards: Vec<MovieCard>,
    pub created_at: DateTime<Utc>,
}

/// Trait for storing and listing recommendation history
#[async_trait]
pub trait HistoryStorage: Send + Sync {
    /// Stores the cards generated for `query` and returns the new entry id.
    async fn save(&self, query: &str, cards: &[MovieCard]) -> Result<i64>;
    /// Newest entries first.
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryItem>>;
}

/// In-memory implementation of HistoryStorage
pub struct InMemoryHistoryStorage {
    items: Arc<DashMap<i64, HistoryItem>>,
    next_id: AtomicI64,
}

impl InMemoryHistoryStorage {
    pub fn new() -> Self {
        Self {
            items: Arc::new(DashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryHistoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStorage for InMemoryHistoryStorage {
    async fn save(&self, query: &str, cards: &[MovieCard]) -> Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.items.insert(
            id,
            HistoryItem {
                id,
                query: query.to_string(),
                cards: cards.to_vec(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryItem>> {
        let mut items: Vec<HistoryItem> =
            self.items.iter().map(|entry| entry.value().clone()).collect();
        items.sort_by(|a, b| b.id.cmp(&a.id));
        items.truncate(limit);
        Ok(items)
    }
}

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS recommendations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    query TEXT NOT NULL,
    movies TEXT NOT NULL,
    created_at TEXT NOT NULL
)"#;

/// SQLite implementation of HistoryStorage. Cards are stored as a JSON
/// array next to the query text.
pub struct SqliteHistoryStorage {
    pool: SqlitePool,
}

impl SqliteHistoryStorage {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = pool_options(database_url).connect_with(options).await?;

        let storage = Self { pool };
        storage.migrate().await?;
        info!("Connected to SQLite history storage");
        Ok(storage)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStorage for SqliteHistoryStorage {
    async fn save(&self, query: &str, cards: &[MovieCard]) -> Result<i64> {
        let movies = serde_json::to_string(cards)?;
        let result = sqlx::query(
            "INSERT INTO recommendations (query, movies, created_at) VALUES (?, ?, ?)",
        )
        .bind(query)
        .bind(movies)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryItem>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT id, query, movies, created_at FROM recommendations ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<HistoryItem> {
                let movies: String = row.try_get("movies")?;
                let created_at: String = row.try_get("created_at")?;
                Ok(HistoryItem {
                    id: row.try_get("id")?,
                    query: row.try_get("query")?,
                    cards: serde_json::from_str(&movies)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
                })
            })
            .collect()
    }
}

fn pool_options(database_url: &str) -> SqlitePoolOptions {
    if !database_url.contains(":memory:") {
        return SqlitePoolOptions::new().max_connections(5);
    }

    // An in-memory database lives exactly as long as its one connection, so
    // that connection is never recycled
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}
