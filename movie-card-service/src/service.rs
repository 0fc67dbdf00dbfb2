use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::llm::{LlmClient, OpenRouterClient};
use crate::models::{
    BatchItemResult, BatchResponse, HealthResponse, HistoryQuery, MAX_BATCH_REQUESTS,
    RecommendRequest, RecommendResponse,
};
use crate::recommender::{RecommendError, Recommender};
use crate::storage::{HistoryItem, HistoryStorage, InMemoryHistoryStorage, SqliteHistoryStorage};

pub const SERVICE_NAME: &str = "movie-card-service";
const CORRELATION_HEADER: &str = "x-correlation-id";
const UNAVAILABLE_MESSAGE: &str = "Recommendations are temporarily unavailable, please try again later";

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn unprocessable_error(message: &str) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "success": false,
            "error": message,
            "message": "Invalid request"
        })),
    )
}

fn unavailable_error(e: &RecommendError) -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "success": false,
            "error": e.to_string(),
            "message": UNAVAILABLE_MESSAGE
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": message,
            "details": details
        })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub history: Arc<dyn HistoryStorage>,
}

impl AppState {
    pub fn new(recommender: Recommender, history: Arc<dyn HistoryStorage>) -> Self {
        Self {
            recommender: Arc::new(recommender),
            history,
        }
    }
}

/// Wires the OpenRouter client and history storage described by `settings`.
pub async fn create_app(settings: &Settings) -> Router {
    let client: Arc<dyn LlmClient> = Arc::new(OpenRouterClient::new(settings.llm.clone()));
    let recommender = Recommender::new(client, settings.parse_options());
    let history = create_history_storage(settings.database_url.as_deref()).await;

    build_router(AppState::new(recommender, history))
}

async fn create_history_storage(database_url: Option<&str>) -> Arc<dyn HistoryStorage> {
    let Some(database_url) = database_url else {
        info!("Using in-memory history storage (set DATABASE_URL to use SQLite)");
        return Arc::new(InMemoryHistoryStorage::new());
    };

    match SqliteHistoryStorage::connect(database_url).await {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            error!(
                "Failed to open SQLite history: {}. Falling back to in-memory storage.",
                e
            );
            Arc::new(InMemoryHistoryStorage::new())
        }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/v1/recommend", post(recommend))
        .route("/api/v1/recommend/examples", get(recommend_examples))
        .route("/api/v1/recommend/batch", post(recommend_batch))
        .route("/api/v1/history", get(history))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tags every request with a correlation id, both in a tracing span and in
/// the response headers.
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&correlation_id).ok();

    if let Some(value) = &header {
        request.headers_mut().insert(CORRELATION_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the movie recommendation card API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /api/v1/recommend": "Generate recommendation cards",
            "GET /api/v1/recommend/examples": "Sample requests",
            "POST /api/v1/recommend/batch": "Generate cards for several requests",
            "GET /api/v1/history": "Recently generated cards",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_provider: state.recommender.provider().to_string(),
    })
}

async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> ApiResult<RecommendResponse> {
    let count = request.validate().map_err(|e| unprocessable_error(&e))?;
    let user_input = request.user_input.trim();

    let cards = state
        .recommender
        .recommend(user_input, count)
        .await
        .map_err(|e| {
            error!(error = %e, "Recommendation failed");
            unavailable_error(&e)
        })?;

    // History is best effort: a storage failure must not cost the user the cards
    if let Err(e) = state.history.save(user_input, &cards).await {
        warn!(error = %e, "Failed to save recommendation history");
    }

    Ok(Json(RecommendResponse::success(cards, user_input.to_string())))
}

async fn recommend_examples() -> Json<Value> {
    Json(json!({
        "examples": [
            { "user_input": "I want a science fiction movie about artificial intelligence", "num_recommendations": 1 },
            { "user_input": "Just went through a breakup and want a good cry", "num_recommendations": 2 },
            { "user_input": "A light comedy for the weekend", "num_recommendations": 3 },
            { "user_input": "Classic sci-fi from the 80s", "num_recommendations": 1 },
            { "user_input": "Something in the style of The Matrix", "num_recommendations": 2 }
        ]
    }))
}

/// Runs each request in turn; one failing request does not fail the others.
async fn recommend_batch(
    State(state): State<AppState>,
    Json(requests): Json<Vec<RecommendRequest>>,
) -> ApiResult<BatchResponse> {
    if requests.len() > MAX_BATCH_REQUESTS {
        return Err(unprocessable_error(&format!(
            "at most {MAX_BATCH_REQUESTS} requests per batch"
        )));
    }

    info!(requests = requests.len(), "Processing recommendation batch");

    let mut results = Vec::with_capacity(requests.len());
    for (index, request) in requests.iter().enumerate() {
        let outcome = match request.validate() {
            Ok(count) => state
                .recommender
                .recommend(request.user_input.trim(), count)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e),
        };

        results.push(match outcome {
            Ok(cards) => BatchItemResult {
                index,
                success: true,
                cards: Some(cards),
                error: None,
            },
            Err(e) => {
                warn!(index, error = %e, "Batch item failed");
                BatchItemResult {
                    index,
                    success: false,
                    cards: None,
                    error: Some(e),
                }
            }
        });
    }

    Ok(Json(BatchResponse {
        success: results.iter().all(|r| r.success),
        results,
        timestamp: chrono::Utc::now(),
    }))
}

async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<HistoryItem>> {
    let items = state.history.recent(query.limit()).await.map_err(|e| {
        error!("Failed to load history: {}", e);
        internal_error("Failed to load history", &e.to_string())
    })?;
    Ok(Json(items))
}
