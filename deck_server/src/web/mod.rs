//! Web server for the deck API
//!
//! Provides REST endpoints for deck CRUD, deck import, the mock social feed,
//! and the shared-secret GPT action endpoints. Every response uses the same
//! `{success, data, error, message}` envelope.

mod decks;
mod gpts;
mod social;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::cache::DeckCache;
use crate::config::Config;
use crate::error::ApiError;
use crate::posts::PostFeed;

pub use social::USER_HEADER;

/// Shared application state (deck cache + in-memory post feed)
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DeckCache>,
    pub posts: Arc<PostFeed>,
    pub gpt_api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(cache: DeckCache, gpt_api_key: Option<String>) -> Self {
        Self {
            cache: Arc::new(cache),
            posts: Arc::new(PostFeed::new()),
            gpt_api_key: gpt_api_key.map(Arc::from),
        }
    }
}

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

/// Handler result: envelope on success, `ApiError` envelope on failure
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Unwrap a JSON body, turning extractor rejections into 400s
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Validate a file name taken from the URL
fn checked_file_name(file_name: &str) -> Result<&str, ApiError> {
    if deck_common::is_valid_file_name(file_name) {
        Ok(file_name)
    } else {
        Err(ApiError::BadRequest(format!("Invalid deck file name: {}", file_name)))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    store: &'static str,
}

/// GET /api/health
async fn health_handler(State(state): State<AppState>) -> Json<ApiResponse<Health>> {
    Json(ApiResponse::ok(Health {
        status: "ok",
        store: state.cache.backend_name(),
    }))
}

/// Build the web server router
///
/// Non-API paths are served from `static_dir` when one is given.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/decks", get(decks::list_decks).post(decks::create_deck))
        .route("/api/decks/import", post(decks::import_deck))
        .route("/api/decks/post", post(social::post_deck))
        .route("/api/decks/public", get(social::public_posts))
        .route("/api/decks/my-posts", get(social::my_posts))
        .route("/api/decks/unpost/{post_id}", delete(social::unpost_deck))
        .route(
            "/api/decks/like/{post_id}",
            post(social::like_post).delete(social::unlike_post),
        )
        .route(
            "/api/decks/{file_name}",
            get(decks::get_deck)
                .put(decks::update_deck)
                .delete(decks::delete_deck),
        )
        .route(
            "/api/gpts/decks",
            get(gpts::list_decks).post(gpts::create_deck),
        );

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(CorsLayer::permissive()).with_state(state)
}

/// Start the web server (async)
///
/// Seeds the deck cache before accepting requests, then serves until Ctrl-C.
pub async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let cache = DeckCache::from_config(&config)?;
    if let Err(e) = cache.ensure_seeded().await {
        log::warn!("Deck cache not seeded at startup, retrying on first request: {}", e);
    }

    if config.gpt_api_key.is_none() {
        log::warn!("No GPT API key configured, /api/gpts endpoints will reject all requests");
    }

    let state = AppState::new(cache, config.gpt_api_key.clone());
    let app = create_router(state, config.static_dir.as_deref());
    let addr = config.addr();

    log::info!("Deck API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutdown signal received");
}
