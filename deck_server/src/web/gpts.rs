//! GPT action endpoints, guarded by the shared API key

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use deck_common::{DeckInfo, DeckInput};

use super::decks::create_from_input;
use super::{json_body, ApiResponse, ApiResult, AppState};
use crate::auth::check_api_key;
use crate::error::ApiError;

/// GET /api/gpts/decks
pub async fn list_decks(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Vec<DeckInfo>> {
    check_api_key(&headers, state.gpt_api_key.as_deref())?;

    let decks = state.cache.get_all().await?;
    Ok(Json(ApiResponse::ok(decks)))
}

/// POST /api/gpts/decks
pub async fn create_deck(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DeckInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<DeckInfo>>), ApiError> {
    check_api_key(&headers, state.gpt_api_key.as_deref())?;

    let input = json_body(payload)?;
    let info = create_from_input(&state, input).await?;
    log::info!("GPT action created deck {}", info.file_name);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(info).with_message("Deck created")),
    ))
}
