//! Deck CRUD and import handlers

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State,
    },
    http::StatusCode,
    response::Json,
};
use deck_common::{file_name_for, Deck, DeckInfo, DeckInput};
use serde::Serialize;
use uuid::Uuid;

use super::{checked_file_name, json_body, ApiResponse, ApiResult, AppState};
use crate::error::ApiError;

/// File names that collide with fixed `/api/decks/...` routes
const RESERVED_FILE_NAMES: &[&str] = &["import", "post", "public", "my-posts"];

/// Multipart field carrying the uploaded deck
const IMPORT_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedDeck {
    file_name: String,
}

/// Assign an id, derive the file name, and store a new deck
///
/// Shared by create, import, and the GPT create endpoint.
pub(super) async fn create_from_input(
    state: &AppState,
    input: DeckInput,
) -> Result<DeckInfo, ApiError> {
    let deck = input.into_deck(|| Uuid::new_v4().to_string());
    deck.validate()?;

    let file_name = file_name_for(&deck);
    if RESERVED_FILE_NAMES.contains(&file_name.as_str()) {
        return Err(ApiError::Conflict(format!(
            "Deck file name is reserved: {}",
            file_name
        )));
    }
    if state.cache.contains(&file_name).await? {
        return Err(ApiError::Conflict(format!(
            "A deck with file name {} already exists",
            file_name
        )));
    }

    state.cache.add_one(&file_name, &deck).await?;
    log::info!("Created deck {} ({})", file_name, deck.id);

    Ok(DeckInfo { file_name, deck })
}

/// GET /api/decks
pub async fn list_decks(State(state): State<AppState>) -> ApiResult<Vec<DeckInfo>> {
    let decks = state.cache.get_all().await?;
    Ok(Json(ApiResponse::ok(decks)))
}

/// POST /api/decks
pub async fn create_deck(
    State(state): State<AppState>,
    payload: Result<Json<DeckInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<DeckInfo>>), ApiError> {
    let input = json_body(payload)?;
    let info = create_from_input(&state, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(info).with_message("Deck created")),
    ))
}

/// GET /api/decks/{file_name}
pub async fn get_deck(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> ApiResult<DeckInfo> {
    let file_name = checked_file_name(&file_name)?;

    match state.cache.get_one(file_name).await? {
        Some(deck) => Ok(Json(ApiResponse::ok(DeckInfo {
            file_name: file_name.to_string(),
            deck,
        }))),
        None => Err(ApiError::NotFound(format!("Deck not found: {}", file_name))),
    }
}

/// PUT /api/decks/{file_name}
///
/// Replaces the deck wholesale. The file name and the stored id never change.
pub async fn update_deck(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
    payload: Result<Json<DeckInput>, JsonRejection>,
) -> ApiResult<DeckInfo> {
    let file_name = checked_file_name(&file_name)?.to_string();
    let input = json_body(payload)?;

    let existing = state
        .cache
        .get_one(&file_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deck not found: {}", file_name)))?;

    if let Some(id) = input.id.as_deref().filter(|id| *id != existing.id) {
        log::debug!("Ignoring id {} in update of {}, keeping {}", id, file_name, existing.id);
    }

    let deck = Deck {
        id: existing.id,
        title: input.title,
        description: input.description,
        concepts: input.concepts,
    };
    deck.validate()?;
    state.cache.add_one(&file_name, &deck).await?;

    Ok(Json(
        ApiResponse::ok(DeckInfo { file_name, deck }).with_message("Deck updated"),
    ))
}

/// DELETE /api/decks/{file_name}
pub async fn delete_deck(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> ApiResult<DeletedDeck> {
    let file_name = checked_file_name(&file_name)?.to_string();

    if !state.cache.delete_one(&file_name).await? {
        return Err(ApiError::NotFound(format!("Deck not found: {}", file_name)));
    }
    state.posts.remove_for_deck(&file_name).await;

    Ok(Json(
        ApiResponse::ok(DeletedDeck { file_name }).with_message("Deck deleted"),
    ))
}

/// POST /api/decks/import
///
/// Multipart upload with a `file` field holding one deck as JSON.
pub async fn import_deck(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApiResponse<DeckInfo>>), ApiError> {
    let mut multipart = multipart.map_err(|r| ApiError::BadRequest(r.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMPORT_FIELD) {
            continue;
        }
        let source = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        upload = Some((source, bytes));
        break;
    }

    let (source, bytes) = upload.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing multipart field '{}'", IMPORT_FIELD))
    })?;

    let input: DeckInput = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid deck file {}: {}", source, e)))?;
    let info = create_from_input(&state, input).await?;
    log::info!("Imported deck {} from {}", info.file_name, source);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(info).with_message("Deck imported")),
    ))
}
