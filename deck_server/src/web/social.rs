//! Mock social feed handlers (post, unpost, like, feeds)

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::Json,
};
use serde::Deserialize;

use super::{checked_file_name, json_body, ApiResponse, ApiResult, AppState};
use crate::error::ApiError;
use crate::posts::Post;

/// Header naming the acting user for the social feed
pub const USER_HEADER: &str = "x-user-id";

const ANONYMOUS: &str = "anonymous";

/// The user a social request acts as (from `X-User-Id`, default `anonymous`)
#[derive(Debug, Clone)]
pub struct Caller(pub String);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(ANONYMOUS);
        Ok(Caller(user.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    file_name: String,
}

/// POST /api/decks/post
pub async fn post_deck(
    State(state): State<AppState>,
    Caller(user): Caller,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Post>>), ApiError> {
    let request = json_body(payload)?;
    let file_name = checked_file_name(&request.file_name)?;

    let deck = state
        .cache
        .get_one(file_name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deck not found: {}", file_name)))?;
    let post = state.posts.publish(&user, file_name, &deck).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(post).with_message("Deck posted")),
    ))
}

/// DELETE /api/decks/unpost/{post_id}
pub async fn unpost_deck(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(post_id): Path<String>,
) -> ApiResult<Post> {
    let post = state.posts.unpublish(&user, &post_id).await?;
    Ok(Json(ApiResponse::ok(post).with_message("Deck unposted")))
}

/// POST /api/decks/like/{post_id}
pub async fn like_post(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(post_id): Path<String>,
) -> ApiResult<Post> {
    let post = state.posts.like(&user, &post_id).await?;
    Ok(Json(ApiResponse::ok(post)))
}

/// DELETE /api/decks/like/{post_id}
pub async fn unlike_post(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(post_id): Path<String>,
) -> ApiResult<Post> {
    let post = state.posts.unlike(&user, &post_id).await?;
    Ok(Json(ApiResponse::ok(post)))
}

/// GET /api/decks/public
pub async fn public_posts(State(state): State<AppState>) -> ApiResult<Vec<Post>> {
    Ok(Json(ApiResponse::ok(state.posts.public().await)))
}

/// GET /api/decks/my-posts
pub async fn my_posts(State(state): State<AppState>, Caller(user): Caller) -> ApiResult<Vec<Post>> {
    Ok(Json(ApiResponse::ok(state.posts.by_author(&user).await)))
}
