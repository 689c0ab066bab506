use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use deck_server::{create_router, AppState, DeckCache, DeckFs, KvStore, MemoryKvStore};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const GPT_KEY: &str = "gpt-secret";

fn test_router() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let fs = DeckFs::new(temp_dir.path());
    let store: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let cache = DeckCache::new(fs, Some(store), true);
    let router = create_router(AppState::new(cache, Some(GPT_KEY.to_string())), None);
    (router, temp_dir)
}

fn request(method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn create_deck(router: &Router, title: &str) -> String {
    let deck = json!({
        "title": title,
        "concepts": [{ "conceptType": "term", "term": "Hola", "definition": "Hello" }]
    });
    let (status, body) = send(router, request(Method::POST, "/api/decks", None, Some(deck))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["fileName"].as_str().unwrap().to_string()
}

// Social feed

#[tokio::test]
async fn test_post_like_and_unpost() {
    let (router, _temp) = test_router();
    let file_name = create_deck(&router, "Spanish Greetings").await;

    let (status, posted) = send(
        &router,
        request(Method::POST, "/api/decks/post", Some("ana"), Some(json!({ "fileName": file_name }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(posted["data"]["author"], "ana");
    assert_eq!(posted["data"]["title"], "Spanish Greetings");
    assert_eq!(posted["data"]["conceptCount"], 1);
    let post_id = posted["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &router,
        request(Method::POST, "/api/decks/post", Some("ana"), Some(json!({ "fileName": file_name }))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let like_uri = format!("/api/decks/like/{}", post_id);
    let (status, liked) = send(&router, request(Method::POST, &like_uri, Some("ben"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liked["data"]["likes"], 1);

    let (status, _) = send(&router, request(Method::POST, &like_uri, Some("ben"), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, unliked) = send(&router, request(Method::DELETE, &like_uri, Some("ben"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unliked["data"]["likes"], 0);

    let (status, _) = send(&router, request(Method::DELETE, &like_uri, Some("ben"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let unpost_uri = format!("/api/decks/unpost/{}", post_id);
    let (status, _) = send(&router, request(Method::DELETE, &unpost_uri, Some("ben"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, request(Method::DELETE, &unpost_uri, Some("ana"), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, public) = send(&router, request(Method::GET, "/api/decks/public", None, None)).await;
    assert!(public["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_public_and_my_posts() {
    let (router, _temp) = test_router();
    let first = create_deck(&router, "First Deck").await;
    let second = create_deck(&router, "Second Deck").await;

    send(
        &router,
        request(Method::POST, "/api/decks/post", Some("ana"), Some(json!({ "fileName": first }))),
    )
    .await;
    send(
        &router,
        request(Method::POST, "/api/decks/post", None, Some(json!({ "fileName": second }))),
    )
    .await;

    let (status, public) = send(&router, request(Method::GET, "/api/decks/public", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = public["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Second Deck", "First Deck"]);

    let (_, mine) = send(&router, request(Method::GET, "/api/decks/my-posts", Some("ana"), None)).await;
    let mine = mine["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["fileName"], "first-deck");

    let (_, anonymous) = send(&router, request(Method::GET, "/api/decks/my-posts", None, None)).await;
    assert_eq!(anonymous["data"][0]["author"], "anonymous");
}

#[tokio::test]
async fn test_posting_missing_deck_is_404() {
    let (router, _temp) = test_router();

    let (status, body) = send(
        &router,
        request(Method::POST, "/api/decks/post", Some("ana"), Some(json!({ "fileName": "ghost" }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &router,
        request(Method::POST, "/api/decks/like/unknown-post", Some("ana"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_deck_removes_its_posts() {
    let (router, _temp) = test_router();
    let doomed = create_deck(&router, "Doomed Deck").await;
    let kept = create_deck(&router, "Kept Deck").await;

    for file_name in [&doomed, &kept] {
        let (status, _) = send(
            &router,
            request(Method::POST, "/api/decks/post", Some("ana"), Some(json!({ "fileName": file_name }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
        &router,
        request(Method::DELETE, &format!("/api/decks/{}", doomed), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, public) = send(&router, request(Method::GET, "/api/decks/public", None, None)).await;
    let posted: Vec<&str> = public["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["fileName"].as_str().unwrap())
        .collect();
    assert_eq!(posted, vec!["kept-deck"]);
}

// GPT actions

fn gpt_request(method: Method, auth: Option<(&str, String)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri("/api/gpts/decks");
    if let Some((name, value)) = auth {
        builder = builder.header(name, value);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_gpt_endpoints_require_shared_secret() {
    let (router, _temp) = test_router();

    let (status, body) = send(&router, gpt_request(Method::GET, None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let wrong = Some(("x-api-key", "nope".to_string()));
    let (status, _) = send(&router, gpt_request(Method::GET, wrong, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let bearer = Some(("authorization", format!("Bearer {}", GPT_KEY)));
    let (status, body) = send(&router, gpt_request(Method::GET, bearer, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_gpt_create_deck() {
    let (router, _temp) = test_router();
    let deck = json!({
        "title": "GPT Made This",
        "description": "generated elsewhere",
        "concepts": [{ "conceptType": "term", "term": "Perro", "definition": "Dog" }]
    });

    let unauthorized = gpt_request(Method::POST, None, Some(deck.clone()));
    let (status, _) = send(&router, unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let api_key = Some(("x-api-key", GPT_KEY.to_string()));
    let (status, body) = send(&router, gpt_request(Method::POST, api_key, Some(deck))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["fileName"], "gpt-made-this");

    let (status, fetched) = send(
        &router,
        request(Method::GET, "/api/decks/gpt-made-this", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["deck"]["description"], "generated elsewhere");
}
