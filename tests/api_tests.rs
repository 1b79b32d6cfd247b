//! Integration tests for the castlist API
//!
//! Each test builds the real router over a fresh in-memory database and
//! drives it with tower's `oneshot`, covering the uniqueness invariants,
//! blob preservation, idempotent deletes, and the error envelope.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use castlist::{build_router, AppState};

/// Test helper: build the app over a fresh in-memory database (no chat backend)
async fn setup_app() -> axum::Router {
    let pool = castlist::db::init_memory_pool()
        .await
        .expect("in-memory database");
    build_router(AppState::new(pool, None))
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn extract_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

fn jane() -> Value {
    json!({
        "name": "Jane Doe",
        "gender": "Female",
        "age": 40,
        "imdb_link": "https://www.imdb.com/name/nm0000001"
    })
}

fn arrival() -> Value {
    json!({
        "title": "Arrival",
        "genre": "Science Fiction",
        "year": 2016,
        "imdb_link": "https://www.imdb.com/title/tt2543164"
    })
}

/// Create an entity and return its assigned id
async fn create(app: &axum::Router, uri: &str, body: Value) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request("POST", uri, body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = extract_json(response.into_body()).await;
    created["id"].as_i64().expect("assigned id")
}

// =============================================================================
// Health endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "castlist");
    assert!(body["version"].is_string());
}

// =============================================================================
// Actor CRUD
// =============================================================================

#[tokio::test]
async fn test_create_actor_and_get_detail() {
    let app = setup_app().await;

    let id = create(&app, "/api/actors", jane()).await;

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/actors/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Jane Doe");
    assert_eq!(body["gender"], "Female");
    assert_eq!(body["age"], 40);
    assert_eq!(body["imdb_link"], "https://www.imdb.com/name/nm0000001");
    assert_eq!(body["movies"], json!([]));
}

#[tokio::test]
async fn test_duplicate_actor_returns_conflict() {
    let app = setup_app().await;

    create(&app, "/api/actors", jane()).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/actors", jane()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "DUPLICATE_ENTITY");

    // Exactly one matching row survives
    let response = app.oneshot(get_request("/api/actors")).await.unwrap();
    let list = extract_json(response.into_body()).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_actor_returns_not_found() {
    let app = setup_app().await;

    let response = app.oneshot(get_request("/api/actors/9999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_update_id_mismatch_returns_not_found() {
    let app = setup_app().await;

    let id = create(&app, "/api/actors", jane()).await;

    let mut body = jane();
    body["id"] = json!(id + 1);
    let response = app
        .oneshot(json_request("PUT", &format!("/api/actors/{}", id), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_actor_is_idempotent() {
    let app = setup_app().await;

    let id = create(&app, "/api/actors", jane()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/actors/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Deleting again (and deleting an id that never existed) still succeeds
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/actors/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// =============================================================================
// Photo blob handling
// =============================================================================

#[tokio::test]
async fn test_update_without_photo_preserves_blob() {
    let app = setup_app().await;

    let photo_bytes = vec![0xFFu8, 0xD8, 0xFF, 0xE0, 0x10, 0x20, 0x30];
    let mut body = jane();
    body["photo"] = json!(BASE64.encode(&photo_bytes));
    let id = create(&app, "/api/actors", body).await;

    // Edit with no photo field at all
    let mut update = jane();
    update["id"] = json!(id);
    update["gender"] = json!("Nonbinary");
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/api/actors/{}", id), update))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Stored photo equals the photo set at creation time, bit for bit
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/actors/{}/photo", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_bytes(response.into_body()).await, photo_bytes);
}

#[tokio::test]
async fn test_empty_photo_field_means_no_new_blob() {
    let app = setup_app().await;

    let photo_bytes = vec![1u8, 2, 3, 4];
    let mut body = jane();
    body["photo"] = json!(BASE64.encode(&photo_bytes));
    let id = create(&app, "/api/actors", body).await;

    // A zero-length upload counts as "no new blob supplied"
    let mut update = jane();
    update["id"] = json!(id);
    update["photo"] = json!("");
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/api/actors/{}", id), update))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request(&format!("/api/actors/{}/photo", id)))
        .await
        .unwrap();
    assert_eq!(extract_bytes(response.into_body()).await, photo_bytes);
}

#[tokio::test]
async fn test_actor_without_photo_returns_not_found() {
    let app = setup_app().await;

    let id = create(&app, "/api/actors", jane()).await;

    let response = app
        .oneshot(get_request(&format!("/api/actors/{}/photo", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_base64_photo_rejected() {
    let app = setup_app().await;

    let mut body = jane();
    body["photo"] = json!("!!! not base64 !!!");
    let response = app
        .oneshot(json_request("POST", "/api/actors", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
}

// =============================================================================
// Movie CRUD
// =============================================================================

#[tokio::test]
async fn test_duplicate_movie_returns_conflict() {
    let app = setup_app().await;

    create(&app, "/api/movies", arrival()).await;

    let response = app
        .oneshot(json_request("POST", "/api/movies", arrival()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "DUPLICATE_ENTITY");
}

#[tokio::test]
async fn test_update_movie_fields() {
    let app = setup_app().await;

    let id = create(&app, "/api/movies", arrival()).await;

    let mut update = arrival();
    update["id"] = json!(id);
    update["genre"] = json!("Drama");
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/api/movies/{}", id), update))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["genre"], "Drama");
    assert_eq!(body["year"], 2016);
}

// =============================================================================
// Credits
// =============================================================================

#[tokio::test]
async fn test_credit_lifecycle_and_duplicate_pair() {
    let app = setup_app().await;

    let actor_id = create(&app, "/api/actors", jane()).await;
    let movie_id = create(&app, "/api/movies", arrival()).await;

    let credit = json!({ "actor_id": actor_id, "movie_id": movie_id });
    create(&app, "/api/credits", credit.clone()).await;

    // Second identical link is a duplicate relationship
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/credits", credit))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "DUPLICATE_RELATIONSHIP");

    // List resolves actor and movie eagerly
    let response = app
        .clone()
        .oneshot(get_request("/api/credits"))
        .await
        .unwrap();
    let list = extract_json(response.into_body()).await;
    assert_eq!(list[0]["actor"]["name"], "Jane Doe");
    assert_eq!(list[0]["movie"]["title"], "Arrival");

    // And the actor detail now includes the movie
    let response = app
        .oneshot(get_request(&format!("/api/actors/{}", actor_id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["movies"][0]["title"], "Arrival");
}

#[tokio::test]
async fn test_credit_with_unknown_ids_rejected() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/credits",
            json!({ "actor_id": 404, "movie_id": 404 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_deleting_movie_cascades_credits() {
    let app = setup_app().await;

    let actor_id = create(&app, "/api/actors", jane()).await;
    let movie_id = create(&app, "/api/movies", arrival()).await;
    create(
        &app,
        "/api/credits",
        json!({ "actor_id": actor_id, "movie_id": movie_id }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/movies/{}", movie_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get_request("/api/credits")).await.unwrap();
    let list = extract_json(response.into_body()).await;
    assert_eq!(list, json!([]));
}

// =============================================================================
// Buzz endpoints (no backend configured)
// =============================================================================

#[tokio::test]
async fn test_buzz_without_backend_returns_unavailable() {
    let app = setup_app().await;

    let actor_id = create(&app, "/api/actors", jane()).await;

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/actors/{}/tweets", actor_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UNAVAILABLE");

    // Entity existence is still checked first
    let response = app
        .oneshot(get_request("/api/movies/777/reviews"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
