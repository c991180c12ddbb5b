//! End-to-end tests for the resolution engine behind the public wire
//! surface: short-code creation through scoped tokens, the redirect
//! payload, the ad-gate session window, and the admin auth flow.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::{Value, json};

use moviezone::models::api_token::ApiToken;
use moviezone::models::link_kind::LinkKind;
use moviezone::routes::init_routes;
use moviezone::state::app_state::AppState;
use moviezone::storage::{MemoryStorage, Storage};

fn test_state(storage: Arc<MemoryStorage>) -> web::Data<AppState> {
    web::Data::new(AppState::new(storage))
}

async fn seed_token(storage: &MemoryStorage, name: &str, scope: LinkKind) -> String {
    storage
        .insert_token(ApiToken::new(name.into(), scope))
        .await
        .unwrap()
        .token_value
}

#[actix_web::test]
async fn unknown_code_returns_a_generic_not_found() {
    let storage = Arc::new(MemoryStorage::new());
    let app = test::init_service(
        App::new()
            .app_data(test_state(storage))
            .configure(init_routes),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/r/zzzzzz").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    let message = body["error"].as_str().unwrap();
    assert!(
        !message.contains("single") && !message.contains("quality"),
        "error must not reveal which kinds were probed: {}",
        message
    );
}

#[actix_web::test]
async fn single_link_lifecycle_create_resolve_skip_delete() {
    let storage = Arc::new(MemoryStorage::new());
    let token = seed_token(&storage, "publisher", LinkKind::Single).await;
    let app = test::init_service(
        App::new()
            .app_data(test_state(storage.clone()))
            .configure(init_routes),
    )
    .await;

    // Create through the token-gated endpoint.
    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/create-short-link")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({
                "movie_name": "Inception",
                "original_link": "https://cdn.example.com/inception.mkv"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let code = created["short_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);
    assert!(created["short_url"].as_str().unwrap().ends_with(&code));

    // First visit: full payload, timer runs.
    let resp =
        test::call_service(&app, TestRequest::get().uri(&format!("/r/{}", code)).to_request())
            .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "single");
    assert_eq!(body["name"], "Inception");
    assert_eq!(body["original_link"], "https://cdn.example.com/inception.mkv");
    assert_eq!(body["skip_timer"], false);

    // Clear the gate, then the same visitor skips the countdown.
    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri(&format!("/r/{}/ad-cleared", code))
            .set_json(json!({ "link_type": "single" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp =
        test::call_service(&app, TestRequest::get().uri(&format!("/r/{}", code)).to_request())
            .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["skip_timer"], true);

    // Both visits counted.
    let record = storage
        .find_link(LinkKind::Single, &code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.views(), 2);

    // Deleting the record makes the code unresolvable.
    storage
        .delete_link(LinkKind::Single, record.id().unwrap())
        .await
        .unwrap();
    let resp =
        test::call_service(&app, TestRequest::get().uri(&format!("/r/{}", code)).to_request())
            .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn creation_endpoints_enforce_token_scope() {
    let storage = Arc::new(MemoryStorage::new());
    let single_token = seed_token(&storage, "single-bot", LinkKind::Single).await;
    let app = test::init_service(
        App::new()
            .app_data(test_state(storage.clone()))
            .configure(init_routes),
    )
    .await;

    // No credential at all.
    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/create-quality-link")
            .set_json(json!({ "movie_name": "X", "quality_720p": "https://example.com/720" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong scope: a single-scoped token must not create quality links.
    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/create-quality-link")
            .insert_header(("Authorization", format!("Bearer {}", single_token)))
            .set_json(json!({ "movie_name": "X", "quality_720p": "https://example.com/720" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Deactivated token is indistinguishable from a missing one.
    let minted = storage.list_tokens().await.unwrap();
    let id = minted[0].id.unwrap();
    storage.set_token_active(id, false).await.unwrap();
    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/create-short-link")
            .insert_header(("Authorization", format!("Bearer {}", single_token)))
            .set_json(json!({
                "movie_name": "X",
                "original_link": "https://example.com/x"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn invalid_episode_range_is_rejected_before_persisting() {
    let storage = Arc::new(MemoryStorage::new());
    let token = seed_token(&storage, "zip-bot", LinkKind::Zip).await;
    let app = test::init_service(
        App::new()
            .app_data(test_state(storage.clone()))
            .configure(init_routes),
    )
    .await;

    for (from, to) in [(5, 5), (8, 3)] {
        let resp = test::call_service(
            &app,
            TestRequest::post()
                .uri("/api/create-episode-zip")
                .insert_header(("Authorization", format!("Bearer {}", token)))
                .set_json(json!({
                    "movie_name": "Season Pack",
                    "from_episode": from,
                    "to_episode": to,
                    "quality_720p": "https://example.com/pack"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    assert!(storage.list_links(LinkKind::Zip).await.unwrap().is_empty());
}

#[actix_web::test]
async fn quality_creation_requires_at_least_one_tier() {
    let storage = Arc::new(MemoryStorage::new());
    let token = seed_token(&storage, "quality-bot", LinkKind::Quality).await;
    let app = test::init_service(
        App::new()
            .app_data(test_state(storage.clone()))
            .configure(init_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/create-quality-link")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "movie_name": "Empty", "quality_480p": "  " }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(
        storage
            .list_links(LinkKind::Quality)
            .await
            .unwrap()
            .is_empty()
    );
}

#[actix_web::test]
async fn series_resolution_carries_the_episode_list() {
    let storage = Arc::new(MemoryStorage::new());
    let token = seed_token(&storage, "series-bot", LinkKind::Series).await;
    let app = test::init_service(
        App::new()
            .app_data(test_state(storage.clone()))
            .configure(init_routes),
    )
    .await;

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/create-episode-series")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({
                "series_name": "Dark",
                "start_from_episode": 3,
                "episodes": [
                    { "quality_720p": "https://example.com/e3-720" },
                    { "quality_480p": "https://example.com/e4-480",
                      "quality_1080p": "https://example.com/e4-1080" }
                ]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let code = created["short_code"].as_str().unwrap();

    let resp =
        test::call_service(&app, TestRequest::get().uri(&format!("/r/{}", code)).to_request())
            .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "series");
    assert_eq!(body["start_from_episode"], 3);
    assert_eq!(body["episodes"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["episodes"][1]["quality_1080p"],
        "https://example.com/e4-1080"
    );
}

#[actix_web::test]
async fn admin_endpoints_require_a_session_and_login_issues_one() {
    // SAFETY: tests sharing this process only read these variables.
    unsafe {
        std::env::set_var("JWT_SECRET", "integration-test-secret");
        std::env::set_var("ADMIN_USERNAME", "admin");
        std::env::set_var("ADMIN_PASSWORD", "correct horse battery");
    }

    let storage = Arc::new(MemoryStorage::new());
    let app = test::init_service(
        App::new()
            .app_data(test_state(storage.clone()))
            .configure(init_routes),
    )
    .await;

    // No session: the admin surface is closed.
    let resp =
        test::call_service(&app, TestRequest::get().uri("/api/movie-links").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Bootstrap credentials from the environment, then log in.
    let resp =
        test::call_service(&app, TestRequest::post().uri("/api/auth/init").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "admin_id": "admin", "password": "correct horse battery" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let jwt = body["token"].as_str().unwrap().to_string();

    // Wrong password stays out.
    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "admin_id": "admin", "password": "wrong" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The session opens the admin surface; mint a token and make sure
    // the secret only appears in the creation response.
    let resp = test::call_service(
        &app,
        TestRequest::post()
            .uri("/api/tokens")
            .insert_header(("Authorization", format!("Bearer {}", jwt)))
            .set_json(json!({ "token_name": "publisher", "token_type": "single" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert!(created["token_value"].as_str().is_some());

    let resp = test::call_service(
        &app,
        TestRequest::get()
            .uri("/api/tokens")
            .insert_header(("Authorization", format!("Bearer {}", jwt)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed: Value = test::read_body_json(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert!(listed[0].get("token_value").is_none());
}
