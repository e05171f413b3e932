use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use next_calc::{
    api::{
        access::{AccessPolicy, TOKEN_HEADER},
        create_router,
    },
    state::AppState,
    store::SettingsStore,
    tasks::{spawn_controller, spawn_menu_presenter, ControlOptions},
};

const TOKEN: &str = "launch-token";
const SURFACE_ORIGIN: &str = "http://localhost:5173";

async fn app(dir: &TempDir) -> Router {
    let store = SettingsStore::open(dir.path()).await;
    let options = ControlOptions {
        content_data_dir: dir.path().join("Partitions").join("messenger"),
        development: true,
        panic_on_hide: false,
    };
    let (control, _task) = spawn_controller(store, options);
    let (menu, _menu_task) = spawn_menu_presenter(control.clone(), true);
    let access = AccessPolicy::new(TOKEN, &[SURFACE_ORIGIN.to_string()]);
    create_router(AppState::new(control, menu, access, "127.0.0.1".to_string(), 20554))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(TOKEN_HEADER, TOKEN);
    send(app, request, body).await
}

async fn send(
    app: &Router,
    request: axum::http::request::Builder,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_version() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn status_starts_locked_and_parked() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let (status, body) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unlocked"], false);
    assert_eq!(body["contentLoaded"], false);
    assert_eq!(body["contentBounds"]["y"], -10_000);
    assert_eq!(body["idle"]["idleTimeoutSeconds"], 60);
    assert_eq!(body["development"], true);
    assert_eq!(body["port"], 20554);
}

#[tokio::test]
async fn digits_unlock_through_the_api() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let mut outcome = Value::Null;
    for digit in ["1", "2", "0", "9"] {
        let (status, body) =
            call(&app, Method::POST, "/disguise/digits", Some(json!({ "digit": digit }))).await;
        assert_eq!(status, StatusCode::OK);
        outcome = body["outcome"].clone();
    }
    assert_eq!(outcome, "unlock");

    let (_, body) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(body["unlocked"], true);
    assert_eq!(body["contentBounds"]["y"], 0);

    let (status, _) =
        call(&app, Method::POST, "/disguise/digits", Some(json!({ "digit": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn passcode_validation_maps_to_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let (status, body) =
        call(&app, Method::PUT, "/passcode", Some(json!({ "passcode": "4444" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("4444"));

    let (status, _) =
        call(&app, Method::PUT, "/passcode", Some(json!({ "passcode": "123" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(&app, Method::GET, "/passcode", None).await;
    assert_eq!(body["passcode"], "1209");

    let (status, _) =
        call(&app, Method::PUT, "/passcode", Some(json!({ "passcode": "8642" }))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, Method::GET, "/passcode", None).await;
    assert_eq!(body["passcode"], "8642");

    let (status, _) = call(&app, Method::DELETE, "/passcode", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, Method::GET, "/passcode", None).await;
    assert_eq!(body["passcode"], "1209");
}

#[tokio::test]
async fn idle_timeout_round_trips() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let (status, _) =
        call(&app, Method::PUT, "/idle-timeout", Some(json!({ "seconds": 300 }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::GET, "/idle-timeout", None).await;
    assert_eq!(body["seconds"], 300);
}

#[tokio::test]
async fn lock_refused_until_content_loads() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;
    call(&app, Method::POST, "/unlock", None).await;

    let (status, body) = call(&app, Method::POST, "/lock", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);

    call(&app, Method::POST, "/events", Some(json!({ "type": "contentLoaded" }))).await;
    let (_, body) = call(&app, Method::POST, "/lock", None).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn panic_endpoint_always_succeeds() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;
    call(&app, Method::POST, "/unlock", None).await;

    for _ in 0..2 {
        let (status, body) = call(&app, Method::POST, "/panic", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let (_, body) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(body["unlocked"], false);
}

#[tokio::test]
async fn content_keys_report_panic() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let mut last = Value::Null;
    for _ in 0..6 {
        let (_, body) = call(&app, Method::POST, "/content/keys", Some(json!({ "key": "4" }))).await;
        last = body;
    }
    assert_eq!(last["panicTriggered"], true);
}

#[tokio::test]
async fn development_flag_and_menu() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let (_, body) = call(&app, Method::GET, "/development", None).await;
    assert_eq!(body["development"], true);

    let (status, body) = call(&app, Method::GET, "/menu", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["view"].is_array());
}

#[tokio::test]
async fn settings_overlay_requires_unlock() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let (_, body) = call(&app, Method::POST, "/settings/open", None).await;
    assert_eq!(body["success"], false);

    call(&app, Method::POST, "/unlock", None).await;
    let (_, body) = call(&app, Method::POST, "/settings/open", None).await;
    assert_eq!(body["success"], true);
    let (_, body) = call(&app, Method::POST, "/settings/close", None).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn clear_content_data_reports_outcome() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let (status, body) = call(&app, Method::POST, "/content-data/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Content data directory not found");
}

#[tokio::test]
async fn requests_without_token_are_refused() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let request = Request::builder().method(Method::GET).uri("/passcode");
    let (status, body) = send(&app, request, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("passcode").is_none());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/unlock")
        .header(TOKEN_HEADER, "guessed");
    let (status, _) = send(&app, request, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(body["unlocked"], false);

    // Health stays open for liveness checks
    let request = Request::builder().method(Method::GET).uri("/health");
    let (status, _) = send(&app, request, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn foreign_origin_is_refused() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    for (method, uri) in [(Method::GET, "/passcode"), (Method::POST, "/unlock"), (Method::POST, "/panic")] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("origin", "https://evil.example")
            .header(TOKEN_HEADER, TOKEN)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    let (_, body) = call(&app, Method::GET, "/status", None).await;
    assert_eq!(body["unlocked"], false);
}

#[tokio::test]
async fn surface_origin_gets_cors_headers() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/passcode")
        .header("origin", SURFACE_ORIGIN)
        .header(TOKEN_HEADER, TOKEN)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        SURFACE_ORIGIN
    );
}

#[tokio::test]
async fn token_accepted_as_query_parameter() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/menu?token={}", TOKEN));
    let (status, body) = send(&app, request, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["view"].is_array());
}
