//! Integration Tests for the Fetch Client
//!
//! Runs a local axum server with per-route request counters and drives the
//! fetch client and API client against it end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use refetch::{
    ApiClient, ErrorNotifier, FailureKind, FetchClient, FetchError, SharedCache,
};

// == Test Server ==

#[derive(Clone, Default)]
struct ServerState {
    count_calls: Arc<AtomicUsize>,
    slow_calls: Arc<AtomicUsize>,
    flaky_calls: Arc<AtomicUsize>,
    error_calls: Arc<AtomicUsize>,
    bad_json_calls: Arc<AtomicUsize>,
    recover_calls: Arc<AtomicUsize>,
    post_calls: Arc<AtomicUsize>,
}

async fn json_handler() -> Json<Value> {
    Json(json!({"ok": true}))
}

async fn count_handler(State(state): State<ServerState>) -> Json<Value> {
    let n = state.count_calls.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({"count": n}))
}

async fn slow_handler(State(state): State<ServerState>) -> Json<Value> {
    state.slow_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({"ok": true}))
}

async fn flaky_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let call = state.flaky_calls.fetch_add(1, Ordering::SeqCst);
    if call == 0 {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"})))
    } else {
        (StatusCode::OK, Json(json!({"ok": true})))
    }
}

async fn error_handler(State(state): State<ServerState>) -> impl IntoResponse {
    state.error_calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "always"})))
}

async fn text_handler() -> &'static str {
    "hello there"
}

async fn json_as_text_handler() -> &'static str {
    r#"{"n": 5}"#
}

async fn bad_json_handler(State(state): State<ServerState>) -> impl IntoResponse {
    state.bad_json_calls.fetch_add(1, Ordering::SeqCst);
    ([("content-type", "application/json")], "not json at all")
}

/// Times out on the first call, responds immediately afterwards.
async fn recover_handler(State(state): State<ServerState>) -> Json<Value> {
    let call = state.recover_calls.fetch_add(1, Ordering::SeqCst);
    if call == 0 {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    Json(json!({"ok": true}))
}

async fn echo_handler(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
    state.post_calls.fetch_add(1, Ordering::SeqCst);
    Json(body)
}

async fn spawn_server() -> (String, ServerState) {
    let state = ServerState::default();
    let app = Router::new()
        .route("/json", get(json_handler))
        .route("/count", get(count_handler))
        .route("/slow", get(slow_handler))
        .route("/flaky", get(flaky_handler))
        .route("/error", get(error_handler))
        .route("/text", get(text_handler))
        .route("/json-as-text", get(json_as_text_handler))
        .route("/bad-json", get(bad_json_handler))
        .route("/recover", get(recover_handler))
        .route("/echo", post(echo_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refetch=debug".into()),
        )
        .try_init();
}

fn test_client() -> FetchClient {
    FetchClient::new(SharedCache::default())
}

/// Notifier that records every invocation for assertions.
#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<(FailureKind, String)>>,
}

impl ErrorNotifier for RecordingNotifier {
    fn notify(&self, kind: FailureKind, detail: &str) {
        self.calls.lock().unwrap().push((kind, detail.to_string()));
    }
}

// == Success And Parsing ==

#[tokio::test]
async fn test_get_json_success() {
    init_tracing();
    let (base, _) = spawn_server().await;
    let client = test_client();

    let result = client.get(&format!("{base}/json")).await;

    assert!(result.is_success());
    assert!(!result.from_cache);
    assert_eq!(result.status, 200);
    assert_eq!(result.data, Some(json!({"ok": true})));
    assert!(result.error.is_none());
    assert!(result.headers.contains_key("content-type"));
}

#[tokio::test]
async fn test_plain_text_body_becomes_string_value() {
    let (base, _) = spawn_server().await;
    let client = test_client();

    let result = client.get(&format!("{base}/text")).await;

    assert_eq!(result.data, Some(json!("hello there")));
}

#[tokio::test]
async fn test_json_in_text_body_is_parsed() {
    let (base, _) = spawn_server().await;
    let client = test_client();

    let result = client.get(&format!("{base}/json-as-text")).await;

    assert_eq!(result.data, Some(json!({"n": 5})));
}

#[tokio::test]
async fn test_declared_json_that_does_not_parse_is_terminal() {
    let (base, state) = spawn_server().await;
    let client = test_client();
    let options = client.options().with_retries(2).silent();

    let result = client.fetch(&format!("{base}/bad-json"), options).await;

    assert!(matches!(result.error, Some(FetchError::Parse(_))));
    // Parse failures are not retried
    assert_eq!(state.bad_json_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_typed_json_accessor() {
    #[derive(serde::Deserialize)]
    struct Ok {
        ok: bool,
    }

    let (base, _) = spawn_server().await;
    let result = test_client().get(&format!("{base}/json")).await;

    let payload: Ok = result.json().unwrap();
    assert!(payload.ok);
}

// == Timeout And Retry ==

#[tokio::test]
async fn test_timeout_retry_exhaustion_makes_exact_attempts() {
    let (base, state) = spawn_server().await;
    let client = test_client();
    let options = client
        .options()
        .with_timeout(Duration::from_millis(100))
        .with_retries(2)
        .with_retry_delay(Duration::from_millis(10))
        .silent();

    let result = client.fetch(&format!("{base}/slow"), options).await;

    // 1 initial attempt + 2 retries
    assert_eq!(state.slow_calls.load(Ordering::SeqCst), 3);
    assert!(result.is_timeout);
    assert!(!result.is_offline);
    assert!(result.data.is_none());
    match result.error {
        Some(FetchError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected exhausted error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_retry_recovers_after_timeout() {
    let (base, state) = spawn_server().await;
    let client = test_client();
    let options = client
        .options()
        .with_timeout(Duration::from_millis(100))
        .with_retries(1)
        .with_retry_delay(Duration::from_millis(10))
        .silent();

    let result = client.fetch(&format!("{base}/recover"), options).await;

    assert_eq!(state.recover_calls.load(Ordering::SeqCst), 2);
    assert!(result.is_success());
    assert_eq!(result.data, Some(json!({"ok": true})));
}

#[tokio::test]
async fn test_http_error_is_terminal_on_first_occurrence() {
    let (base, state) = spawn_server().await;
    let client = test_client();
    let options = client.options().with_retries(2).silent();

    let result = client.fetch(&format!("{base}/error"), options).await;

    // Status errors are never retried
    assert_eq!(state.error_calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.status, 500);
    assert!(matches!(
        result.error,
        Some(FetchError::Http { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_flaky_endpoint_first_500_is_terminal() {
    let (base, state) = spawn_server().await;
    let client = test_client();
    let options = client.options().with_retries(1).silent();

    let result = client.fetch(&format!("{base}/flaky"), options).await;

    // The 500 would have turned into a 200 on retry, but status failures
    // are terminal by policy
    assert_eq!(state.flaky_calls.load(Ordering::SeqCst), 1);
    assert!(matches!(
        result.error,
        Some(FetchError::Http { status: 500, .. })
    ));
}

// == Caching ==

#[tokio::test]
async fn test_cache_short_circuit_skips_transport() {
    let (base, state) = spawn_server().await;
    let client = test_client();
    let url = format!("{base}/count");

    let first = client
        .fetch(&url, client.options().cached("count"))
        .await;
    assert!(!first.from_cache);
    assert_eq!(first.data, Some(json!({"count": 1})));

    let second = client
        .fetch(&url, client.options().cached("count"))
        .await;
    assert!(second.from_cache);
    assert_eq!(second.data, Some(json!({"count": 1})));

    // The transport saw exactly one request
    assert_eq!(state.count_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cached_entry_expires_and_refetches() {
    let (base, state) = spawn_server().await;
    let client = test_client();
    let url = format!("{base}/count");
    let options = || {
        client
            .options()
            .cached("count")
            .with_cache_ttl(Duration::from_millis(30))
    };

    let first = client.fetch(&url, options()).await;
    assert_eq!(first.data, Some(json!({"count": 1})));

    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = client.fetch(&url, options()).await;
    assert!(!second.from_cache);
    assert_eq!(second.data, Some(json!({"count": 2})));
    assert_eq!(state.count_calls.load(Ordering::SeqCst), 2);
}

// == Fallback And Notification ==

#[tokio::test]
async fn test_fallback_masks_timeout_failure() {
    let (base, _) = spawn_server().await;
    let client = test_client();
    let options = client
        .options()
        .with_timeout(Duration::from_millis(50))
        .with_retries(0)
        .with_fallback(json!({"x": 1}))
        .silent();

    let result = client.fetch(&format!("{base}/slow"), options).await;

    assert_eq!(result.data, Some(json!({"x": 1})));
    assert!(result.error.is_none());
    assert!(result.is_timeout);
}

#[tokio::test]
async fn test_notifier_invoked_once_on_exhausted_failure() {
    let (base, _) = spawn_server().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let client = test_client().with_notifier(notifier.clone());
    let options = client
        .options()
        .with_timeout(Duration::from_millis(50))
        .with_retries(1)
        .with_retry_delay(Duration::from_millis(10));

    let _ = client.fetch(&format!("{base}/slow"), options).await;

    let calls = notifier.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, FailureKind::Timeout);
}

#[tokio::test]
async fn test_notifier_not_invoked_when_fallback_masks() {
    let notifier = Arc::new(RecordingNotifier::default());
    let client = test_client().with_notifier(notifier.clone());
    let options = client
        .options()
        .with_retries(0)
        .with_fallback(json!(null));

    // Unreachable loopback port: refused immediately
    let _ = client.fetch("http://127.0.0.1:9/x", options).await;

    assert!(notifier.calls.lock().unwrap().is_empty());
}

// == Cancellation ==

#[tokio::test]
async fn test_cancellation_aborts_in_flight_attempt() {
    let (base, _) = spawn_server().await;
    let client = test_client();

    let cancel = CancellationToken::new();
    let options = client
        .options()
        .with_timeout(Duration::from_secs(5))
        .with_retries(2)
        .with_cancel(cancel.clone())
        .silent();

    let killer = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        killer.cancel();
    });

    let started = Instant::now();
    let result = client.fetch(&format!("{base}/slow"), options).await;

    assert!(matches!(result.error, Some(FetchError::Cancelled)));
    // Cancelled well before the timeout or any retry could fire
    assert!(started.elapsed() < Duration::from_secs(1));
}

// == Api Client ==

#[tokio::test]
async fn test_api_client_get_caches_by_default() {
    let (base, state) = spawn_server().await;
    let api = ApiClient::new(base, test_client());

    let first = api.get("/count").await;
    let second = api.get("/count").await;

    assert_eq!(first.data, Some(json!({"count": 1})));
    assert!(second.from_cache);
    assert_eq!(second.data, Some(json!({"count": 1})));
    assert_eq!(state.count_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_api_client_invalidate_forces_refetch() {
    let (base, state) = spawn_server().await;
    let api = ApiClient::new(base, test_client());

    let _ = api.get("/count").await;
    assert!(api.is_cached("/count").await);

    assert!(api.invalidate("/count").await);
    assert!(!api.is_cached("/count").await);

    let refetched = api.get("/count").await;
    assert!(!refetched.from_cache);
    assert_eq!(refetched.data, Some(json!({"count": 2})));
    assert_eq!(state.count_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_api_client_preload_warms_cache() {
    let (base, state) = spawn_server().await;
    let api = ApiClient::new(base, test_client());

    assert!(api.preload("/count").await);
    assert!(api.is_cached("/count").await);

    let result = api.get("/count").await;
    assert!(result.from_cache);
    assert_eq!(state.count_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_api_client_post_bypasses_cache() {
    let (base, state) = spawn_server().await;
    let api = ApiClient::new(base, test_client());

    let first = api.post("/echo", json!({"n": 1})).await;
    let second = api.post("/echo", json!({"n": 2})).await;

    assert_eq!(first.data, Some(json!({"n": 1})));
    assert_eq!(second.data, Some(json!({"n": 2})));
    assert_eq!(state.post_calls.load(Ordering::SeqCst), 2);
}
