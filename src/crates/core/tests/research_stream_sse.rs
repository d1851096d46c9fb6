use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::sse::{Event, Sse};
use axum::routing::get;
use serde_json::json;
use sovereign_core::research::StageId;
use sovereign_core::{
    ClientConfig, ResearchError, SessionState, SseConnector, StreamSessionController,
    TransportError,
};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Default)]
struct TestState {
    topics: Arc<Mutex<Vec<String>>>,
}

fn sse_from(frames: Vec<String>) -> impl IntoResponse {
    let stream = tokio_stream::iter(frames).map(|data| Ok::<_, Infallible>(Event::default().data(data)));
    Sse::new(stream)
}

async fn research_handler(
    State(state): State<TestState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let topic = params.get("topic").cloned().unwrap_or_default();
    state.topics.lock().await.push(topic.clone());

    sse_from(vec![
        json!({ "node": "strategist" }).to_string(),
        json!({ "node": "scout" }).to_string(),
        json!({ "node": "fact_checker" }).to_string(),
        json!({ "node": "writer" }).to_string(),
        json!({ "report": format!("# Findings on {}\n**Key** point", topic) }).to_string(),
        "[DONE]".to_string(),
    ])
}

async fn truncated_handler() -> impl IntoResponse {
    sse_from(vec![
        json!({ "node": "scout" }).to_string(),
        json!({ "report": "partial draft" }).to_string(),
    ])
}

async fn stalled_handler() -> impl IntoResponse {
    let first = tokio_stream::iter(vec![json!({ "node": "strategist" }).to_string()]);
    let stream = first
        .chain(tokio_stream::pending())
        .map(|data| Ok::<_, Infallible>(Event::default().data(data)));
    Sse::new(stream)
}

async fn broken_handler() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "backend unavailable")
}

async fn spawn_server(state: TestState) -> String {
    let app = Router::new()
        .route("/research", get(research_handler))
        .route("/truncated", get(truncated_handler))
        .route("/stalled", get(stalled_handler))
        .route("/broken", get(broken_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test app");
    });
    format!("http://{}", addr)
}

fn controller_for(base: &str, path: &str) -> StreamSessionController<SseConnector> {
    controller_with_idle_timeout(base, path, 10)
}

fn controller_with_idle_timeout(
    base: &str,
    path: &str,
    idle_timeout_secs: u64,
) -> StreamSessionController<SseConnector> {
    let config = ClientConfig {
        endpoint: format!("{}{}", base, path),
        idle_timeout_secs,
        ..ClientConfig::default()
    };
    StreamSessionController::new(SseConnector::new(&config).expect("build connector"))
}

#[tokio::test]
async fn full_pipeline_streams_to_completion() {
    let state = TestState::default();
    let base = spawn_server(state.clone()).await;
    let mut controller = controller_for(&base, "/research");

    controller.start("rust & wasm").await.expect("session starts");
    let outcome = controller.drive(&CancellationToken::new()).await;

    assert_eq!(outcome, SessionState::Completed);
    assert_eq!(controller.active_stage(), Some(StageId::Writer));
    assert_eq!(
        controller.report().text,
        "# Findings on rust & wasm\n**Key** point"
    );
    assert!(!controller.has_open_connection());
    assert_eq!(*state.topics.lock().await, vec!["rust & wasm".to_string()]);

    let resolved = controller
        .log()
        .entries()
        .iter()
        .filter(|e| e.message.ends_with("TASK_RESOLVED"))
        .count();
    assert_eq!(resolved, 4);

    let document = controller.export_document().expect("export succeeds");
    let body: Vec<&str> = document.pages[0]
        .body_lines()
        .map(|r| r.text.as_str())
        .collect();
    assert_eq!(body, vec!["Findings on rust & wasm", "Key point"]);
}

#[tokio::test]
async fn stream_closed_without_sentinel_errors() {
    let base = spawn_server(TestState::default()).await;
    let mut controller = controller_for(&base, "/truncated");

    controller.start("topic").await.expect("session starts");
    let outcome = controller.drive(&CancellationToken::new()).await;

    assert_eq!(outcome, SessionState::Errored);
    assert_eq!(controller.report().text, "partial draft");
    assert!(!controller.has_open_connection());
}

#[tokio::test]
async fn http_error_status_fails_start() {
    let base = spawn_server(TestState::default()).await;
    let mut controller = controller_for(&base, "/broken");

    let err = controller.start("topic").await.unwrap_err();

    assert!(err.to_string().contains("500"), "unexpected error: {}", err);
    assert_eq!(controller.state(), SessionState::Errored);
    assert!(!controller.has_open_connection());
}

#[tokio::test]
async fn silent_stream_hits_idle_timeout() {
    let base = spawn_server(TestState::default()).await;
    let mut controller = controller_with_idle_timeout(&base, "/stalled", 1);

    controller.start("topic").await.expect("session starts");
    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        controller.drive(&CancellationToken::new()),
    )
    .await
    .expect("idle timeout must end the session");

    assert_eq!(outcome, SessionState::Errored);
    assert_eq!(controller.active_stage(), Some(StageId::Strategist));
    assert!(!controller.has_open_connection());
    let last = controller.log().entries().last().map(|e| e.message.clone());
    assert!(
        last.as_deref()
            .is_some_and(|m| m.starts_with(">> LINK_FAILURE: SSE stream timeout")),
        "unexpected last entry: {:?}",
        last
    );
}

#[tokio::test]
async fn server_that_never_answers_times_out_on_start() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        // Hold the socket open without ever writing a response.
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(socket);
    });
    let mut controller = controller_with_idle_timeout(&format!("http://{}", addr), "/research", 1);

    let result = tokio::time::timeout(Duration::from_secs(10), controller.start("topic"))
        .await
        .expect("start must give up after the idle timeout");

    assert!(matches!(
        result,
        Err(ResearchError::Transport(TransportError::IdleTimeout { secs: 1 }))
    ));
    assert_eq!(controller.state(), SessionState::Errored);
    assert!(!controller.has_open_connection());
}
