use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use donation_assistant::assistant::{Assistant, AssistantOptions, ModelReadiness, QueryResult};
use donation_assistant::core::config::BackendConfig;
use donation_assistant::knowledge::sample::{sample_update, SAMPLE_QUESTION};
use donation_assistant::knowledge::KnowledgeStore;
use donation_assistant::llm::{ChatBackend, ChatMessage, ChatRequest, OllamaBackend};

#[derive(Default)]
struct FakeOllama {
    requests: Mutex<Vec<Value>>,
    hits: AtomicUsize,
}

type Shared = Arc<FakeOllama>;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn backend_for(base_url: &str, max_retries: u32) -> OllamaBackend {
    OllamaBackend::new(&BackendConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        pull_timeout_secs: 5,
        max_retries,
    })
    .unwrap()
}

async fn pull_ok(State(fake): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    fake.requests.lock().unwrap().push(body);
    Json(json!({ "status": "success" }))
}

async fn pull_missing(
    State(fake): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.requests.lock().unwrap().push(body);
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "model not found" })),
    )
}

async fn chat_ok(State(fake): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    fake.requests.lock().unwrap().push(body);
    Json(json!({
        "model": "llama2",
        "message": { "role": "assistant", "content": "1. 地點名稱：台北食物銀行" },
        "done": true
    }))
}

async fn chat_malformed(State(fake): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    fake.requests.lock().unwrap().push(body);
    Json(json!({ "done": true }))
}

async fn chat_flaky(State(fake): State<Shared>) -> (StatusCode, Json<Value>) {
    if fake.hits.fetch_add(1, Ordering::SeqCst) == 0 {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "loading model" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "message": { "role": "assistant", "content": "ok" } })),
    )
}

async fn chat_rejected(State(fake): State<Shared>) -> (StatusCode, Json<Value>) {
    fake.hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "invalid message role" })),
    )
}

#[tokio::test]
async fn pull_sends_non_streaming_request() {
    let fake = Shared::default();
    let url = spawn(
        Router::new()
            .route("/api/pull", post(pull_ok))
            .with_state(fake.clone()),
    )
    .await;

    backend_for(&url, 0).pull("llama2").await.unwrap();

    let requests = fake.requests.lock().unwrap();
    assert_eq!(requests.as_slice(), &[json!({ "model": "llama2", "stream": false })]);
}

#[tokio::test]
async fn pull_failure_carries_ollama_message() {
    let fake = Shared::default();
    let url = spawn(
        Router::new()
            .route("/api/pull", post(pull_missing))
            .with_state(fake.clone()),
    )
    .await;

    let err = backend_for(&url, 0).pull("llama2").await.unwrap_err();
    assert_eq!(err.to_string(), "model not found");
}

#[tokio::test]
async fn chat_posts_messages_and_returns_content() {
    let fake = Shared::default();
    let url = spawn(
        Router::new()
            .route("/api/chat", post(chat_ok))
            .with_state(fake.clone()),
    )
    .await;

    let request = ChatRequest::new(vec![
        ChatMessage::system("persona"),
        ChatMessage::user("我想捐贈罐頭"),
    ])
    .with_temperature(Some(0.1));
    let reply = backend_for(&url, 0).chat(request, "llama2").await.unwrap();

    assert_eq!(reply, "1. 地點名稱：台北食物銀行");
    let requests = fake.requests.lock().unwrap();
    assert_eq!(
        requests[0],
        json!({
            "model": "llama2",
            "messages": [
                { "role": "system", "content": "persona" },
                { "role": "user", "content": "我想捐贈罐頭" }
            ],
            "stream": false,
            "options": { "temperature": 0.1 }
        })
    );
}

#[tokio::test]
async fn chat_without_message_content_is_an_error() {
    let fake = Shared::default();
    let url = spawn(
        Router::new()
            .route("/api/chat", post(chat_malformed))
            .with_state(fake.clone()),
    )
    .await;

    let err = backend_for(&url, 0)
        .chat(ChatRequest::new(vec![ChatMessage::user("hi")]), "llama2")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("message.content"));
}

#[tokio::test]
async fn server_errors_are_retried() {
    let fake = Shared::default();
    let url = spawn(
        Router::new()
            .route("/api/chat", post(chat_flaky))
            .with_state(fake.clone()),
    )
    .await;

    let reply = backend_for(&url, 1)
        .chat(ChatRequest::new(vec![ChatMessage::user("hi")]), "llama2")
        .await
        .unwrap();

    assert_eq!(reply, "ok");
    assert_eq!(fake.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let fake = Shared::default();
    let url = spawn(
        Router::new()
            .route("/api/chat", post(chat_rejected))
            .with_state(fake.clone()),
    )
    .await;

    let err = backend_for(&url, 3)
        .chat(ChatRequest::new(vec![ChatMessage::user("hi")]), "llama2")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "invalid message role");
    assert_eq!(fake.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_server_is_reported() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = backend_for(&url, 0).pull("llama2").await.unwrap_err();
    assert!(err.to_string().contains("Ollama connection error"));
}

#[tokio::test]
async fn assistant_reports_unready_model() {
    let fake = Shared::default();
    let url = spawn(
        Router::new()
            .route("/api/pull", post(pull_missing))
            .with_state(fake.clone()),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let store = KnowledgeStore::new(dir.path().join("knowledge_base.json"));
    let mut assistant = Assistant::new(
        Arc::new(backend_for(&url, 0)),
        store,
        AssistantOptions::default(),
    );

    let readiness = assistant.ensure_model_ready("llama2").await;

    assert_eq!(
        readiness,
        ModelReadiness::Unready {
            message: "model not found".to_string()
        }
    );
}

#[tokio::test]
async fn assistant_answers_grounded_question_end_to_end() {
    let fake = Shared::default();
    let url = spawn(
        Router::new()
            .route("/api/pull", post(pull_ok))
            .route("/api/chat", post(chat_ok))
            .with_state(fake.clone()),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let store = KnowledgeStore::new(dir.path().join("data").join("knowledge_base.json"));
    let mut assistant = Assistant::new(
        Arc::new(backend_for(&url, 0)),
        store,
        AssistantOptions::default(),
    );
    assistant.update_knowledge(sample_update().unwrap()).await.unwrap();

    assert!(assistant.ensure_model_ready("llama2").await.is_ready());
    let result = assistant.query(SAMPLE_QUESTION).await;

    assert_eq!(
        result,
        QueryResult::Success {
            response: "1. 地點名稱：台北食物銀行".to_string()
        }
    );
    assert!(dir.path().join("data").join("knowledge_base.json").exists());

    let requests = fake.requests.lock().unwrap();
    let chat = requests
        .iter()
        .find(|body| body.get("messages").is_some())
        .unwrap();
    let user = chat["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains(SAMPLE_QUESTION));
    assert!(user.contains("台北食物銀行"));
    assert!(user.contains("台北市信義區信義路5段150號"));
}

#[tokio::test]
async fn assistant_turns_unreachable_backend_into_error_result() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let dir = tempfile::tempdir().unwrap();
    let store = KnowledgeStore::new(dir.path().join("knowledge_base.json"));
    let mut assistant = Assistant::new(
        Arc::new(backend_for(&url, 0)),
        store,
        AssistantOptions::default(),
    );

    let result = assistant.query(SAMPLE_QUESTION).await;

    assert!(!result.is_success());
    assert!(result.text().starts_with("查詢失敗: "));
}
