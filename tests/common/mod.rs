//! In-process mock of the question-answering backend, served by axum on a
//! free local port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenUpload {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub len: usize,
}

#[derive(Default)]
struct Inner {
    /// (name, chunks) per stored document.
    docs: Vec<(String, u64)>,
    fail_uploads: HashMap<String, String>,
    stats_delay: Option<Duration>,
    /// Status and optional `detail` for every `/stats` call.
    stats_failure: Option<(u16, Option<String>)>,
    clear_failure: Option<String>,
    uploads: Vec<SeenUpload>,
    queries: Vec<Value>,
    stats_calls: usize,
    clears: usize,
}

#[derive(Default)]
pub struct MockState {
    inner: Mutex<Inner>,
}

impl MockState {
    pub fn fail_upload(&self, name: &str, detail: &str) {
        self.inner
            .lock()
            .unwrap()
            .fail_uploads
            .insert(name.to_string(), detail.to_string());
    }

    pub fn delay_stats(&self, delay: Duration) {
        self.inner.lock().unwrap().stats_delay = Some(delay);
    }

    pub fn fail_stats(&self, status: u16, detail: Option<&str>) {
        self.inner.lock().unwrap().stats_failure = Some((status, detail.map(str::to_string)));
    }

    pub fn fail_clear(&self, detail: &str) {
        self.inner.lock().unwrap().clear_failure = Some(detail.to_string());
    }

    pub fn seed(&self, name: &str, chunks: u64) {
        self.inner
            .lock()
            .unwrap()
            .docs
            .push((name.to_string(), chunks));
    }

    pub fn uploads(&self) -> Vec<SeenUpload> {
        self.inner.lock().unwrap().uploads.clone()
    }

    pub fn queries(&self) -> Vec<Value> {
        self.inner.lock().unwrap().queries.clone()
    }

    pub fn stats_calls(&self) -> usize {
        self.inner.lock().unwrap().stats_calls
    }

    pub fn clears(&self) -> usize {
        self.inner.lock().unwrap().clears
    }

    pub fn total_chunks(&self) -> u64 {
        self.inner.lock().unwrap().docs.iter().map(|(_, c)| c).sum()
    }
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start the mock on a free port. It runs until the test's runtime shuts down.
pub async fn start_mock() -> MockBackend {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/", get(root))
        .route("/stats", get(stats))
        .route("/upload", post(upload))
        .route("/query", post(query))
        .route("/clear", delete(clear))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    MockBackend { addr, state }
}

/// A local URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn detail(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "RAG Document Q&A API",
        "endpoints": {
            "upload": "/upload",
            "query": "/query",
            "stats": "/stats",
            "clear": "/clear"
        }
    }))
}

async fn stats(State(state): State<Arc<MockState>>) -> Response {
    let (delay, failure) = {
        let mut inner = state.inner.lock().unwrap();
        inner.stats_calls += 1;
        (inner.stats_delay, inner.stats_failure.clone())
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    match failure {
        Some((status, Some(msg))) => detail(StatusCode::from_u16(status).unwrap(), &msg),
        Some((status, None)) => (StatusCode::from_u16(status).unwrap(), "Bad Gateway").into_response(),
        None => Json(json!({
            "total_chunks": state.total_chunks(),
            "collection_name": "documents"
        }))
        .into_response(),
    }
}

async fn upload(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Response {
    let Ok(Some(field)) = multipart.next_field().await else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "file is required");
    };
    let field_name = field.name().unwrap_or_default().to_string();
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let bytes = field.bytes().await.unwrap_or_default();

    let mut inner = state.inner.lock().unwrap();
    inner.uploads.push(SeenUpload {
        field: field_name,
        file_name: file_name.clone(),
        content_type: content_type.clone(),
        len: bytes.len(),
    });
    if let Some(msg) = inner.fail_uploads.get(&file_name).cloned() {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, &msg);
    }
    if !(file_name.ends_with(".pdf") || file_name.ends_with(".txt")) {
        return detail(StatusCode::BAD_REQUEST, "Unsupported file type. Use PDF or TXT");
    }

    let chunks = bytes.len() as u64 / 10 + 1;
    inner.docs.push((file_name.clone(), chunks));
    let id = format!("doc-{}", inner.docs.len());
    Json(json!({
        "message": format!("Successfully processed {}", file_name),
        "document_id": id,
        "chunks_created": chunks
    }))
    .into_response()
}

async fn query(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let mut inner = state.inner.lock().unwrap();
    inner.queries.push(body.clone());
    if inner.docs.is_empty() {
        return detail(StatusCode::NOT_FOUND, "No documents found");
    }
    let question = body["question"].as_str().unwrap_or_default();
    let top_k = body["top_k"].as_u64().unwrap_or(5) as usize;
    let sources: Vec<Value> = inner
        .docs
        .iter()
        .take(top_k)
        .enumerate()
        .map(|(i, (name, _))| {
            json!({
                "source": name,
                "relevance_score": 0.9 - 0.6 * i as f64,
                "text_preview": format!("Preview from {}...", name),
                "chunk_index": i * 3
            })
        })
        .collect();
    Json(json!({
        "answer": format!("You asked **{}**.", question),
        "confidence": 0.8675,
        "sources": sources
    }))
    .into_response()
}

async fn clear(State(state): State<Arc<MockState>>) -> Response {
    let mut inner = state.inner.lock().unwrap();
    if let Some(msg) = inner.clear_failure.clone() {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, &msg);
    }
    inner.clears += 1;
    inner.docs.clear();
    Json(json!({ "message": "Database cleared successfully" })).into_response()
}
