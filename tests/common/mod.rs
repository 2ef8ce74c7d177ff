//! In-process stand-in for the question-answering service.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const MODELS: [&str; 2] = ["small", "large"];

#[derive(Default)]
pub struct StubState {
    pub sites: Vec<String>,
    pub selected_model: Option<String>,
    pub answer_requests: Vec<Value>,
    pub ingest_requests: Vec<Value>,
    pub sessions_opened: usize,
}

#[derive(Clone)]
pub struct Stub {
    pub state: Arc<Mutex<StubState>>,
    pub base_url: String,
}

impl Stub {
    pub fn answer_requests(&self) -> Vec<Value> {
        self.state.lock().unwrap().answer_requests.clone()
    }

    pub fn sites(&self) -> Vec<String> {
        self.state.lock().unwrap().sites.clone()
    }

    pub fn selected_model(&self) -> Option<String> {
        self.state.lock().unwrap().selected_model.clone()
    }
}

type Shared = Arc<Mutex<StubState>>;

fn catalog() -> Value {
    Value::Array(MODELS.iter().map(|id| json!({ "id": id })).collect())
}

async fn handle_get_state(State(state): State<Shared>) -> Json<Value> {
    let selected = state.lock().unwrap().selected_model.clone();
    Json(json!({ "models": catalog(), "model_id": selected }))
}

async fn handle_models() -> Json<Value> {
    Json(json!({ "models": catalog() }))
}

async fn handle_selected_model(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Response {
    match body["model_id"].as_str() {
        Some(id) if MODELS.contains(&id) => {
            state.lock().unwrap().selected_model = Some(id.to_string());
            Json(json!({ "ok": true })).into_response()
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "unknown model" })),
        )
            .into_response(),
    }
}

async fn handle_ingest(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    state.ingest_requests.push(body.clone());

    let urls: Vec<String> = body["urls"]
        .as_array()
        .map(|urls| {
            urls.iter()
                .filter_map(|u| u.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    if urls.is_empty() || urls.iter().any(|u| !u.starts_with("http")) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "bad url" }))).into_response();
    }

    let pages = urls.len();
    state.sites.extend(urls);
    Json(json!({ "pages": pages })).into_response()
}

async fn handle_answer(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.answer_requests.push(body.clone());

    let session_id = match body["session_id"].as_str() {
        Some(sid) if !sid.is_empty() => sid.to_string(),
        _ => {
            state.sessions_opened += 1;
            format!("S{}", state.sessions_opened)
        }
    };
    let turns = state.answer_requests.len() as u64;
    Json(json!({
        "answer": format!("echo: {}", body["question"].as_str().unwrap_or_default()),
        "tokens": 5,
        "tokens_used_total": 5 * turns,
        "session_id": session_id,
        "sources": ["http://a", "http://b"],
    }))
}

async fn handle_sites(State(state): State<Shared>) -> Json<Value> {
    Json(json!({ "sites": state.lock().unwrap().sites.clone() }))
}

async fn handle_clear(State(state): State<Shared>) -> Json<Value> {
    state.lock().unwrap().sites.clear();
    Json(json!({ "ok": true }))
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Serves the stub on an ephemeral port for the rest of the test.
pub async fn start_stub() -> Stub {
    let state: Shared = Arc::new(Mutex::new(StubState {
        selected_model: Some("small".to_string()),
        ..Default::default()
    }));

    let app = Router::new()
        .route("/getState", get(handle_get_state))
        .route("/models", get(handle_models))
        .route("/selectedModel", post(handle_selected_model))
        .route("/ingest", post(handle_ingest))
        .route("/answer", post(handle_answer))
        .route("/sites", get(handle_sites))
        .route("/clear", post(handle_clear))
        .route("/health", get(handle_health))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Stub {
        state,
        base_url: format!("http://{}", addr),
    }
}

/// A base URL nothing listens on.
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
