//! In-process stand-in for the upstream gateway, for tests.
//!
//! Each canned route answers with a fixed status and body. A body given as a
//! JSON string is sent as plain text, which lets tests exercise non-JSON
//! gateway errors.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use courier_core::API_KEY_HEADER;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

type Routes = HashMap<(String, String), (u16, Value)>;

#[derive(Clone)]
struct StubState {
    routes: Arc<Routes>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubGateway {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl StubGateway {
    /// Starts a stub on an ephemeral localhost port.
    /// Routes are `(method, path, status, body)`; anything else answers 404.
    pub async fn spawn(routes: Vec<(&str, &str, u16, Value)>) -> Self {
        let routes: Routes = routes
            .into_iter()
            .map(|(method, path, status, body)| {
                ((method.to_uppercase(), path.to_string()), (status, body))
            })
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            routes: Arc::new(routes),
            requests: requests.clone(),
        };

        let app = Router::new().fallback(answer).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub gateway");
        let addr = listener.local_addr().expect("stub gateway address");

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            shutdown,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("stub request log").clone()
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

/// A base URL nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe port");
    let addr: SocketAddr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}

async fn answer(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state
        .requests
        .lock()
        .expect("stub request log")
        .push(RecordedRequest {
            method: method.to_string(),
            path: path.clone(),
            api_key,
            body,
        });

    match state.routes.get(&(method.to_string(), path)) {
        Some((status, Value::String(text))) => (code(*status), text.clone()).into_response(),
        Some((status, value)) => (code(*status), Json(value.clone())).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response(),
    }
}

fn code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
