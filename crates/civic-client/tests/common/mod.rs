//! Local stand-ins for the complaints backend.
//!
//! # Purpose
//! - An axum server implementing the two complaint endpoints, recording every
//!   request it receives.
//! - A websocket server speaking the Socket.IO handshake, controlled per
//!   connection by the test.
//!
//! # Concurrency + ordering guarantees
//! - Both servers bind `127.0.0.1:0` and are ready once the helper returns.
//! - A push connection is handed to the test only after the namespace
//!   connect ack has been written.
#![allow(dead_code)]
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

#[derive(Default)]
pub struct MockBackend {
    pub list_queries: Mutex<Vec<HashMap<String, String>>>,
    pub authorization: Mutex<Vec<Option<String>>>,
    pub refused: Mutex<Vec<String>>,
    pub fail_list: AtomicBool,
    pub fail_refuse: AtomicBool,
}

impl MockBackend {
    pub fn list_calls(&self) -> usize {
        self.list_queries.lock().len()
    }

    pub fn last_query(&self) -> HashMap<String, String> {
        self.list_queries.lock().last().cloned().unwrap_or_default()
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }
}

pub async fn serve_api(backend: Arc<MockBackend>) -> SocketAddr {
    let app = Router::new()
        .route("/complaints-client/complaints-with-status", get(list))
        .route("/complaints-client/complaints-refused/{id}", delete(refuse))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });
    addr
}

async fn list(
    State(backend): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    backend.authorization.lock().push(
        headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    );
    let skip: usize = query.get("skip").and_then(|v| v.parse().ok()).unwrap_or(0);
    backend.list_queries.lock().push(query);
    if backend.fail_list.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let data: Vec<_> = (0..3)
        .map(|i| {
            serde_json::json!({
                "_id": format!("c{}", skip + i + 1),
                "title": "Streetlight out",
                "status": "waiting"
            })
        })
        .collect();
    Json(serde_json::json!({ "data": data, "total": 3, "totalWaiting": 3 })).into_response()
}

async fn refuse(State(backend): State<Arc<MockBackend>>, Path(id): Path<String>) -> StatusCode {
    if backend.fail_refuse.load(Ordering::SeqCst) {
        return StatusCode::NOT_FOUND;
    }
    backend.refused.lock().push(id);
    StatusCode::NO_CONTENT
}

pub enum PushCommand {
    Send(String),
    Drop,
}

pub type PushConnection = mpsc::UnboundedSender<PushCommand>;

pub const DEFAULT_OPEN: &str =
    r#"0{"sid":"s1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

pub async fn serve_push() -> (SocketAddr, mpsc::UnboundedReceiver<PushConnection>) {
    serve_push_with_open(DEFAULT_OPEN).await
}

/// Push server whose open packet is `open`, e.g. to shorten the heartbeat.
pub async fn serve_push_with_open(
    open: &'static str,
) -> (SocketAddr, mpsc::UnboundedReceiver<PushConnection>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind push");
    let addr = listener.local_addr().expect("push addr");
    let (conn_tx, conn_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            tokio::spawn(handle_push(tcp, open, conn_tx.clone()));
        }
    });
    (addr, conn_rx)
}

async fn handle_push(
    tcp: tokio::net::TcpStream,
    open: &'static str,
    connections: mpsc::UnboundedSender<PushConnection>,
) {
    let Ok(mut socket) = tokio_tungstenite::accept_async(tcp).await else {
        return;
    };
    if socket.send(Message::Text(open.to_string())).await.is_err() {
        return;
    }
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) if text == "40" => break,
            Some(Ok(_)) => continue,
            _ => return,
        }
    }
    if socket
        .send(Message::Text(r#"40{"sid":"n1"}"#.to_string()))
        .await
        .is_err()
    {
        return;
    }
    let (tx, mut rx) = mpsc::unbounded_channel();
    if connections.send(tx).is_err() {
        return;
    }
    while let Some(command) = rx.recv().await {
        match command {
            PushCommand::Send(text) => {
                if socket.send(Message::Text(text)).await.is_err() {
                    return;
                }
            }
            PushCommand::Drop => return,
        }
    }
}

pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition reached in time");
}
