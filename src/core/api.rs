//! HTTP + WebSocket adapter for validation sessions
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/:id - Current snapshot
//! - POST /session/:id/event - Apply one detection event
//! - DELETE /session/:id - Tear the session down
//! - WS /ws/:id - Snapshot on every state change
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use crate::config::Config;
use crate::core::ValidationSession;
use crate::types::{DetectionEvent, ValidationSnapshot};

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, ValidationSession>>,
    pub config: Config,
    next_session: AtomicU64,
}

/// Create new session request
#[derive(Debug, Default, Deserialize)]
pub struct NewSessionRequest {
    /// Overrides the configured initial debug toggle
    pub debug_enabled: Option<bool>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub snapshot: ValidationSnapshot,
    /// Diagnostic overlay lines, present while debug is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Vec<String>>,
}

impl SessionStatusResponse {
    fn new(session_id: String, snapshot: ValidationSnapshot) -> Self {
        let debug = snapshot.debug_enabled.then(|| snapshot.debug_lines());
        Self {
            session_id,
            snapshot,
            debug,
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router
pub fn create_router(config: Config) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        config,
        next_session: AtomicU64::new(1),
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/event", post(post_event))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Option<Json<NewSessionRequest>>,
) -> Json<NewSessionResponse> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let mut config = state.config.clone();
    if let Some(debug) = req.debug_enabled {
        config.session.debug_enabled = debug;
    }

    let session_id = generate_session_id(&state.next_session);
    let session = ValidationSession::from_config(&config);
    tracing::info!(session = %session_id, "session created");

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);

    Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    })
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let snapshot = session.current();
    Ok(Json(SessionStatusResponse::new(id, snapshot)))
}

/// Apply one detection event and return the resulting snapshot
async fn post_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(event): Json<DetectionEvent>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let handle = {
        let sessions = state.sessions.read().await;
        sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?.handle()
    };

    let snapshot = handle
        .apply(event.into())
        .await
        .map_err(|_| StatusCode::GONE)?;
    Ok(Json(SessionStatusResponse::new(id, snapshot)))
}

/// End a session
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let session = state.sessions.write().await.remove(&id);
    match session {
        Some(session) => {
            session.shutdown().await;
            tracing::info!(session = %id, "session closed");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Push the current snapshot, then one per change until either side closes
async fn handle_websocket(socket: WebSocket, mut rx: watch::Receiver<ValidationSnapshot>) {
    let (mut sender, mut receiver) = socket.split();

    let json = snapshot_json(&mut rx);
    if sender.send(Message::Text(json)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            changed = rx.changed() => {
                // Session torn down
                if changed.is_err() {
                    break;
                }
                let json = snapshot_json(&mut rx);
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    let _ = sender.close().await;
}

fn snapshot_json(rx: &mut watch::Receiver<ValidationSnapshot>) -> String {
    let snapshot = rx.borrow_and_update();
    serde_json::to_string(&*snapshot).unwrap_or_default()
}

/// Generate session ID
fn generate_session_id(counter: &AtomicU64) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let n = counter.fetch_add(1, Ordering::Relaxed);
    format!("session_{:x}_{}", nanos, n)
}

/// Run the API server
pub async fn run_server(config: Config) -> std::io::Result<()> {
    let addr = config.server.addr.clone();
    let router = create_router(config);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "passport gate API listening");
    println!("📷 Passport Gate API running on {}", addr);
    println!("  POST   /session/new       - Create session");
    println!("  GET    /session/:id       - Get snapshot");
    println!("  POST   /session/:id/event - Send detection event");
    println!("  DELETE /session/:id       - End session");
    println!("  WS     /ws/:id            - Live snapshots");
    println!("  GET    /health            - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
