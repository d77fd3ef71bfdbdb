//! SSE transport: one event stream per client session, messages posted back
//! over plain HTTP.
//!
//! `GET /sse` opens a session and announces its message endpoint,
//! `POST /message?sessionId=…` feeds that session, and `GET /health` reports
//! liveness. Responses are pushed on the session's event stream in the order
//! the messages were posted.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json as AxumJson, Response,
    },
    routing::{get, post},
    Router,
};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::protocol::ProtocolHandler;
use crate::registry::FrozenRegistry;
use crate::types::{JsonRpcMessage, McpError, McpResult};

use super::framing;

/// Default upper bound on how long in-flight connections may drain.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

const SESSION_QUEUE: usize = 32;

type Sessions = Arc<Mutex<HashMap<String, mpsc::Sender<JsonRpcMessage>>>>;

struct ServerState {
    registry: FrozenRegistry,
    base_url: Url,
    sessions: Sessions,
    /// Fired once the listener begins shutting down. New sessions and posts
    /// are refused; open sessions finish what they already accepted.
    shutdown: CancellationToken,
    /// Fired when the drain window is over; ends every remaining stream.
    closed: CancellationToken,
}

/// SSE transport for web-based MCP clients.
pub struct SseTransport {
    state: Arc<ServerState>,
    drain_timeout: Duration,
}

impl SseTransport {
    pub fn new(registry: FrozenRegistry, base_url: Url) -> Self {
        Self {
            state: Arc::new(ServerState {
                registry,
                base_url,
                sessions: Arc::new(Mutex::new(HashMap::new())),
                shutdown: CancellationToken::new(),
                closed: CancellationToken::new(),
            }),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    pub async fn session_count(&self) -> usize {
        self.state.sessions.lock().await.len()
    }

    /// Build the HTTP router. Origin checks cover `/sse` and `/message`;
    /// `/health` is open.
    pub fn router(&self) -> Router {
        let state = self.state.clone();

        Router::new()
            .route("/sse", get(handle_sse))
            .route("/message", post(handle_post))
            .route_layer(middleware::from_fn_with_state(state.clone(), origin_guard))
            .route("/health", get(handle_health))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind `addr` and serve until `ct` is cancelled.
    pub async fn run(&self, addr: &str, ct: CancellationToken) -> McpResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| McpError::Transport(format!("failed to bind SSE on {addr}: {e}")))?;

        self.serve(listener, ct).await
    }

    /// Serve on an already bound listener until `ct` is cancelled, then drain
    /// open sessions for at most the configured drain timeout.
    ///
    /// While draining, each session answers the messages it already accepted
    /// and then ends its event stream.
    pub async fn serve(&self, listener: TcpListener, ct: CancellationToken) -> McpResult<()> {
        match listener.local_addr() {
            Ok(addr) => tracing::info!(%addr, base_url = %self.state.base_url, "SSE transport listening"),
            Err(_) => tracing::info!("SSE transport listening"),
        }

        let shutdown = self.state.shutdown.clone();
        let server = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                ct.cancelled().await;
                shutdown.cancel();
            })
            .into_future();
        tokio::pin!(server);

        let draining = self.state.shutdown.clone();
        let result = tokio::select! {
            res = &mut server => res,
            () = draining.cancelled() => {
                tracing::info!(timeout = ?self.drain_timeout, "Draining SSE connections");
                match tokio::time::timeout(self.drain_timeout, &mut server).await {
                    Ok(res) => res,
                    Err(_) => {
                        tracing::warn!("Drain timeout elapsed, dropping remaining connections");
                        Ok(())
                    }
                }
            }
        };
        self.state.closed.cancel();

        result.map_err(|e| McpError::Transport(format!("SSE server error: {e}")))?;
        tracing::info!("SSE transport shut down");
        Ok(())
    }
}

/// Rejects requests whose `Origin` does not match the base URL's origin.
/// Requests without an `Origin` header pass.
async fn origin_guard(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let origin = origin.to_str().unwrap_or_default();
        if !origin_matches(&state.base_url, origin) {
            tracing::warn!(origin, path = %request.uri().path(), "Rejected cross-origin request");
            return reject(
                StatusCode::FORBIDDEN,
                &McpError::OriginRejected(origin.to_string()),
            );
        }
    }

    next.run(request).await
}

fn origin_matches(base_url: &Url, origin: &str) -> bool {
    Url::parse(origin).is_ok_and(|o| o.origin() == base_url.origin())
}

async fn handle_sse(State(state): State<Arc<ServerState>>) -> Response {
    if state.shutdown.is_cancelled() {
        return shutting_down();
    }

    let session_id = uuid::Uuid::new_v4().to_string();
    let (inbound_tx, inbound_rx) = mpsc::channel(SESSION_QUEUE);
    let (outbound_tx, outbound_rx) = mpsc::channel(SESSION_QUEUE);

    state
        .sessions
        .lock()
        .await
        .insert(session_id.clone(), inbound_tx);
    tokio::spawn(run_session(
        state.clone(),
        session_id.clone(),
        inbound_rx,
        outbound_tx,
    ));

    let endpoint = format!(
        "{}/message?sessionId={session_id}",
        state.base_url.as_str().trim_end_matches('/')
    );
    let announce = futures::stream::once(async move {
        Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint))
    });
    let messages = ReceiverStream::new(outbound_rx)
        .map(|response: Value| Ok(Event::default().event("message").data(response.to_string())));

    // Ends when the session task drops its sender, or when the drain window
    // closes first.
    let stream = announce
        .chain(messages)
        .take_until(state.closed.clone().cancelled_owned());

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Process one session's messages in arrival order until the client goes
/// away or the server shuts down. On shutdown the inbound queue is closed and
/// whatever it still holds is answered before the session ends.
async fn run_session(
    state: Arc<ServerState>,
    session_id: String,
    mut inbound: mpsc::Receiver<JsonRpcMessage>,
    outbound: mpsc::Sender<Value>,
) {
    let handler = ProtocolHandler::new(state.registry.clone());
    tracing::info!(session = %session_id, "SSE session opened");

    let mut draining = false;
    loop {
        let msg = tokio::select! {
            () = state.shutdown.cancelled(), if !draining => {
                inbound.close();
                draining = true;
                tracing::debug!(session = %session_id, "Draining SSE session");
                continue;
            }
            () = state.closed.cancelled() => break,
            () = outbound.closed() => break,
            msg = inbound.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };

        if let Some(response) = handler.handle_message(msg, &state.closed).await {
            if outbound.send(response).await.is_err() {
                break;
            }
        }
    }

    state.sessions.lock().await.remove(&session_id);
    tracing::info!(session = %session_id, "SSE session closed");
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

async fn handle_post(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    if state.shutdown.is_cancelled() {
        return shutting_down();
    }

    let Some(session_id) = query.session_id.filter(|id| !id.is_empty()) else {
        return reject(
            StatusCode::BAD_REQUEST,
            &McpError::InvalidRequest("missing sessionId query parameter".to_string()),
        );
    };

    let sender = state.sessions.lock().await.get(&session_id).cloned();
    let Some(sender) = sender else {
        return reject(StatusCode::NOT_FOUND, &McpError::SessionNotFound(session_id));
    };

    let msg = match framing::parse_bytes(&body) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(session = %session_id, "Parse error: {e}");
            return reject(StatusCode::BAD_REQUEST, &e);
        }
    };

    if sender.send(msg).await.is_err() {
        if state.shutdown.is_cancelled() {
            return shutting_down();
        }
        return reject(StatusCode::NOT_FOUND, &McpError::SessionNotFound(session_id));
    }

    StatusCode::ACCEPTED.into_response()
}

async fn handle_health(State(state): State<Arc<ServerState>>) -> AxumJson<Value> {
    let sessions = state.sessions.lock().await.len();
    AxumJson(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": sessions,
    }))
}

fn shutting_down() -> Response {
    reject(
        StatusCode::SERVICE_UNAVAILABLE,
        &McpError::Transport("server is shutting down".to_string()),
    )
}

fn reject(status: StatusCode, error: &McpError) -> Response {
    (status, AxumJson(framing::null_id_error(error))).into_response()
}
