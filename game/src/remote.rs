//! Localhost HTTP control surface.
//!
//! Handlers never touch game state: they forward a [`RemoteCmd`] over a channel and wait for the
//! game thread to answer, so the round stays single-threaded.

use std::{
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener},
    thread,
    time::Duration,
};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};
use tower_http::cors::{Any, CorsLayer};

use crate::card::{CardFace, CardId};
use crate::input::InputEvent;
use crate::memoji::{Memoji, Outcome};
use crate::renderer::Renderer;
use crate::round_timer::TimerState;
use crate::session::Session;
use crate::symbol::Symbol;

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSnapshot {
    pub id: CardId,
    pub face: CardFace,
    /// Only present while the card is face-up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Symbol>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub remaining: u32,
    pub display: String,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    pub round: u64,
    pub board_size: usize,
    pub cards: Vec<CardSnapshot>,
    pub pending: Option<CardId>,
    pub timer: TimerSnapshot,
    pub outcome: Option<Outcome>,
}

pub fn snapshot(game: &Memoji) -> RoundSnapshot {
    let cards = game
        .cards()
        .iter()
        .enumerate()
        .map(|(id, card)| {
            let face = card.face();
            CardSnapshot {
                id,
                face,
                symbol: face.is_face_up().then(|| card.symbol().clone()),
            }
        })
        .collect();

    let timer = game.timer();
    RoundSnapshot {
        round: game.round(),
        board_size: game.cards().len(),
        cards,
        pending: game.pending(),
        timer: TimerSnapshot {
            state: timer.state(),
            remaining: timer.remaining_secs(),
            display: timer.display(),
            epoch: timer.epoch(),
        },
        outcome: game.outcome(),
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub card_id: CardId,
}

/// Body of `POST /api/tick`; an empty body means one tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickRequest {
    #[serde(default = "one_tick")]
    pub ticks: u32,
}

impl Default for TickRequest {
    fn default() -> Self {
        Self { ticks: one_tick() }
    }
}

impl TickRequest {
    fn from_body(body: &[u8]) -> Result<Self, (StatusCode, String)> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|err| (StatusCode::BAD_REQUEST, format!("invalid tick request: {err}")))
    }
}

fn one_tick() -> u32 {
    1
}

#[derive(Debug)]
pub enum RemoteCmd {
    GetState {
        respond: oneshot::Sender<RoundSnapshot>,
    },
    Select {
        card_id: CardId,
        respond: oneshot::Sender<Result<RoundSnapshot, String>>,
    },
    Restart {
        respond: oneshot::Sender<RoundSnapshot>,
    },
    Tick {
        ticks: u32,
        respond: oneshot::Sender<RoundSnapshot>,
    },
}

/// Applies one command on the game thread and answers it.
pub fn handle_remote_command<R: Renderer>(session: &mut Session<R>, cmd: RemoteCmd) {
    match cmd {
        RemoteCmd::GetState { respond } => {
            let _ = respond.send(snapshot(session.game()));
        }
        RemoteCmd::Select { card_id, respond } => {
            let reply = match session.dispatch(InputEvent::CardSelected(card_id)) {
                Ok(_) => Ok(snapshot(session.game())),
                Err(err) => {
                    tracing::warn!(%err, "remote selection rejected");
                    Err(err.to_string())
                }
            };
            let _ = respond.send(reply);
        }
        RemoteCmd::Restart { respond } => {
            session.restart();
            let _ = respond.send(snapshot(session.game()));
        }
        RemoteCmd::Tick { ticks, respond } => {
            apply_ticks(session, ticks);
            let _ = respond.send(snapshot(session.game()));
        }
    }
}

/// Ticks while the countdown runs, at most one full round's worth.
fn apply_ticks<R: Renderer>(session: &mut Session<R>, ticks: u32) {
    let limit = ticks.min(session.game().timer().duration_secs());
    for _ in 0..limit {
        if !session.game().timer().is_running() {
            break;
        }
        session.tick();
    }
}

/// Handles everything queued so far without blocking.
pub fn drain_remote_commands<R: Renderer>(
    remote: Option<&mut RemoteServer>,
    session: &mut Session<R>,
) {
    let Some(remote) = remote else {
        return;
    };

    loop {
        match remote.rx.try_recv() {
            Ok(cmd) => handle_remote_command(session, cmd),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }
}

#[derive(Clone)]
struct RemoteState {
    tx: mpsc::UnboundedSender<RemoteCmd>,
}

async fn health() -> &'static str {
    "ok"
}

async fn send_cmd<T>(
    tx: &mpsc::UnboundedSender<RemoteCmd>,
    cmd: RemoteCmd,
    rx: oneshot::Receiver<T>,
) -> Result<T, (StatusCode, String)> {
    tx.send(cmd).map_err(|_| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "game command channel closed".to_string(),
        )
    })?;

    match tokio::time::timeout(REPLY_TIMEOUT, rx).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(_)) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "game did not respond".to_string(),
        )),
        Err(_) => Err((StatusCode::GATEWAY_TIMEOUT, "game timed out".to_string())),
    }
}

async fn get_state(
    State(state): State<RemoteState>,
) -> Result<Json<RoundSnapshot>, (StatusCode, String)> {
    let (tx, rx) = oneshot::channel();
    let snapshot = send_cmd(&state.tx, RemoteCmd::GetState { respond: tx }, rx).await?;
    Ok(Json(snapshot))
}

async fn select(
    State(state): State<RemoteState>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<RoundSnapshot>, (StatusCode, String)> {
    let (tx, rx) = oneshot::channel();
    let res = send_cmd(
        &state.tx,
        RemoteCmd::Select {
            card_id: payload.card_id,
            respond: tx,
        },
        rx,
    )
    .await?;

    match res {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(msg) => Err((StatusCode::BAD_REQUEST, msg)),
    }
}

async fn restart(
    State(state): State<RemoteState>,
) -> Result<Json<RoundSnapshot>, (StatusCode, String)> {
    let (tx, rx) = oneshot::channel();
    let snapshot = send_cmd(&state.tx, RemoteCmd::Restart { respond: tx }, rx).await?;
    Ok(Json(snapshot))
}

async fn tick(
    State(state): State<RemoteState>,
    body: Bytes,
) -> Result<Json<RoundSnapshot>, (StatusCode, String)> {
    let payload = TickRequest::from_body(&body)?;
    let (tx, rx) = oneshot::channel();
    let snapshot = send_cmd(
        &state.tx,
        RemoteCmd::Tick {
            ticks: payload.ticks,
            respond: tx,
        },
        rx,
    )
    .await?;
    Ok(Json(snapshot))
}

pub fn router(tx: mpsc::UnboundedSender<RemoteCmd>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/state", get(get_state))
        .route("/api/select", post(select))
        .route("/api/restart", post(restart))
        .route("/api/tick", post(tick))
        .with_state(RemoteState { tx })
        .layer(cors)
}

/// Runs the router on its own thread and hands commands to whoever drains `rx`.
pub struct RemoteServer {
    pub rx: mpsc::UnboundedReceiver<RemoteCmd>,
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl RemoteServer {
    pub fn start(port: u16) -> io::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel::<RemoteCmd>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);

        // Bind synchronously so we can fail fast if the port is unavailable.
        let std_listener = TcpListener::bind(addr)?;
        std_listener.set_nonblocking(true)?;
        let addr = std_listener.local_addr()?;

        thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    tracing::error!(%err, "remote api runtime failed to start");
                    return;
                }
            };
            rt.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(std_listener) {
                    Ok(listener) => listener,
                    Err(err) => {
                        tracing::error!(%err, "remote api listener conversion failed");
                        return;
                    }
                };

                let serve = axum::serve(listener, router(tx)).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });

                if let Err(err) = serve.await {
                    tracing::error!(%err, "remote api server error");
                }
            });
        });

        tracing::info!(%addr, "remote api listening");
        Ok(Self {
            rx,
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for RemoteServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingRenderer;

    fn session() -> Session<RecordingRenderer> {
        let layout = ["🐶", "🐱", "🐶", "🐱"].into_iter().map(Symbol::from).collect();
        let game = Memoji::from_layout(layout, 60, 0).unwrap();
        Session::new(game, RecordingRenderer::default())
    }

    #[test]
    fn snapshot_hides_face_down_symbols() {
        let mut session = session();
        session.dispatch(InputEvent::CardSelected(1)).unwrap();

        let snap = snapshot(session.game());
        assert_eq!(snap.board_size, 4);
        assert_eq!(snap.pending, Some(1));
        assert_eq!(snap.cards[0].symbol, None);
        assert_eq!(snap.cards[1].symbol, Some(Symbol::from("🐱")));
        assert_eq!(snap.timer.state, TimerState::Running);
        assert_eq!(snap.timer.display, "01:00");
    }

    #[test]
    fn select_command_reports_unknown_card() {
        let mut session = session();
        let (tx, mut rx) = oneshot::channel();
        handle_remote_command(
            &mut session,
            RemoteCmd::Select {
                card_id: 10,
                respond: tx,
            },
        );
        let reply = rx.try_recv().expect("reply sent");
        assert!(reply.unwrap_err().contains("no card with id 10"));
    }

    #[test]
    fn tick_command_applies_every_tick() {
        let mut session = session();
        session.dispatch(InputEvent::CardSelected(0)).unwrap();

        let (tx, mut rx) = oneshot::channel();
        handle_remote_command(&mut session, RemoteCmd::Tick { ticks: 3, respond: tx });
        let snap = rx.try_recv().expect("reply sent");
        assert_eq!(snap.timer.remaining, 57);
    }

    #[test]
    fn oversized_tick_request_stops_at_expiry() {
        let mut session = session();
        session.dispatch(InputEvent::CardSelected(0)).unwrap();

        let started = std::time::Instant::now();
        let (tx, mut rx) = oneshot::channel();
        handle_remote_command(
            &mut session,
            RemoteCmd::Tick {
                ticks: u32::MAX,
                respond: tx,
            },
        );
        let snap = rx.try_recv().expect("reply sent");

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(snap.outcome, Some(Outcome::Lost));
        assert_eq!(snap.timer.remaining, 0);
        assert_eq!(snap.timer.state, TimerState::Expired);
    }

    #[test]
    fn ticks_before_first_selection_do_nothing() {
        let mut session = session();
        let (tx, mut rx) = oneshot::channel();
        handle_remote_command(&mut session, RemoteCmd::Tick { ticks: 5, respond: tx });
        let snap = rx.try_recv().expect("reply sent");
        assert_eq!(snap.timer.state, TimerState::Idle);
        assert_eq!(snap.timer.remaining, 60);
    }

    #[test]
    fn tick_request_body_parsing() {
        assert_eq!(TickRequest::from_body(b"").unwrap().ticks, 1);
        assert_eq!(TickRequest::from_body(b"{}").unwrap().ticks, 1);
        assert_eq!(TickRequest::from_body(br#"{"ticks":4}"#).unwrap().ticks, 4);
        let (status, _) = TickRequest::from_body(b"{ticks").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    mod http {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use http_body_util::BodyExt;
        use tower::ServiceExt;

        use super::*;

        /// Router backed by a task that plays the game thread's part.
        fn app() -> Router {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let mut session = session();
            tokio::spawn(async move {
                while let Some(cmd) = rx.recv().await {
                    handle_remote_command(&mut session, cmd);
                }
            });
            router(tx)
        }

        fn post_json(uri: &str, body: &str) -> Request<Body> {
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        }

        async fn body_json(resp: axum::response::Response) -> serde_json::Value {
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            serde_json::from_slice(&bytes).unwrap()
        }

        #[tokio::test]
        async fn health_reports_ok() {
            let resp = app()
                .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            assert_eq!(&bytes[..], b"ok");
        }

        #[tokio::test]
        async fn state_uses_camel_case_fields() {
            let resp = app()
                .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);

            let json = body_json(resp).await;
            assert_eq!(json["boardSize"], 4);
            assert_eq!(json["timer"]["state"], "idle");
            assert_eq!(json["timer"]["display"], "01:00");
            assert_eq!(json["cards"][0]["face"], "hidden");
            assert!(json["cards"][0].get("symbol").is_none());
            assert!(json["outcome"].is_null());
        }

        #[tokio::test]
        async fn select_reveals_and_unknown_card_is_bad_request() {
            let app = app();

            let resp = app
                .clone()
                .oneshot(post_json("/api/select", r#"{"cardId":2}"#))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let json = body_json(resp).await;
            assert_eq!(json["pending"], 2);
            assert_eq!(json["cards"][2]["face"], "revealed");
            assert_eq!(json["cards"][2]["symbol"], "🐶");

            let resp = app
                .oneshot(post_json("/api/select", r#"{"cardId":40}"#))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn bodiless_tick_advances_one_second() {
            let app = app();
            app.clone()
                .oneshot(post_json("/api/select", r#"{"cardId":0}"#))
                .await
                .unwrap();

            let resp = app
                .oneshot(Request::post("/api/tick").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let json = body_json(resp).await;
            assert_eq!(json["timer"]["remaining"], 59);
        }

        #[tokio::test]
        async fn tick_then_restart() {
            let app = app();
            app.clone()
                .oneshot(post_json("/api/select", r#"{"cardId":0}"#))
                .await
                .unwrap();

            let resp = app
                .clone()
                .oneshot(post_json("/api/tick", r#"{"ticks":60}"#))
                .await
                .unwrap();
            let json = body_json(resp).await;
            assert_eq!(json["outcome"], "lost");
            assert_eq!(json["timer"]["state"], "expired");

            let resp = app
                .oneshot(post_json("/api/restart", ""))
                .await
                .unwrap();
            let json = body_json(resp).await;
            assert_eq!(json["round"], 2);
            assert!(json["outcome"].is_null());
            assert_eq!(json["timer"]["remaining"], 60);
        }
    }
}
