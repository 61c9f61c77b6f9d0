//! Socket.IO-over-WebSocket transport with auto-reconnect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use pizarra_common::SyncError;

use super::manager::Transport;
use super::socket_io::{self, Packet};
use super::types::{ConnectionConfig, TransportEvent};

/// Outbound frames buffered while connected. Full means the socket is stuck.
const COMMAND_CAPACITY: usize = 64;

#[derive(Debug)]
enum Command {
    Emit(String),
    Close,
}

// ---------------------------------------------------------------------------
// Transport handle
// ---------------------------------------------------------------------------

/// Handle to the background connection task.
///
/// All methods are non-blocking; frames are handed to the task over a
/// channel and written by it.
pub struct WsTransport {
    config: ConnectionConfig,
    connected: Arc<AtomicBool>,
    command_tx: Option<mpsc::Sender<Command>>,
    task: Option<JoinHandle<()>>,
}

impl WsTransport {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            connected: Arc::new(AtomicBool::new(false)),
            command_tx: None,
            task: None,
        }
    }
}

impl Transport for WsTransport {
    /// Spawns the connection task; must be called inside a tokio runtime.
    fn open(&mut self, events: mpsc::Sender<TransportEvent>) {
        if let Some(stale) = self.task.take() {
            stale.abort();
        }
        // A task detached by `close` may still be winding down; it keeps the
        // old flag so it cannot mark this connection as down.
        self.connected = Arc::new(AtomicBool::new(false));
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        self.command_tx = Some(command_tx);
        self.task = Some(tokio::spawn(connection_loop(
            self.config.clone(),
            Arc::clone(&self.connected),
            events,
            command_rx,
        )));
    }

    fn close(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
        if let Some(tx) = self.command_tx.take() {
            // The task exits on Close or when the channel is dropped.
            let _ = tx.try_send(Command::Close);
        }
        self.task = None;
    }

    fn is_open(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send(&mut self, event: &str, payload: serde_json::Value) -> Result<(), SyncError> {
        let tx = self.command_tx.as_ref().ok_or(SyncError::NotConnected)?;
        tx.try_send(Command::Emit(socket_io::encode_event(event, &payload)))
            .map_err(|e| SyncError::Transport(format!("outbound queue: {e}")))
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Connection loop
// ---------------------------------------------------------------------------

/// Why a connected session ended.
enum SessionEnd {
    /// Socket dropped; reconnect after backoff.
    Lost,
    /// `close` was requested; stop for good.
    Closed,
}

async fn connection_loop(
    config: ConnectionConfig,
    connected: Arc<AtomicBool>,
    event_tx: mpsc::Sender<TransportEvent>,
    mut command_rx: mpsc::Receiver<Command>,
) {
    let mut reconnect_delay = config.reconnect_delay_secs.max(1);

    loop {
        let url = config.ws_url();
        info!(url = %url.split('?').next().unwrap_or(""), "Connecting to hub");

        match tokio::time::timeout(
            Duration::from_secs(config.connect_timeout_secs),
            tokio_tungstenite::connect_async(&url),
        )
        .await
        {
            Ok(Ok((ws_stream, _))) => {
                reconnect_delay = config.reconnect_delay_secs.max(1);
                if !discard_stale_commands(&mut command_rx) {
                    return;
                }
                match run_session(ws_stream, &connected, &event_tx, &mut command_rx).await {
                    SessionEnd::Closed => return,
                    SessionEnd::Lost => {
                        if connected.swap(false, Ordering::SeqCst)
                            && event_tx.send(TransportEvent::Disconnected).await.is_err()
                        {
                            return;
                        }
                    }
                }
            }
            Ok(Err(e)) => {
                error!(error = %e, "Failed to connect to hub");
                if event_tx
                    .send(TransportEvent::Error(format!("connection failed: {e}")))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Err(_elapsed) => {
                error!(
                    timeout = config.connect_timeout_secs,
                    "Hub connection timed out"
                );
                if event_tx
                    .send(TransportEvent::Error("connection timed out".to_string()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }

        info!(delay = reconnect_delay, "Reconnecting to hub in {reconnect_delay}s");
        if !backoff(reconnect_delay, &mut command_rx).await {
            return;
        }
        reconnect_delay = config.next_delay(reconnect_delay);
    }
}

/// Drop emits queued while the socket was down. Returns false on Close.
fn discard_stale_commands(command_rx: &mut mpsc::Receiver<Command>) -> bool {
    while let Ok(cmd) = command_rx.try_recv() {
        match cmd {
            Command::Emit(_) => debug!("Discarding emit queued while disconnected"),
            Command::Close => return false,
        }
    }
    true
}

/// Sleep for `secs`, still honouring Close. Returns false on Close.
async fn backoff(secs: u64, command_rx: &mut mpsc::Receiver<Command>) -> bool {
    let sleep = tokio::time::sleep(Duration::from_secs(secs));
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            cmd = command_rx.recv() => match cmd {
                Some(Command::Emit(_)) => debug!("Discarding emit while reconnecting"),
                Some(Command::Close) | None => return false,
            },
        }
    }
}

/// Drive one WebSocket until it drops or is closed.
async fn run_session<S>(
    ws_stream: S,
    connected: &AtomicBool,
    event_tx: &mpsc::Sender<TransportEvent>,
    command_rx: &mut mpsc::Receiver<Command>,
) -> SessionEnd
where
    S: futures_util::Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>>
        + futures_util::Sink<WsMessage>
        + Unpin,
{
    let (mut ws_write, mut ws_read) = ws_stream.split();
    // Until the handshake says otherwise, assume the Engine.IO defaults.
    let mut liveness = Duration::from_millis(45_000);
    let mut deadline = Instant::now() + liveness;

    loop {
        tokio::select! {
            frame = ws_read.next() => {
                let text = match frame {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(WsMessage::Close(_))) | None => {
                        info!("Hub closed connection");
                        return SessionEnd::Lost;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        return SessionEnd::Lost;
                    }
                };
                deadline = Instant::now() + liveness;

                let reply = match socket_io::decode(&text) {
                    Ok(Packet::Open(handshake)) => {
                        debug!(sid = %handshake.sid, "Engine.IO handshake");
                        liveness = Duration::from_millis(
                            handshake.ping_interval + handshake.ping_timeout,
                        );
                        deadline = Instant::now() + liveness;
                        Some(socket_io::CONNECT.to_string())
                    }
                    Ok(Packet::Ping(data)) => Some(socket_io::encode_pong(&data)),
                    Ok(Packet::Connect) => {
                        connected.store(true, Ordering::SeqCst);
                        info!("Connected to hub");
                        if event_tx.send(TransportEvent::Connected).await.is_err() {
                            return SessionEnd::Closed;
                        }
                        None
                    }
                    Ok(Packet::Event { name, payload }) => {
                        debug!(event = %name, "Hub event received");
                        let event = TransportEvent::Message { event: name, payload };
                        if event_tx.send(event).await.is_err() {
                            return SessionEnd::Closed;
                        }
                        None
                    }
                    Ok(Packet::ConnectError(message)) => {
                        warn!(message = %message, "Hub refused socket");
                        if event_tx.send(TransportEvent::Error(message)).await.is_err() {
                            return SessionEnd::Closed;
                        }
                        return SessionEnd::Lost;
                    }
                    Ok(Packet::Disconnect) | Ok(Packet::Close) => {
                        info!("Hub ended the session");
                        return SessionEnd::Lost;
                    }
                    Ok(Packet::Pong) | Ok(Packet::Noop) => None,
                    Err(e) => {
                        debug!(error = %e, "Unrecognized frame from hub");
                        None
                    }
                };

                if let Some(reply) = reply {
                    if ws_write.send(WsMessage::Text(reply.into())).await.is_err() {
                        return SessionEnd::Lost;
                    }
                }
            }
            cmd = command_rx.recv() => match cmd {
                Some(Command::Emit(frame)) => {
                    if !connected.load(Ordering::SeqCst) {
                        debug!("Discarding emit before namespace connect");
                        continue;
                    }
                    if ws_write.send(WsMessage::Text(frame.into())).await.is_err() {
                        return SessionEnd::Lost;
                    }
                }
                Some(Command::Close) | None => {
                    let _ = ws_write
                        .send(WsMessage::Text(socket_io::DISCONNECT.to_string().into()))
                        .await;
                    let _ = ws_write.send(WsMessage::Close(None)).await;
                    connected.store(false, Ordering::SeqCst);
                    return SessionEnd::Closed;
                }
            },
            _ = tokio::time::sleep_until(deadline) => {
                warn!("Hub ping timeout");
                return SessionEnd::Lost;
            }
        }
    }
}
