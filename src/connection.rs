use std::sync::{Arc, Mutex};

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tutor_realtime_types::{FrameDataUri, InferenceMessage};

pub type FrameTx = tokio::sync::mpsc::Sender<FrameDataUri>;
type InferenceTx = tokio::sync::broadcast::Sender<InferenceMessage>;
pub type InferenceRx = tokio::sync::broadcast::Receiver<InferenceMessage>;

/// Lifecycle of the one duplex socket this manager owns. Transitions happen
/// only on socket lifecycle events, never from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
    Closing,
}

/// Owns the inference socket: frames go out, inference messages come in.
///
/// Delivery is at-most-once and best-effort: `send` drops the payload
/// silently unless the connection is Open, nothing is queued across a
/// disconnect, and there is no delivery acknowledgment. Reconnection is the
/// caller's responsibility; this manager never reopens on its own.
pub struct SocketConnection {
    capacity: usize,
    state: Arc<Mutex<ConnectionState>>,
    f_tx: Option<FrameTx>,
    i_tx: InferenceTx,
    send_handle: Option<tokio::task::JoinHandle<()>>,
    recv_handle: Option<tokio::task::JoinHandle<()>>,
}

fn set_state(state: &Arc<Mutex<ConnectionState>>, next: ConnectionState) {
    if let Ok(mut guard) = state.lock() {
        *guard = next;
    } else {
        tracing::error!("failed to update connection state");
    }
}

impl SocketConnection {
    pub fn new(capacity: usize) -> Self {
        // One broadcast channel for the whole lifetime, so subscribers
        // survive a close/reopen cycle.
        let (i_tx, _) = tokio::sync::broadcast::channel(capacity);
        Self {
            capacity,
            state: Arc::new(Mutex::new(ConnectionState::Closed)),
            f_tx: None,
            i_tx,
            send_handle: None,
            recv_handle: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
            .lock()
            .map(|guard| *guard)
            .unwrap_or(ConnectionState::Closed)
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Establish the socket and spawn the send/recv tasks. Fails if already
    /// connected or if the handshake fails, leaving the state Closed.
    pub async fn open(&mut self, url: &str) -> Result<()> {
        if self.state() != ConnectionState::Closed {
            return Err(anyhow::anyhow!("already connected"));
        }
        // A transport error flips the state to Closed while the old tasks
        // linger; clear them before a new socket exists.
        self.close();
        set_state(&self.state, ConnectionState::Connecting);

        let (ws_stream, _) = match tokio_tungstenite::connect_async(url).await {
            Ok(connected) => connected,
            Err(e) => {
                tracing::error!("failed to open socket: {}", e);
                set_state(&self.state, ConnectionState::Closed);
                return Err(e.into());
            }
        };
        let (mut write, mut read) = ws_stream.split();

        let (f_tx, mut f_rx) = tokio::sync::mpsc::channel::<FrameDataUri>(self.capacity);
        self.f_tx = Some(f_tx);
        set_state(&self.state, ConnectionState::Open);

        let send_state = self.state.clone();
        let send_handle = tokio::spawn(async move {
            while let Some(payload) = f_rx.recv().await {
                if let Err(e) = write.send(Message::Text(payload)).await {
                    tracing::error!("failed to send frame: {}", e);
                    set_state(&send_state, ConnectionState::Closed);
                    break;
                }
            }
        });

        let i_tx = self.i_tx.clone();
        let recv_state = self.state.clone();
        let recv_handle = tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let message = match message {
                    Err(e) => {
                        tracing::error!("failed to read message: {}", e);
                        break;
                    }
                    Ok(message) => message,
                };
                match message {
                    Message::Text(text) => {
                        match serde_json::from_str::<InferenceMessage>(&text) {
                            Ok(inference) => {
                                if i_tx.send(inference).is_err() {
                                    tracing::debug!("no inference subscribers, message dropped");
                                }
                            }
                            Err(e) => {
                                tracing::error!(
                                    "failed to deserialize inference message: {}, text=> {:?}",
                                    e,
                                    text
                                );
                            }
                        }
                    }
                    Message::Binary(bin) => {
                        tracing::warn!("unexpected binary message: {} bytes", bin.len());
                    }
                    Message::Close(reason) => {
                        tracing::info!("connection closed: {:?}", reason);
                        break;
                    }
                    _ => {}
                }
            }
            set_state(&recv_state, ConnectionState::Closed);
        });

        self.send_handle = Some(send_handle);
        self.recv_handle = Some(recv_handle);
        Ok(())
    }

    /// Subscribe to parsed inbound inference messages. The subscription
    /// survives close/reopen cycles.
    pub fn messages(&self) -> InferenceRx {
        self.i_tx.subscribe()
    }

    /// Fire-and-forget: hand one encoded frame to the send task. A silent
    /// no-op unless Open; callers check `is_open()` and retry on their own
    /// cadence.
    pub fn send(&self, payload: FrameDataUri) {
        if !self.is_open() {
            tracing::trace!("connection not open, frame dropped");
            return;
        }
        if let Some(tx) = &self.f_tx {
            if let Err(e) = tx.try_send(payload) {
                tracing::debug!("failed to hand frame to send task: {}", e);
            }
        }
    }

    /// Intentional teardown: no further inbound callbacks fire afterwards
    /// and the transport is released exactly once. Idempotent.
    pub fn close(&mut self) {
        if self.send_handle.is_none() && self.recv_handle.is_none() {
            set_state(&self.state, ConnectionState::Closed);
            return;
        }
        set_state(&self.state, ConnectionState::Closing);
        // Dropping the frame sender ends the send task; the recv task is
        // aborted so no callback can observe the connection after this.
        self.f_tx = None;
        if let Some(handle) = self.send_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.recv_handle.take() {
            handle.abort();
        }
        set_state(&self.state, ConnectionState::Closed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let connection = SocketConnection::new(16);
        assert_eq!(connection.state(), ConnectionState::Closed);
        assert!(!connection.is_open());
    }

    #[test]
    fn send_while_closed_is_a_no_op() {
        let connection = SocketConnection::new(16);
        connection.send("data:image/png;base64,AAAA".to_string());
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[test]
    fn close_is_idempotent_before_open() {
        let mut connection = SocketConnection::new(16);
        connection.close();
        connection.close();
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn open_failure_leaves_state_closed() {
        let mut connection = SocketConnection::new(16);
        // Nothing listens on this port.
        let result = connection.open("ws://127.0.0.1:9").await;
        assert!(result.is_err());
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn subscription_outlives_failed_open() {
        let mut connection = SocketConnection::new(16);
        let rx = connection.messages();
        let _ = connection.open("ws://127.0.0.1:9").await;
        drop(rx);
        assert!(!connection.is_open());
    }
}
